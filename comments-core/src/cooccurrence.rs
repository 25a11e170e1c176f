use {
    std::{collections::{HashMap, VecDeque}, sync::Arc},
    serde::Serialize,
    crate::tokenization::TokenSequence,
};

/// Unordered pair of distinct tokens, stored in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenPair {
    first: String,
    second: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoOccurrenceTable {
    counts: HashMap<TokenPair, u64>,
}

/// Weighted edge of the semantic network.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub token_a: String,
    pub token_b: String,
    pub weight: u64,
}

impl TokenPair {
    pub fn new(a: &str, b: &str) -> Option<Self> {
        match a.cmp(b) {
            std::cmp::Ordering::Less => Some(Self { first: a.to_owned(), second: b.to_owned() }),
            std::cmp::Ordering::Greater => Some(Self { first: b.to_owned(), second: a.to_owned() }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }
}

impl CoOccurrenceTable {
    /// Counts every position pair `i < j` of the sequence whose tokens differ.
    pub fn accumulate(&mut self, tokens: &TokenSequence) {
        let tokens = tokens.tokens();
        for i in 0..tokens.len() {
            for j in (i + 1)..tokens.len() {
                if let Some(pair) = TokenPair::new(&tokens[i], &tokens[j]) {
                    *self.counts.entry(pair).or_insert(0) += 1;
                }
            }
        }
    }

    pub fn merge(&mut self, other: CoOccurrenceTable) {
        for (pair, count) in other.counts {
            *self.counts.entry(pair).or_insert(0) += count;
        }
    }

    pub fn count(&self, a: &str, b: &str) -> u64 {
        TokenPair::new(a, b)
            .and_then(|pair| self.counts.get(&pair).copied())
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&TokenPair, u64)> {
        self.counts.iter().map(|(pair, count)| (pair, *count))
    }

    /// Pairs whose count strictly exceeds `threshold`, heaviest first, ties broken by pair.
    pub fn filter(&self, threshold: u64) -> Vec<Edge> {
        let mut edges: Vec<(&TokenPair, u64)> = self.pairs()
            .filter(|(_, count)| *count > threshold)
            .collect();
        edges.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        edges.into_iter()
            .map(|(pair, weight)| Edge {
                token_a: pair.first.clone(),
                token_b: pair.second.clone(),
                weight,
            })
            .collect()
    }
}

impl<'a> FromIterator<&'a TokenSequence> for CoOccurrenceTable {
    fn from_iter<I: IntoIterator<Item = &'a TokenSequence>>(iter: I) -> Self {
        let mut table = Self::default();
        for sequence in iter {
            table.accumulate(sequence);
        }
        table
    }
}

/// Splits the corpus into `workers` chunks, accumulates each on a blocking task and sums the partial tables.
pub async fn accumulate_parallel(sequences: Arc<Vec<TokenSequence>>, workers: usize) -> anyhow::Result<CoOccurrenceTable> {
    let chunk_size = ((sequences.len() + workers.max(1) - 1) / workers.max(1)).max(1);

    let mut join_handles = VecDeque::new();
    for start in (0..sequences.len()).step_by(chunk_size) {
        let end = (start + chunk_size).min(sequences.len());
        let sequences = sequences.clone();
        join_handles.push_back(tokio::task::spawn_blocking(move || {
            sequences[start..end].iter().collect::<CoOccurrenceTable>()
        }));
    }

    let mut table = CoOccurrenceTable::default();
    while let Some(handle) = join_handles.pop_front() {
        table.merge(handle.await?);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(raw: &[&[&str]]) -> Vec<TokenSequence> {
        raw.iter().map(|tokens| TokenSequence::new(tokens.iter())).collect()
    }

    #[test]
    fn pair_is_canonical() {
        assert_eq!(TokenPair::new("b", "a"), TokenPair::new("a", "b"));
        assert_eq!(TokenPair::new("b", "a").unwrap().first(), "a");
        assert_eq!(TokenPair::new("a", "a"), None);
    }

    #[test]
    fn threshold_keeps_only_pairs_strictly_above_it() {
        let corpus = corpus(&[&["a", "b"], &["a", "b"], &["c"]]);
        let table: CoOccurrenceTable = corpus.iter().collect();

        assert_eq!(table.filter(1), vec![Edge {
            token_a: "a".to_owned(),
            token_b: "b".to_owned(),
            weight: 2,
        }]);
        assert!(table.filter(2).is_empty());
    }

    #[test]
    fn self_pairs_are_skipped_but_repeated_tokens_count_per_position() {
        let table: CoOccurrenceTable = corpus(&[&["a", "b", "a"]]).iter().collect();

        assert_eq!(table.len(), 1);
        assert_eq!(table.count("a", "b"), 2);
        assert_eq!(table.count("a", "a"), 0);
    }

    #[test]
    fn no_pair_is_stored_in_both_orders() {
        let table: CoOccurrenceTable = corpus(&[&["x", "y", "z"], &["z", "y", "x"], &["y", "x"]]).iter().collect();

        for (pair, _) in table.pairs() {
            assert!(pair.first() < pair.second());
        }
        assert_eq!(table.count("x", "y"), 3);
        assert_eq!(table.count("y", "x"), 3);
        assert_eq!(table.count("x", "z"), 2);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn accumulation_is_order_independent() {
        let forward = corpus(&[&["好", "看", "主播"], &["主播", "唱", "好"], &["看", "看", "唱"], &["唱"]]);
        let mut backward = forward.clone();
        backward.reverse();
        let mut rotated = forward.clone();
        rotated.rotate_left(2);

        let expected: CoOccurrenceTable = forward.iter().collect();
        assert_eq!(backward.iter().collect::<CoOccurrenceTable>(), expected);
        assert_eq!(rotated.iter().collect::<CoOccurrenceTable>(), expected);
    }

    #[test]
    fn filter_orders_by_weight_then_pair() {
        let table: CoOccurrenceTable = corpus(&[&["c", "d"], &["a", "b"], &["b", "a"], &["d", "c"], &["e", "f"]]).iter().collect();
        let edges: Vec<(String, String, u64)> = table.filter(0)
            .into_iter()
            .map(|edge| (edge.token_a, edge.token_b, edge.weight))
            .collect();

        assert_eq!(edges, vec![
            ("a".to_owned(), "b".to_owned(), 2),
            ("c".to_owned(), "d".to_owned(), 2),
            ("e".to_owned(), "f".to_owned(), 1),
        ]);
    }

    #[tokio::test]
    async fn parallel_accumulation_matches_sequential() {
        let mut raw: Vec<Vec<String>> = Vec::new();
        for i in 0..97 {
            raw.push((0..(i % 7)).map(|j| format!("w{}", (i * 3 + j * 5) % 11)).collect());
        }
        let sequences: Vec<TokenSequence> = raw.iter().map(|tokens| TokenSequence::new(tokens.iter())).collect();
        let sequential: CoOccurrenceTable = sequences.iter().collect();

        let sequences = Arc::new(sequences);
        for workers in [1, 2, 3, 8, 200] {
            let parallel = accumulate_parallel(sequences.clone(), workers).await.unwrap();
            assert_eq!(parallel, sequential, "mismatch with {} workers", workers);
        }
    }

    #[tokio::test]
    async fn parallel_accumulation_of_empty_corpus() {
        let table = accumulate_parallel(Arc::new(Vec::new()), 4).await.unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn merge_is_associative() {
        let parts = corpus(&[&["a", "b", "c"], &["b", "c"], &["c", "a", "d"]]);
        let tables: Vec<CoOccurrenceTable> = parts.iter().map(|seq| std::iter::once(seq).collect()).collect();

        let mut left = tables[0].clone();
        left.merge(tables[1].clone());
        left.merge(tables[2].clone());

        let mut right_tail = tables[1].clone();
        right_tail.merge(tables[2].clone());
        let mut right = tables[0].clone();
        right.merge(right_tail);

        assert_eq!(left, right);
    }
}
