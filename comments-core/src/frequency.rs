use {
    std::collections::HashMap,
    serde::Serialize,
    crate::tokenization::TokenSequence,
};

/// Corpus-wide bag of words.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenFrequency {
    counts: HashMap<String, u64>,
    total: u64,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RankedToken {
    pub token: String,
    pub count: u64,
}

impl TokenFrequency {
    pub fn add(&mut self, tokens: &TokenSequence) {
        for token in tokens.iter() {
            *self.counts.entry(token.to_owned()).or_insert(0) += 1;
            self.total += 1;
        }
    }

    pub fn count(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    pub fn total_tokens(&self) -> u64 {
        self.total
    }

    pub fn distinct_tokens(&self) -> usize {
        self.counts.len()
    }

    /// The `n` most frequent tokens. Equal counts are ordered by token so the ranking is stable across runs.
    pub fn most_common(&self, n: usize) -> Vec<RankedToken> {
        let mut ranked: Vec<(&String, &u64)> = self.counts.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        ranked.into_iter()
            .take(n)
            .map(|(token, count)| RankedToken {
                token: token.clone(),
                count: *count,
            })
            .collect()
    }
}

impl<'a> FromIterator<&'a TokenSequence> for TokenFrequency {
    fn from_iter<I: IntoIterator<Item = &'a TokenSequence>>(iter: I) -> Self {
        let mut frequency = Self::default();
        for sequence in iter {
            frequency.add(sequence);
        }
        frequency
    }
}
