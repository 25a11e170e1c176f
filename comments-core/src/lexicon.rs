use {
    std::{
        collections::HashSet,
        fs::File,
        io::{BufRead, BufReader},
        path::Path,
    },
    tracing::{info, warn},
    crate::error::LexiconLoadError,
};

/// Stopwords excluded from every token sequence. Loaded once, never mutated.
#[derive(Debug, Default, Clone)]
pub struct StopwordSet {
    words: HashSet<String>,
}

/// Positive and negative sentiment dictionaries.
#[derive(Debug, Default, Clone)]
pub struct PolarityLexicon {
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl StopwordSet {
    pub fn load(path: &Path) -> Result<Self, LexiconLoadError> {
        let words = load_word_list(path, "stopwords")?;
        info!("loaded {} stopwords from {}", words.len(), path.display());
        Ok(Self { words })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(|v| v.as_str())
    }
}

impl<S: Into<String>> FromIterator<S> for StopwordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl PolarityLexicon {
    pub fn new(positive: HashSet<String>, negative: HashSet<String>) -> Self {
        let overlap = positive.intersection(&negative).count();
        if overlap > 0 {
            warn!("{} words are listed as both positive and negative, they will count toward both", overlap);
        }

        Self {
            positive,
            negative,
        }
    }

    pub fn load(positive_path: &Path, negative_path: &Path) -> Result<Self, LexiconLoadError> {
        let positive = load_word_list(positive_path, "positive lexicon")?;
        let negative = load_word_list(negative_path, "negative lexicon")?;
        info!("loaded polarity lexicon: {} positive, {} negative words", positive.len(), negative.len());
        Ok(Self::new(positive, negative))
    }

    pub fn is_positive(&self, word: &str) -> bool {
        self.positive.contains(word)
    }

    pub fn is_negative(&self, word: &str) -> bool {
        self.negative.contains(word)
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.positive.iter().chain(self.negative.iter()).map(|v| v.as_str())
    }
}

/// Reads a one-entry-per-line word list. Entries are trimmed, blank lines are skipped
/// and repeated entries collapse.
pub fn load_word_list(path: &Path, resource: &'static str) -> Result<HashSet<String>, LexiconLoadError> {
    let file = File::open(path).map_err(|err| LexiconLoadError::new(resource, path.to_path_buf(), err))?;

    let mut words = HashSet::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|err| LexiconLoadError::new(resource, path.to_path_buf(), err))?;
        let word = line.trim_start_matches('\u{feff}').trim();
        if !word.is_empty() {
            words.insert(word.to_owned());
        }
    }

    Ok(words)
}
