use {
    std::fmt,
    serde::Serialize,
    crate::{
        lexicon::PolarityLexicon,
        tokenization::TokenSequence,
    },
};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

/// Lexicon hits of one token sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolarityScore {
    pub positive: usize,
    pub negative: usize,
}

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentimentReport {
    /// `(record index, label)` in corpus order.
    pub labels: Vec<(usize, SentimentLabel)>,
    /// Records that had no text to classify.
    pub excluded: Vec<usize>,
    pub distribution: SentimentDistribution,
}

impl SentimentLabel {
    /// Value written to the labeled comment table.
    pub fn table_value(&self) -> &'static str {
        match self {
            Self::Positive => "正面",
            Self::Negative => "负面",
            Self::Neutral => "中性",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        })
    }
}

impl PolarityScore {
    /// Ties, including the no-hit case, are neutral.
    pub fn label(&self) -> SentimentLabel {
        if self.positive > self.negative {
            SentimentLabel::Positive
        } else if self.negative > self.positive {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl SentimentDistribution {
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

pub fn score(tokens: &TokenSequence, lexicon: &PolarityLexicon) -> PolarityScore {
    let mut score = PolarityScore::default();
    for token in tokens.iter() {
        if lexicon.is_positive(token) {
            score.positive += 1;
        }
        if lexicon.is_negative(token) {
            score.negative += 1;
        }
    }
    score
}

pub fn classify(tokens: &TokenSequence, lexicon: &PolarityLexicon) -> SentimentLabel {
    score(tokens, lexicon).label()
}

/// Labels a corpus indexed by record position. `None` entries are records
/// without text; they are reported as excluded instead of being labeled.
pub fn label_corpus(sequences: &[Option<TokenSequence>], lexicon: &PolarityLexicon) -> SentimentReport {
    let mut report = SentimentReport::default();

    for (index, sequence) in sequences.iter().enumerate() {
        match sequence {
            Some(sequence) => {
                let label = classify(sequence, lexicon);
                report.distribution.record(label);
                report.labels.push((index, label));
            },
            None => report.excluded.push(index),
        }
    }

    report
}
