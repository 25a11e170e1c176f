use {
    std::{collections::HashSet, sync::Arc},
    anyhow::anyhow,
    unicode_segmentation::UnicodeSegmentation,
    crate::lexicon::StopwordSet,
};

/// Splits normalized text into candidate words.
pub trait Segmenter {
    fn segment(&self, text: &str) -> anyhow::Result<Vec<String>>;
}

impl<S: Segmenter + ?Sized> Segmenter for Box<S> {
    fn segment(&self, text: &str) -> anyhow::Result<Vec<String>> {
        (**self).segment(text)
    }
}

impl<S: Segmenter + ?Sized> Segmenter for Arc<S> {
    fn segment(&self, text: &str) -> anyhow::Result<Vec<String>> {
        (**self).segment(text)
    }
}

/// UAX #29 word boundaries. Han text comes out one character per word.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeWordSegmenter;

impl Segmenter for UnicodeWordSegmenter {
    fn segment(&self, text: &str) -> anyhow::Result<Vec<String>> {
        Ok(text.unicode_words().map(|v| v.to_owned()).collect())
    }
}

/// Forward maximum matching over a known vocabulary for Han runs.
///
/// Runs of non-Han characters are kept whole, so Latin words and numbers pass
/// through as single tokens. Han characters not covered by any vocabulary word
/// become single-character tokens.
#[derive(Debug, Clone)]
pub struct DictionarySegmenter {
    vocabulary: HashSet<String>,
    max_word_chars: usize,
}

impl DictionarySegmenter {
    pub fn new<I, S>(vocabulary: I, max_word_chars: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vocabulary: HashSet<String> = vocabulary.into_iter()
            .map(Into::into)
            .filter(|v: &String| v.chars().count() > 1)
            .collect();
        let longest = vocabulary.iter().map(|v| v.chars().count()).max().unwrap_or(1);

        Self {
            vocabulary,
            max_word_chars: max_word_chars.max(1).min(longest.max(1)),
        }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    fn segment_piece(&self, chars: &[char], tokens: &mut Vec<String>) {
        let mut i = 0;
        while i < chars.len() {
            if !is_han(chars[i]) {
                let start = i;
                while i < chars.len() && !is_han(chars[i]) {
                    i += 1;
                }
                tokens.push(chars[start..i].iter().collect());
                continue;
            }

            let han_run = chars[i..].iter().take_while(|c| is_han(**c)).count();
            let mut len = self.max_word_chars.min(han_run);
            while len > 1 {
                let candidate: String = chars[i..i + len].iter().collect();
                if self.vocabulary.contains(&candidate) {
                    break;
                }
                len -= 1;
            }

            tokens.push(chars[i..i + len].iter().collect());
            i += len;
        }
    }
}

impl Segmenter for DictionarySegmenter {
    fn segment(&self, text: &str) -> anyhow::Result<Vec<String>> {
        let mut tokens = Vec::new();
        for piece in text.split_whitespace() {
            let chars: Vec<char> = piece.chars().collect();
            self.segment_piece(&chars, &mut tokens);
        }
        Ok(tokens)
    }
}

impl Segmenter for tokenizers::Tokenizer {
    fn segment(&self, text: &str) -> anyhow::Result<Vec<String>> {
        let encoding = self.encode(text, false)
            .map_err(|err| anyhow!("failed to encode text with pretrained tokenizer: {}", err))?;

        Ok(encoding.get_tokens()
            .iter()
            .filter(|token| token.as_str() != "[UNK]")
            .map(|token| token.trim_start_matches("##").to_owned())
            .collect())
    }
}

fn is_han(c: char) -> bool {
    matches!(c as u32,
        0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xF900..=0xFAFF
        | 0x20000..=0x2A6DF
        | 0x2A700..=0x2EBEF
        | 0x30000..=0x3134F
    )
}

/// Ordered words of one comment, free of stopwords and blank entries.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenSequence {
    tokens: Vec<String>,
}

impl TokenSequence {
    /// Trims every token and drops the ones left empty.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::filtered(tokens, &StopwordSet::default())
    }

    pub fn filtered<I, S>(tokens: I, stopwords: &StopwordSet) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tokens: tokens.into_iter()
                .map(|token| token.as_ref().trim().to_owned())
                .filter(|token| !token.is_empty() && !stopwords.contains(token))
                .collect(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|v| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

pub struct TokenizerAdapter<S> {
    segmenter: S,
    stopwords: Arc<StopwordSet>,
}

impl<S: Segmenter> TokenizerAdapter<S> {
    pub fn new(segmenter: S, stopwords: Arc<StopwordSet>) -> Self {
        Self {
            segmenter,
            stopwords,
        }
    }

    pub fn tokenize(&self, normalized: &str) -> anyhow::Result<TokenSequence> {
        let segments = self.segmenter.segment(normalized)?;
        Ok(TokenSequence::filtered(segments, &self.stopwords))
    }
}
