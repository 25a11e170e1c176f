use {
    std::path::Path,
    anyhow::anyhow,
    tokenizers::Tokenizer,
    tracing::{info, warn},
    comments_core::{
        config::SegmenterConfig,
        lexicon::{load_word_list, PolarityLexicon, StopwordSet},
        models::CommentRow,
        normalizer::Normalizer,
        progress::Progress,
        tokenization::{DictionarySegmenter, Segmenter, TokenSequence, TokenizerAdapter, UnicodeWordSegmenter},
    },
};

pub type BoxedSegmenter = Box<dyn Segmenter + Send + Sync>;

pub async fn build_segmenter(config: &SegmenterConfig, stopwords: &StopwordSet, lexicon: &PolarityLexicon) -> anyhow::Result<BoxedSegmenter> {
    let segmenter: BoxedSegmenter = match config {
        SegmenterConfig::Unicode => {
            info!("using unicode word boundary segmenter");
            Box::new(UnicodeWordSegmenter)
        },
        SegmenterConfig::Dictionary { user_dictionary_path, max_word_chars } => {
            let mut vocabulary: Vec<String> = lexicon.words()
                .chain(stopwords.words())
                .map(|v| v.to_owned())
                .collect();
            if let Some(path) = user_dictionary_path {
                vocabulary.extend(load_word_list(Path::new(path), "user dictionary")?);
            }

            let segmenter = DictionarySegmenter::new(vocabulary, max_word_chars.unwrap_or(8));
            info!("using dictionary segmenter with {} known words", segmenter.vocabulary_size());
            Box::new(segmenter)
        },
        SegmenterConfig::Pretrained { identifier } => {
            info!("loading pretrained tokenizer {}", identifier);
            let name = identifier.clone();
            let tokenizer = tokio::task::spawn_blocking(move || Tokenizer::from_pretrained(name, None))
                .await?
                .map_err(|err| anyhow!("failed to load pretrained tokenizer {}: {}", identifier, err))?;
            Box::new(tokenizer)
        },
    };

    Ok(segmenter)
}

/// Normalizes and tokenizes every row. Rows without text (or unreadable rows)
/// stay `None`, a row whose segmentation fails is logged and treated the same way.
pub fn run_tokenization_step<S: Segmenter>(
    rows: &[Option<CommentRow>],
    normalizer: &Normalizer,
    adapter: &TokenizerAdapter<S>,
) -> Vec<Option<TokenSequence>> {
    let mut progress = Progress::new("tokenizing comments".to_owned());

    let sequences = rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let text = row.as_ref().and_then(|row| row.comment_text())?;
            let sequence = match adapter.tokenize(&normalizer.normalize(text)) {
                Ok(sequence) => Some(sequence),
                Err(err) => {
                    warn!("failed to tokenize comment {}: {}", index, err);
                    None
                }
            };
            progress.update();
            sequence
        })
        .collect();

    progress.finish();
    sequences
}
