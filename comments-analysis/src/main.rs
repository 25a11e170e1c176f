mod bag_of_words;
mod cooccurrence;
mod data_loading;
mod models;
mod sentiment;
mod tokenization;
mod utils;

use {
    std::{fs, sync::Arc},
    tracing::{info, error},
    comments_core::{
        config::{AnalysisConfig, Config},
        lexicon::{PolarityLexicon, StopwordSet},
        normalizer::Normalizer,
        tokenization::TokenizerAdapter,
    },
    crate::{
        bag_of_words::run_bag_of_words_step,
        cooccurrence::run_cooccurrence_step,
        data_loading::load_comment_table,
        sentiment::run_sentiment_step,
        tokenization::{build_segmenter, run_tokenization_step},
        utils::init_logging,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("comment analysis");

    let config = Config::load();
    run_analysis(&config.analysis()).await
}

async fn run_analysis(config: &AnalysisConfig) -> anyhow::Result<()> {
    let stopwords = match StopwordSet::load(&config.stopwords_path()) {
        Ok(v) => Arc::new(v),
        Err(err) => {
            error!("cannot run analysis without the {} ({})", err.resource(), err.path().display());
            return Err(err.into());
        }
    };
    info!("loaded {} stopwords", stopwords.len());

    let lexicon = match PolarityLexicon::load(&config.positive_lexicon_path(), &config.negative_lexicon_path()) {
        Ok(v) => v,
        Err(err) => {
            error!("cannot run analysis without the {} ({})", err.resource(), err.path().display());
            return Err(err.into());
        }
    };

    let rows = load_comment_table(&config.input_path(), config.input_encoding())?;

    let normalizer = Normalizer::new(config.irrelevant_patterns());
    let segmenter = build_segmenter(config.segmenter(), &stopwords, &lexicon).await?;
    let adapter = TokenizerAdapter::new(segmenter, stopwords);
    let sequences = run_tokenization_step(&rows, &normalizer, &adapter);

    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir)?;

    run_sentiment_step(&rows, &sequences, &lexicon, &output_dir)?;

    let corpus: Vec<_> = sequences.into_iter().flatten().collect();
    run_bag_of_words_step(&corpus, config.top_words(), &output_dir)?;
    run_cooccurrence_step(corpus, config.cooccurrence_threshold(), config.workers(), &output_dir).await?;

    info!("analysis results written to {}", output_dir.display());
    Ok(())
}
