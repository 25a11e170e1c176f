use {
    std::{fs, path::Path},
    anyhow::Context,
    tracing::info,
    comments_core::{
        frequency::{RankedToken, TokenFrequency},
        tokenization::TokenSequence,
    },
};

const WORD_FREQUENCY_FILE: &str = "word_frequency.json";

pub fn run_bag_of_words_step(sequences: &[TokenSequence], top_n: usize, output_dir: &Path) -> anyhow::Result<Vec<RankedToken>> {
    let frequency: TokenFrequency = sequences.iter().collect();
    info!(
        "bag of words: {} tokens, {} distinct",
        frequency.total_tokens(),
        frequency.distinct_tokens(),
    );

    let top = frequency.most_common(top_n);
    for ranked in &top {
        info!("{}: {}", ranked.token, ranked.count);
    }

    let path = output_dir.join(WORD_FREQUENCY_FILE);
    fs::write(&path, serde_json::to_vec_pretty(&top)?)
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(top)
}
