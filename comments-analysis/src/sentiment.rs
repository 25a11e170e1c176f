use {
    std::{collections::HashMap, fs, path::Path},
    anyhow::Context,
    tracing::info,
    comments_core::{
        lexicon::PolarityLexicon,
        models::CommentRow,
        sentiment::{label_corpus, SentimentLabel, SentimentReport},
        tokenization::TokenSequence,
    },
    crate::models::{LabeledCommentRow, SentimentSummary},
};

const LABELED_TABLE_FILE: &str = "labeled_comments.csv";
const SUMMARY_FILE: &str = "sentiment_summary.json";

pub fn run_sentiment_step(
    rows: &[Option<CommentRow>],
    sequences: &[Option<TokenSequence>],
    lexicon: &PolarityLexicon,
    output_dir: &Path,
) -> anyhow::Result<SentimentReport> {
    let report = label_corpus(sequences, lexicon);

    if report.excluded.is_empty() {
        info!("all {} comments were labeled", sequences.len());
    } else {
        info!("{} comments excluded from sentiment labeling (no text): {:?}", report.excluded.len(), report.excluded);
    }
    info!(
        "sentiment distribution: {} positive, {} negative, {} neutral",
        report.distribution.positive,
        report.distribution.negative,
        report.distribution.neutral,
    );

    write_labeled_table(rows, &report, &output_dir.join(LABELED_TABLE_FILE))?;

    let summary = SentimentSummary {
        distribution: report.distribution,
        excluded_records: report.excluded.clone(),
    };
    let summary_path = output_dir.join(SUMMARY_FILE);
    fs::write(&summary_path, serde_json::to_vec_pretty(&summary)?)
        .with_context(|| format!("failed to write {}", summary_path.display()))?;

    Ok(report)
}

fn write_labeled_table(rows: &[Option<CommentRow>], report: &SentimentReport, path: &Path) -> anyhow::Result<()> {
    let labels: HashMap<usize, SentimentLabel> = report.labels.iter().copied().collect();

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for (index, row) in rows.iter().enumerate() {
        let labeled = match row {
            Some(row) => LabeledCommentRow::new(row, labels.get(&index).copied()),
            None => LabeledCommentRow::unreadable(),
        };
        writer.serialize(labeled)?;
    }
    writer.flush()?;

    info!("labeled comment table written to {}", path.display());
    Ok(())
}
