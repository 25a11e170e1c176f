use {
    std::{path::Path, sync::Arc},
    anyhow::Context,
    tracing::info,
    comments_core::{
        cooccurrence::{accumulate_parallel, Edge},
        tokenization::TokenSequence,
    },
};

const EDGES_FILE: &str = "cooccurrence_edges.csv";

/// Builds the co-occurrence table and keeps the pairs whose count is strictly above `threshold`.
pub async fn run_cooccurrence_step(
    sequences: Vec<TokenSequence>,
    threshold: u64,
    workers: usize,
    output_dir: &Path,
) -> anyhow::Result<Vec<Edge>> {
    info!("counting co-occurrences over {} comments with {} workers", sequences.len(), workers);

    let table = accumulate_parallel(Arc::new(sequences), workers).await?;
    let edges = table.filter(threshold);
    info!("{} distinct pairs, {} above threshold {}", table.len(), edges.len(), threshold);

    let path = output_dir.join(EDGES_FILE);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for edge in &edges {
        writer.serialize(edge)?;
    }
    writer.flush()?;
    info!("semantic network edges written to {}", path.display());

    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_edges_above_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let sequences = vec![
            TokenSequence::new(["a", "b"]),
            TokenSequence::new(["a", "b", "c"]),
            TokenSequence::new(["c"]),
        ];

        let edges = run_cooccurrence_step(sequences, 1, 2, dir.path()).await.unwrap();
        assert_eq!(edges, vec![Edge { token_a: "a".to_owned(), token_b: "b".to_owned(), weight: 2 }]);

        let written = std::fs::read_to_string(dir.path().join(EDGES_FILE)).unwrap();
        assert_eq!(written, "token_a,token_b,weight\na,b,2\n");
    }

    #[tokio::test]
    async fn empty_corpus_writes_no_edges() {
        let dir = tempfile::tempdir().unwrap();

        let edges = run_cooccurrence_step(Vec::new(), 0, 4, dir.path()).await.unwrap();
        assert!(edges.is_empty());
    }
}
