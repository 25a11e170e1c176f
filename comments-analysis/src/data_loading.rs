use {
    std::{fs::File, path::Path},
    anyhow::{anyhow, Context},
    encoding_rs::Encoding,
    encoding_rs_io::DecodeReaderBytesBuilder,
    indicatif::ProgressBar,
    tracing::{info, warn},
    comments_core::models::CommentRow,
};

/// Reads the comment table written by the collector.
///
/// Positions are preserved: a row that cannot be parsed is kept as `None`
/// so every later step can refer to records by their table index.
/// The file is decoded from `encoding` (a label such as `utf-8` or `gb18030`);
/// a byte order mark overrides it.
pub fn load_comment_table(path: &Path, encoding: &str) -> anyhow::Result<Vec<Option<CommentRow>>> {
    info!("loading comment table: {} ({})", path.display(), encoding);

    let encoding = Encoding::for_label(encoding.trim().as_bytes())
        .ok_or_else(|| anyhow!("unknown comment table encoding: {}", encoding))?;
    let file = File::open(path)
        .with_context(|| format!("failed to open comment table {}", path.display()))?;
    let decoded = DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding))
        .build(file);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(decoded);
    let headers = reader.headers()
        .with_context(|| format!("comment table {} has no header", path.display()))?
        .clone();
    let records: Vec<_> = reader.records().collect();

    let pb = ProgressBar::new(records.len() as u64);
    let mut rows = Vec::with_capacity(records.len());
    let mut unreadable = 0;

    for (index, record) in records.into_iter().enumerate() {
        let row = record
            .map_err(anyhow::Error::from)
            .and_then(|record| record.deserialize::<CommentRow>(Some(&headers)).map_err(anyhow::Error::from));

        match row {
            Ok(row) => rows.push(Some(row)),
            Err(err) => {
                warn!("row {} of {} is unreadable: {}", index, path.display(), err);
                unreadable += 1;
                rows.push(None);
            },
        }

        pb.inc(1);
    }

    pb.finish();
    info!("loaded {} rows ({} unreadable)", rows.len(), unreadable);

    Ok(rows)
}
