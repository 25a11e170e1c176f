use {
    std::{fs::File, io::Write, path::Path},
    anyhow::Context,
    crate::models::{CommentRecord, COMMENT_TABLE_HEADERS},
};

/// Append-only destination for captured comments. Records arrive one per call, in capture order.
pub trait RecordSink {
    fn append(&mut self, record: &CommentRecord) -> anyhow::Result<()>;
}

impl RecordSink for Vec<CommentRecord> {
    fn append(&mut self, record: &CommentRecord) -> anyhow::Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Writes the comment table as UTF-8 CSV, flushing after every row so an aborted run keeps what it captured.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|v| !v.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let file = File::create(path)
            .with_context(|| format!("failed to create comment table {}", path.display()))?;
        Self::new(file)
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> anyhow::Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(COMMENT_TABLE_HEADERS)?;
        writer.flush()?;

        Ok(Self { writer })
    }

    pub fn into_inner(self) -> anyhow::Result<W> {
        self.writer.into_inner().map_err(|err| anyhow::anyhow!("failed to flush comment table: {}", err.error()))
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn append(&mut self, record: &CommentRecord) -> anyhow::Result<()> {
        self.writer.serialize(record.to_row())?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        chrono::{TimeZone, Utc},
        crate::models::CommentRow,
    };

    fn record(nickname: &str, text: &str, likes: u64) -> CommentRecord {
        CommentRecord::builder()
            .nickname(nickname.to_owned())
            .text(text.to_owned())
            .like_count(likes)
            .created_at(Utc.timestamp_opt(1720000000, 0).single().unwrap())
            .build()
    }

    #[test]
    fn writes_header_then_rows_in_order() {
        let mut sink = CsvSink::new(Vec::new()).unwrap();
        sink.append(&record("小明", "好看, 真的", 3)).unwrap();
        sink.append(&record("bob", "second", 0)).unwrap();

        let bytes = sink.into_inner().unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let headers: Vec<String> = reader.headers().unwrap().iter().map(|v| v.to_owned()).collect();
        assert_eq!(headers, COMMENT_TABLE_HEADERS);

        let rows: Vec<CommentRow> = reader.deserialize().map(|v| v.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].nickname, "小明");
        assert_eq!(rows[0].text.as_deref(), Some("好看, 真的"));
        assert_eq!(rows[0].digg_count, 3);
        assert_eq!(rows[1].nickname, "bob");
    }

    #[test]
    fn empty_table_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.csv");

        drop(CsvSink::create(&path).unwrap());

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), "昵称,点赞数,时间,评论");
    }

    #[test]
    fn rows_are_flushed_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");

        let mut sink = CsvSink::create(&path).unwrap();
        sink.append(&record("a", "first", 1)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        drop(sink);
    }
}
