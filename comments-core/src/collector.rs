//! Page-by-page comment collection.
//!
//! The collector drives a [`CaptureSource`] strictly sequentially: advance,
//! wait (bounded by a per-page timeout), extract, sink. Each page attempt
//! either succeeds or fails; successive failures are counted and the run ends
//! in [`CollectorState::Exhausted`] once the limit is reached. A run also
//! ends on an empty page, on a page made only of already-seen comments, on
//! `has_more: 0`, or after `max_pages` attempts.

use {
    std::{collections::HashSet, time::Duration},
    tracing::{debug, info, warn},
    crate::{
        capture::CaptureSource,
        config::CollectorConfig,
        error::{CollectError, PageError},
        models::{into_comment_record, CommentPage, RecordKey},
        progress::Progress,
        sink::RecordSink,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorSettings {
    pub max_pages: u32,
    pub page_timeout: Duration,
    pub max_consecutive_failures: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    Waiting { consecutive_failures: u32 },
    Finished(FinishReason),
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    PageLimit,
    EmptyPage,
    NoNewRecords,
    NoMorePages,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionReport {
    pub pages_requested: u32,
    pub pages_attempted: u32,
    pub pages_processed: u32,
    pub pages_failed: u32,
    pub pages_timed_out: u32,
    pub records_captured: u64,
    pub duplicates_skipped: u64,
    pub malformed_skipped: u64,
    pub finish_reason: Option<FinishReason>,
}

struct PageSummary {
    total: usize,
    captured: usize,
    duplicates: usize,
}

impl From<&CollectorConfig> for CollectorSettings {
    fn from(config: &CollectorConfig) -> Self {
        Self {
            max_pages: config.max_pages(),
            page_timeout: config.page_timeout(),
            max_consecutive_failures: config.max_consecutive_failures(),
        }
    }
}

impl CollectorState {
    fn is_terminal(&self) -> bool {
        !matches!(self, Self::Waiting { .. })
    }
}

pub struct Collector<'a, S, K> {
    source: &'a mut S,
    sink: &'a mut K,
    settings: CollectorSettings,
    state: CollectorState,
    seen: HashSet<RecordKey>,
    report: CollectionReport,
    progress: Progress,
}

impl<'a, S: CaptureSource, K: RecordSink> Collector<'a, S, K> {
    pub fn new(source: &'a mut S, sink: &'a mut K, settings: CollectorSettings) -> Self {
        Self {
            source,
            sink,
            settings,
            state: CollectorState::Waiting { consecutive_failures: 0 },
            seen: HashSet::new(),
            report: CollectionReport {
                pages_requested: settings.max_pages,
                ..CollectionReport::default()
            },
            progress: Progress::new("capturing comments".to_owned()),
        }
    }

    pub fn state(&self) -> CollectorState {
        self.state
    }

    pub async fn run(mut self) -> Result<CollectionReport, CollectError> {
        while !self.state.is_terminal() {
            self.step().await?;
        }

        self.progress.finish();
        info!(
            "collection finished ({:?}): {} pages processed, {} failed, {} records captured out of {} pages requested",
            self.report.finish_reason,
            self.report.pages_processed,
            self.report.pages_failed,
            self.report.records_captured,
            self.report.pages_requested,
        );

        Ok(self.report)
    }

    /// Performs one page attempt and moves the state machine.
    pub async fn step(&mut self) -> Result<CollectorState, CollectError> {
        let consecutive_failures = match self.state {
            CollectorState::Waiting { consecutive_failures } => consecutive_failures,
            terminal => return Ok(terminal),
        };

        if self.report.pages_attempted >= self.settings.max_pages {
            return Ok(self.finish(FinishReason::PageLimit));
        }

        self.report.pages_attempted += 1;
        info!("capturing page {}/{}", self.report.pages_attempted, self.settings.max_pages);

        match self.capture_page().await {
            Ok(page) => {
                self.report.pages_processed += 1;
                let summary = self.sink_page(&page)?;

                self.state = if summary.total == 0 {
                    self.finish(FinishReason::EmptyPage)
                } else if summary.captured == 0 && summary.duplicates > 0 {
                    // only repeats and malformed elements: the feed is not advancing.
                    // A page of nothing but malformed elements is not treated as stuck.
                    self.finish(FinishReason::NoNewRecords)
                } else if !page.has_more() {
                    self.finish(FinishReason::NoMorePages)
                } else {
                    CollectorState::Waiting { consecutive_failures: 0 }
                };
            },
            Err(err) => {
                let consecutive_failures = consecutive_failures + 1;
                self.report.pages_failed += 1;
                if err.is_timeout() {
                    self.report.pages_timed_out += 1;
                }
                warn!(
                    "page {} failed ({}/{} consecutive): {}",
                    self.report.pages_attempted,
                    consecutive_failures,
                    self.settings.max_consecutive_failures,
                    err,
                );

                if consecutive_failures >= self.settings.max_consecutive_failures {
                    self.state = CollectorState::Exhausted;
                    return Err(CollectError::CaptureExhausted {
                        failures: consecutive_failures,
                        report: self.report.clone(),
                    });
                }

                self.state = CollectorState::Waiting { consecutive_failures };
            },
        }

        Ok(self.state)
    }

    async fn capture_page(&mut self) -> Result<CommentPage, PageError> {
        self.source.advance().await.map_err(PageError::CaptureSource)?;

        let timeout = self.settings.page_timeout;
        let body = tokio::time::timeout(timeout, self.source.wait())
            .await
            .map_err(|_| PageError::CaptureTimeout(timeout))?
            .map_err(PageError::CaptureSource)?;

        serde_json::from_value(body).map_err(|err| PageError::CaptureSource(err.into()))
    }

    fn sink_page(&mut self, page: &CommentPage) -> Result<PageSummary, CollectError> {
        let mut captured = 0;
        let mut duplicates = 0;

        for (position, value) in page.comments().iter().enumerate() {
            let record = match into_comment_record(value) {
                Ok(record) => record,
                Err(err) => {
                    warn!("skipping comment {} of page {}: {}", position, self.report.pages_attempted, err);
                    self.report.malformed_skipped += 1;
                    continue;
                },
            };

            if !self.seen.insert(record.key()) {
                debug!("skipping already captured comment from {}", record.nickname());
                self.report.duplicates_skipped += 1;
                duplicates += 1;
                continue;
            }

            self.sink.append(&record).map_err(CollectError::Sink)?;
            debug!("captured comment from {} ({} likes): {}", record.nickname(), record.like_count(), record.text());
            self.report.records_captured += 1;
            captured += 1;
            self.progress.update();
        }

        Ok(PageSummary {
            total: page.comments().len(),
            captured,
            duplicates,
        })
    }

    fn finish(&mut self, reason: FinishReason) -> CollectorState {
        match reason {
            FinishReason::PageLimit => info!("page limit of {} reached", self.settings.max_pages),
            FinishReason::EmptyPage => info!("page {} has no comments, end of data", self.report.pages_attempted),
            FinishReason::NoNewRecords => info!("page {} only repeated earlier comments, feed is not advancing", self.report.pages_attempted),
            FinishReason::NoMorePages => info!("source reports no more pages after page {}", self.report.pages_attempted),
        }

        self.report.finish_reason = Some(reason);
        self.state = CollectorState::Finished(reason);
        self.state
    }
}

pub async fn collect<S: CaptureSource, K: RecordSink>(
    source: &mut S,
    sink: &mut K,
    settings: CollectorSettings,
) -> Result<CollectionReport, CollectError> {
    Collector::new(source, sink, settings).run().await
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        std::collections::VecDeque,
        anyhow::anyhow,
        async_trait::async_trait,
        serde_json::{json, Value},
        crate::models::CommentRecord,
    };

    enum Reply {
        Page(Value),
        Hang,
        Fail,
    }

    #[derive(Default)]
    struct ScriptedSource {
        replies: VecDeque<Reply>,
        current: Option<Reply>,
        advances: u32,
    }

    impl ScriptedSource {
        fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: replies.into(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl CaptureSource for ScriptedSource {
        async fn advance(&mut self) -> anyhow::Result<()> {
            self.advances += 1;
            self.current = self.replies.pop_front();
            Ok(())
        }

        async fn wait(&mut self) -> anyhow::Result<Value> {
            match self.current.take() {
                Some(Reply::Page(body)) => Ok(body),
                Some(Reply::Fail) => Err(anyhow!("connection reset")),
                Some(Reply::Hang) => std::future::pending().await,
                None => Ok(json!({ "comments": [] })),
            }
        }
    }

    fn comment(id: u64) -> Value {
        json!({
            "cid": id.to_string(),
            "text": format!("comment {}", id),
            "user": { "nickname": format!("user{}", id) },
            "create_time": 1720000000 + id,
            "digg_count": id,
        })
    }

    fn page(ids: impl IntoIterator<Item = u64>) -> Reply {
        Reply::Page(json!({ "comments": ids.into_iter().map(comment).collect::<Vec<_>>(), "has_more": 1 }))
    }

    fn settings(max_pages: u32) -> CollectorSettings {
        CollectorSettings {
            max_pages,
            page_timeout: Duration::from_secs(30),
            max_consecutive_failures: 3,
        }
    }

    fn texts(records: &[CommentRecord]) -> Vec<&str> {
        records.iter().map(|v| v.text()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn two_timeouts_then_a_page_is_not_fatal() {
        let mut source = ScriptedSource::new(vec![Reply::Hang, Reply::Hang, page(1..=5)]);
        let mut sink = Vec::new();

        let report = collect(&mut source, &mut sink, settings(3)).await.unwrap();

        assert_eq!(report.records_captured, 5);
        assert_eq!(report.pages_failed, 2);
        assert_eq!(report.pages_timed_out, 2);
        assert_eq!(report.pages_processed, 1);
        assert_eq!(report.finish_reason, Some(FinishReason::PageLimit));
        assert_eq!(sink.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn three_consecutive_timeouts_exhaust_capture_and_keep_sunk_records() {
        let mut source = ScriptedSource::new(vec![page(1..=4), Reply::Hang, Reply::Hang, Reply::Hang, page(5..=6)]);
        let mut sink = Vec::new();

        let err = collect(&mut source, &mut sink, settings(10)).await.unwrap_err();

        match &err {
            CollectError::CaptureExhausted { failures, report } => {
                assert_eq!(*failures, 3);
                assert_eq!(report.records_captured, 4);
                assert_eq!(report.pages_attempted, 4);
            },
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(texts(&sink), vec!["comment 1", "comment 2", "comment 3", "comment 4"]);
        assert_eq!(source.advances, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn success_resets_the_failure_counter() {
        let mut source = ScriptedSource::new(vec![
            Reply::Hang, Reply::Fail, page([1]),
            Reply::Fail, Reply::Hang, page([2]),
        ]);
        let mut sink = Vec::new();

        let report = collect(&mut source, &mut sink, settings(6)).await.unwrap();

        assert_eq!(report.pages_failed, 4);
        assert_eq!(report.pages_timed_out, 2);
        assert_eq!(report.records_captured, 2);
    }

    #[tokio::test]
    async fn empty_page_ends_the_run_early() {
        let mut source = ScriptedSource::new(vec![page(1..=2), Reply::Page(json!({ "comments": null }))]);
        let mut sink = Vec::new();

        let report = collect(&mut source, &mut sink, settings(500)).await.unwrap();

        assert_eq!(report.pages_attempted, 2);
        assert_eq!(report.finish_reason, Some(FinishReason::EmptyPage));
        assert_eq!(source.advances, 2);
    }

    #[tokio::test]
    async fn duplicates_are_suppressed_and_a_stuck_feed_stops() {
        let mut source = ScriptedSource::new(vec![page(1..=3), page(3..=5), page(3..=5), page(6..=7)]);
        let mut sink = Vec::new();

        let report = collect(&mut source, &mut sink, settings(10)).await.unwrap();

        assert_eq!(texts(&sink), vec!["comment 1", "comment 2", "comment 3", "comment 4", "comment 5"]);
        assert_eq!(report.duplicates_skipped, 4);
        assert_eq!(report.finish_reason, Some(FinishReason::NoNewRecords));
    }

    #[tokio::test]
    async fn repeating_page_with_malformed_element_stops_as_stuck() {
        let body = json!({
            "comments": [comment(1), { "cid": "2", "text": "", "user": { "nickname": "user2" }, "create_time": 1720000002 }],
            "has_more": 1,
        });
        let mut source = ScriptedSource::new((0..500).map(|_| Reply::Page(body.clone())).collect());
        let mut sink = Vec::new();

        let report = collect(&mut source, &mut sink, settings(500)).await.unwrap();

        assert_eq!(report.finish_reason, Some(FinishReason::NoNewRecords));
        assert_eq!(source.advances, 2);
        assert_eq!(report.records_captured, 1);
        assert_eq!(report.duplicates_skipped, 1);
        assert_eq!(report.malformed_skipped, 2);
    }

    #[tokio::test]
    async fn malformed_only_page_does_not_stop_the_run() {
        let malformed = json!({ "comments": [{ "text": "no user" }], "has_more": 1 });
        let mut source = ScriptedSource::new(vec![Reply::Page(malformed), page([1])]);
        let mut sink = Vec::new();

        let report = collect(&mut source, &mut sink, settings(500)).await.unwrap();

        assert_eq!(texts(&sink), vec!["comment 1"]);
        assert_eq!(report.finish_reason, Some(FinishReason::EmptyPage));
        assert_eq!(source.advances, 3);
    }

    #[tokio::test]
    async fn malformed_elements_are_skipped_without_aborting_the_page() {
        let body = json!({
            "comments": [comment(1), { "text": "no user" }, null, comment(2)],
            "has_more": 0,
        });
        let mut source = ScriptedSource::new(vec![Reply::Page(body)]);
        let mut sink = Vec::new();

        let report = collect(&mut source, &mut sink, settings(10)).await.unwrap();

        assert_eq!(texts(&sink), vec!["comment 1", "comment 2"]);
        assert_eq!(report.malformed_skipped, 2);
        assert_eq!(report.finish_reason, Some(FinishReason::NoMorePages));
    }

    #[tokio::test]
    async fn zero_page_limit_captures_nothing() {
        let mut source = ScriptedSource::new(vec![page(1..=2)]);
        let mut sink = Vec::new();

        let report = collect(&mut source, &mut sink, settings(0)).await.unwrap();

        assert_eq!(report.pages_attempted, 0);
        assert_eq!(source.advances, 0);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn step_exposes_state_transitions() {
        let mut source = ScriptedSource::new(vec![Reply::Fail, page([1])]);
        let mut sink = Vec::new();
        let mut collector = Collector::new(&mut source, &mut sink, settings(5));

        assert_eq!(collector.state(), CollectorState::Waiting { consecutive_failures: 0 });
        assert_eq!(collector.step().await.unwrap(), CollectorState::Waiting { consecutive_failures: 1 });
        assert_eq!(collector.step().await.unwrap(), CollectorState::Waiting { consecutive_failures: 0 });
        assert_eq!(collector.step().await.unwrap(), CollectorState::Finished(FinishReason::EmptyPage));
        assert_eq!(collector.step().await.unwrap(), CollectorState::Finished(FinishReason::EmptyPage));
    }

    #[tokio::test]
    async fn sink_failure_is_fatal() {
        struct BrokenSink;

        impl RecordSink for BrokenSink {
            fn append(&mut self, _record: &CommentRecord) -> anyhow::Result<()> {
                Err(anyhow!("disk full"))
            }
        }

        let mut source = ScriptedSource::new(vec![page([1])]);
        let err = collect(&mut source, &mut BrokenSink, settings(5)).await.unwrap_err();

        assert!(matches!(err, CollectError::Sink(_)));
        assert!(err.report().is_none());
    }
}
