use {
    tracing::{info, error},
    comments_core::{
        capture::{CaptureSource, ConfiguredSource},
        collector::{collect, CollectionReport, CollectorSettings},
        config::CollectorConfig,
        error::CollectError,
        sink::{CsvSink, RecordSink},
    },
};

pub async fn run_collection_step(config: &CollectorConfig) -> anyhow::Result<()> {
    let output_path = config.output_path();
    info!("writing comments to {}", output_path.display());

    let mut source = ConfiguredSource::from_config(&config.source())?;
    let mut sink = CsvSink::create(&output_path)?;

    let report = collect_with_report(&mut source, &mut sink, CollectorSettings::from(config)).await?;
    info!("captured {} comments into {}", report.records_captured, output_path.display());

    Ok(())
}

async fn collect_with_report<S: CaptureSource, K: RecordSink>(
    source: &mut S,
    sink: &mut K,
    settings: CollectorSettings,
) -> anyhow::Result<CollectionReport> {
    match collect(source, sink, settings).await {
        Ok(report) => {
            log_report(&report);
            Ok(report)
        },
        Err(err) => {
            if let CollectError::CaptureExhausted { report, .. } = &err {
                error!("capture source stopped responding, keeping what was captured so far");
                log_report(report);
            }
            Err(err.into())
        },
    }
}

fn log_report(report: &CollectionReport) {
    info!(
        "pages: {} requested, {} attempted, {} processed, {} failed ({} timed out)",
        report.pages_requested,
        report.pages_attempted,
        report.pages_processed,
        report.pages_failed,
        report.pages_timed_out,
    );
    info!(
        "records: {} captured, {} duplicates skipped, {} malformed skipped",
        report.records_captured,
        report.duplicates_skipped,
        report.malformed_skipped,
    );
}
