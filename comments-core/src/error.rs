//! Error taxonomy shared by the collection and analysis passes.
//!
//! Per-record and per-page failures are recoverable and only logged by the
//! collector; `CollectError` is what ends a collection run early, and
//! `LexiconLoadError` is what stops an analysis run from starting.

use {
    std::{path::{Path, PathBuf}, time::Duration},
    thiserror::Error,
    crate::collector::CollectionReport,
};

/// A single page that could not be captured.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("capture source did not respond within {0:?}")]
    CaptureTimeout(Duration),

    #[error("capture source failed: {0}")]
    CaptureSource(#[source] anyhow::Error),
}

/// Terminal outcomes of a collection run.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Records sunk before the run gave up stay in the sink; `report` describes them.
    #[error("capture exhausted after {failures} consecutive failed pages")]
    CaptureExhausted {
        failures: u32,
        report: CollectionReport,
    },

    #[error("failed to append record to sink: {0}")]
    Sink(#[source] anyhow::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed comment record: {reason}")]
pub struct MalformedRecord {
    reason: String,
}

#[derive(Debug, Error)]
#[error("failed to load {resource} from {}", .path.display())]
pub struct LexiconLoadError {
    resource: &'static str,
    path: PathBuf,
    #[source]
    source: std::io::Error,
}

impl PageError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::CaptureTimeout(_))
    }
}

impl CollectError {
    pub fn report(&self) -> Option<&CollectionReport> {
        match self {
            Self::CaptureExhausted { report, .. } => Some(report),
            Self::Sink(_) => None,
        }
    }
}

impl MalformedRecord {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl LexiconLoadError {
    pub fn new(resource: &'static str, path: PathBuf, source: std::io::Error) -> Self {
        Self {
            resource,
            path,
            source,
        }
    }

    pub fn resource(&self) -> &str {
        self.resource
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
