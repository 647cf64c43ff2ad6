use std::fmt;
use std::path::PathBuf;

use pagegrab_core::BatchItem;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FetchFailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FetchFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for FetchFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailureKind::InvalidUrl => write!(f, "invalid url"),
            FetchFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FetchFailureKind::Timeout => write!(f, "timeout"),
            FetchFailureKind::Network => write!(f, "network error"),
            FetchFailureKind::Decode => write!(f, "decode error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct CaptureError {
    pub kind: CaptureFailureKind,
    pub message: String,
}

impl CaptureError {
    pub(crate) fn new(kind: CaptureFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFailureKind {
    ConfigInvalid,
    NavigationFailed,
    CaptureFailed,
}

impl fmt::Display for CaptureFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureFailureKind::ConfigInvalid => write!(f, "invalid capture configuration"),
            CaptureFailureKind::NavigationFailed => write!(f, "navigation failed"),
            CaptureFailureKind::CaptureFailed => write!(f, "capture failed"),
        }
    }
}

/// A per-item failure caught at the batch-runner boundary. Never aborts
/// the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("could not persist artifact: {0}")]
    Persist(String),
    #[error("line carries no resolvable target")]
    MissingTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub item: BatchItem,
    pub outcome: Result<PathBuf, ActionError>,
}

/// Events delivered to the single observer of one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// Emitted after each item completes; monotonically non-decreasing and
    /// exactly 100 at the end of a non-empty run.
    Progress { percent: u8 },
    Log { message: String },
    /// Emitted exactly once per run, empty input included.
    Finished { results: Vec<BatchResult> },
}

/// The two independent batch streams of a run. Their progress counters are
/// never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Fetch,
    Capture,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Fetch => write!(f, "pages"),
            StreamKind::Capture => write!(f, "screenshots"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub stream: StreamKind,
    pub event: BatchEvent,
}
