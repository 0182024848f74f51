use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// One queued file as the engine sees it. `key` is the host's stable item id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    pub key: String,
    pub display_name: String,
    pub relative_path: String,
    pub bytes: Arc<[u8]>,
}

/// Snapshot of one generation run: `included` items are rendered, `skipped` pass through.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunRequest {
    pub included: Vec<SourceItem>,
    pub skipped: Vec<SourceItem>,
}

impl RunRequest {
    pub fn total(&self) -> usize {
        self.included.len() + self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.included.is_empty() && self.skipped.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Rendered { width: u32, height: u32 },
    PassedThrough,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub path: PathBuf,
    pub entries: usize,
    pub rendered: usize,
    pub passed_through: usize,
    pub failed: usize,
    pub archive_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error("nothing to process")]
    NothingToProcess,
    #[error("archive capability unavailable: {0}")]
    DependencyUnavailable(String),
    #[error("archive creation failed: {0}")]
    Archive(String),
    #[error("saving archive failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    ArchiverReady,
    ArchiverUnavailable(String),
    PreviewReady {
        key: String,
        width: u32,
        height: u32,
    },
    PreviewFailed {
        key: String,
        reason: String,
    },
    RunStarted {
        total: usize,
    },
    ItemProcessed {
        key: String,
        outcome: ItemOutcome,
    },
    PackagingStarted,
    CompressionProgress(u8),
    RunCompleted(Result<RunSummary, RunError>),
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemOutcome::Rendered { width, height } => write!(f, "rendered {width}x{height}"),
            ItemOutcome::PassedThrough => write!(f, "passed through"),
            ItemOutcome::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}
