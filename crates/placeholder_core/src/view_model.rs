use crate::{ArchiverStatus, ItemId, PreviewState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LastIngestStats {
    pub added: usize,
    pub duplicates: usize,
    pub ignored: usize,
}

/// Per-run outcome counters, kept after the run for display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunTally {
    pub rendered: usize,
    pub passed_through: usize,
    pub failed: usize,
    pub compression_percent: u8,
    pub saved_to: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressView {
    pub current: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub items: Vec<QueueRowView>,
    pub item_count: usize,
    pub skipped_count: usize,
    pub all_skipped: bool,
    pub progress: ProgressView,
    pub status: String,
    pub generating: bool,
    pub archiver: ArchiverStatus,
    pub can_generate: bool,
    pub last_ingest: Option<LastIngestStats>,
    pub last_run: Option<RunTally>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRowView {
    pub id: ItemId,
    pub display_name: String,
    pub relative_path: String,
    pub extension: String,
    pub skip: bool,
    pub preview: PreviewState,
}
