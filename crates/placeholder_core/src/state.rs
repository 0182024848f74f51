use std::fmt;
use std::sync::Arc;

use crate::effect::{GenerationItem, GenerationRequest};
use crate::view_model::{AppViewModel, LastIngestStats, ProgressView, QueueRowView, RunTally};

pub(crate) const INITIAL_STATUS: &str = "Select a folder to start.";

/// Stable reference key for a queued file, derived from its queue path, modification time and size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    /// `path` is the item's relative path, or its bare name for loose files.
    pub fn from_parts(path: &str, modified_ms: u64, size: u64) -> Self {
        Self(format!("{path}-{modified_ms}-{size}"))
    }

    /// Rebuilds an id from a key previously handed out through an effect.
    pub fn from_key(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file handed over by the host's file/folder selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    /// Path relative to the selected root, `/`-separated, including the root folder name.
    pub relative_path: Option<String>,
    /// MIME type as detected by the host; `None` when unknown.
    pub media_type: Option<String>,
    pub modified_ms: u64,
    pub size: u64,
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn is_image(&self) -> bool {
        self.media_type
            .as_deref()
            .is_some_and(|media_type| media_type.starts_with("image/"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Pending,
    Ready {
        width: u32,
        height: u32,
    },
    Unreadable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    id: ItemId,
    bytes: Arc<[u8]>,
    display_name: String,
    relative_path: String,
    extension: String,
    skip: bool,
    preview: PreviewState,
}

impl QueueItem {
    pub(crate) fn from_selected(file: SelectedFile) -> Self {
        let relative_path = file
            .relative_path
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| file.name.clone());
        // Same-named files in different folders are distinct items.
        let id = ItemId::from_parts(&relative_path, file.modified_ms, file.size);
        Self {
            id,
            bytes: file.bytes,
            extension: file_extension(&file.name),
            display_name: file.name,
            relative_path,
            skip: false,
            preview: PreviewState::Pending,
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn skip(&self) -> bool {
        self.skip
    }

    pub fn preview(&self) -> PreviewState {
        self.preview
    }

    fn to_generation_item(&self) -> GenerationItem {
        GenerationItem {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            relative_path: self.relative_path.clone(),
            bytes: Arc::clone(&self.bytes),
        }
    }
}

/// Text after the last `.` (the whole name when there is no dot); `"unknown"` when that is empty.
pub(crate) fn file_extension(name: &str) -> String {
    match name.rsplit('.').next() {
        Some(ext) if !ext.is_empty() => ext.to_string(),
        _ => "unknown".to_string(),
    }
}

/// `{current, total}` counters of a generation run; `current <= total` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    current: usize,
    total: usize,
}

impl Progress {
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub(crate) fn reset(&mut self, total: usize) {
        self.current = 0;
        self.total = total;
    }

    /// Returns false once `current` has reached `total`.
    pub(crate) fn advance(&mut self) -> bool {
        if self.current < self.total {
            self.current += 1;
            true
        } else {
            false
        }
    }
}

/// Lifecycle of the archive capability.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ArchiverStatus {
    #[default]
    Loading,
    Ready,
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    items: Vec<QueueItem>,
    progress: Progress,
    status: String,
    generating: bool,
    archiver: ArchiverStatus,
    last_ingest: Option<LastIngestStats>,
    last_run: Option<RunTally>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            progress: Progress::default(),
            status: INITIAL_STATUS.to_string(),
            generating: false,
            archiver: ArchiverStatus::default(),
            last_ingest: None,
            last_run: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let skipped_count = self.items.iter().filter(|item| item.skip).count();
        AppViewModel {
            items: self
                .items
                .iter()
                .map(|item| QueueRowView {
                    id: item.id.clone(),
                    display_name: item.display_name.clone(),
                    relative_path: item.relative_path.clone(),
                    extension: item.extension.clone(),
                    skip: item.skip,
                    preview: item.preview,
                })
                .collect(),
            item_count: self.items.len(),
            skipped_count,
            all_skipped: self.all_skipped(),
            progress: ProgressView {
                current: self.progress.current,
                total: self.progress.total,
            },
            status: self.status.clone(),
            generating: self.generating,
            archiver: self.archiver.clone(),
            can_generate: !self.generating
                && !self.items.is_empty()
                && self.archiver == ArchiverStatus::Ready,
            last_ingest: self.last_ingest.clone(),
            last_run: self.last_run.clone(),
            dirty: self.dirty,
        }
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn archiver(&self) -> &ArchiverStatus {
        &self.archiver
    }

    /// Returns and resets the dirty flag; the host renders only when it was set.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.dirty = true;
    }

    pub(crate) fn set_archiver(&mut self, archiver: ArchiverStatus) {
        if self.archiver != archiver {
            self.archiver = archiver;
            self.dirty = true;
        }
    }

    pub(crate) fn contains(&self, id: &ItemId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }

    pub(crate) fn push_item(&mut self, item: QueueItem) {
        self.items.push(item);
        self.dirty = true;
    }

    pub(crate) fn set_last_ingest(&mut self, stats: LastIngestStats) {
        self.last_ingest = Some(stats);
        self.dirty = true;
    }

    pub(crate) fn toggle_skip(&mut self, id: &ItemId) -> bool {
        match self.items.iter_mut().find(|item| &item.id == id) {
            Some(item) => {
                item.skip = !item.skip;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub(crate) fn all_skipped(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| item.skip)
    }

    pub(crate) fn set_all_skip(&mut self, skip: bool) {
        for item in &mut self.items {
            item.skip = skip;
        }
        self.dirty = true;
    }

    /// Empties the queue and returns the ids whose previews must be released.
    pub(crate) fn clear_items(&mut self) -> Vec<ItemId> {
        let ids = self.items.drain(..).map(|item| item.id).collect();
        self.last_ingest = None;
        self.dirty = true;
        ids
    }

    pub(crate) fn set_preview(&mut self, id: &ItemId, preview: PreviewState) {
        if let Some(item) = self.items.iter_mut().find(|item| &item.id == id) {
            item.preview = preview;
            self.dirty = true;
        }
    }

    /// Partitions the queue into an immutable snapshot, keeping queue order within each side.
    pub(crate) fn generation_snapshot(&self) -> GenerationRequest {
        let (skipped, included): (Vec<_>, Vec<_>) =
            self.items.iter().partition(|item| item.skip);
        GenerationRequest {
            included: included.iter().map(|item| item.to_generation_item()).collect(),
            skipped: skipped.iter().map(|item| item.to_generation_item()).collect(),
        }
    }

    pub(crate) fn begin_run(&mut self, total: usize) {
        self.generating = true;
        self.progress.reset(total);
        self.last_run = Some(RunTally::default());
        self.dirty = true;
    }

    pub(crate) fn last_run_mut(&mut self) -> Option<&mut RunTally> {
        self.last_run.as_mut()
    }

    pub(crate) fn advance_progress(&mut self) -> bool {
        let advanced = self.progress.advance();
        if advanced {
            self.dirty = true;
        }
        advanced
    }

    pub(crate) fn finish_run(&mut self) {
        self.generating = false;
        self.dirty = true;
    }
}
