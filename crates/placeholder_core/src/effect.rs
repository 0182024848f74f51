use std::sync::Arc;

use crate::ItemId;

/// Side effects requested by `update`; the host executes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Build previews for newly ingested items.
    LoadPreviews { items: Vec<PreviewRequest> },
    /// Drop previews of items that left the queue.
    ReleasePreviews { ids: Vec<ItemId> },
    /// Render, package and deliver the snapshot.
    StartGeneration(GenerationRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    pub id: ItemId,
    pub bytes: Arc<[u8]>,
}

/// Immutable snapshot of the queue taken when a run starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationRequest {
    pub included: Vec<GenerationItem>,
    pub skipped: Vec<GenerationItem>,
}

impl GenerationRequest {
    pub fn total(&self) -> usize {
        self.included.len() + self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.included.is_empty() && self.skipped.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationItem {
    pub id: ItemId,
    pub display_name: String,
    pub relative_path: String,
    pub bytes: Arc<[u8]>,
}
