//! Placeholder core: pure queue state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, GenerationItem, GenerationRequest, PreviewRequest};
pub use msg::{ItemResultKind, Msg, RunResultKind};
pub use state::{
    AppState, ArchiverStatus, ItemId, PreviewState, Progress, QueueItem, SelectedFile,
};
pub use update::update;
pub use view_model::{AppViewModel, LastIngestStats, ProgressView, QueueRowView, RunTally};
