//! Placeholder engine: rendering, packaging and effect execution.
mod archive;
mod engine;
mod label;
mod orchestrator;
mod persist;
mod preview;
mod render;
mod scan;
mod types;

pub use archive::{
    ArchiveEntry, ArchiveError, ArchiveSettings, Archiver, Compression, EntrySource, Readiness,
    ZipArchiver, ARCHIVE_FILE_NAME,
};
pub use engine::{EngineConfig, EngineHandle};
pub use label::{default_painter, LabelPainter, SegmentPainter, SystemFontPainter};
pub use orchestrator::{ChannelProgressSink, Orchestrator, ProgressSink};
pub use persist::{ensure_output_dir, ArchiveDelivery, AtomicFileWriter, DirectoryDelivery, PersistError};
pub use preview::{build_preview, PreviewCache, PreviewInfo, THUMBNAIL_SIZE};
pub use render::{
    dimension_label, font_size_for, render_placeholder, ImagePlaceholderRenderer,
    PlaceholderStyle, RenderError, RenderedPlaceholder, Renderer, Rgb,
};
pub use scan::{media_type_for, scan_folder, scan_selection, ScanError, ScannedFile};
pub use types::{EngineEvent, ItemOutcome, RunError, RunRequest, RunSummary, SourceItem};
