#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User selected files (one folder selection); appended to the queue.
    FilesSelected(Vec<crate::SelectedFile>),
    /// User flipped the Skip checkbox of one item.
    SkipToggled(crate::ItemId),
    /// User flipped the Skip All checkbox.
    SkipAllToggled,
    /// User clicked Clear.
    ClearClicked,
    /// User clicked Generate & Create ZIP.
    GenerateClicked,
    /// Archive capability finished initializing.
    ArchiverReady,
    /// Archive capability failed to initialize.
    ArchiverUnavailable(String),
    /// Engine decoded a preview for an item.
    PreviewLoaded {
        id: crate::ItemId,
        width: u32,
        height: u32,
    },
    /// Engine could not decode a preview for an item.
    PreviewFailed { id: crate::ItemId },
    /// Engine finished one item of the run (rendered, passed through or failed).
    ItemProcessed {
        id: crate::ItemId,
        result: crate::ItemResultKind,
    },
    /// Engine started building the archive.
    PackagingStarted,
    /// Engine compression progress, 0-100.
    CompressionProgress(u8),
    /// Engine finished the run.
    RunFinished(crate::RunResultKind),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemResultKind {
    Rendered,
    PassedThrough,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResultKind {
    Saved { path: String, entries: usize },
    Failed { message: String },
}
