use std::collections::HashSet;

use crate::state::QueueItem;
use crate::{
    AppState, ArchiverStatus, Effect, ItemId, ItemResultKind, LastIngestStats, Msg,
    PreviewRequest, PreviewState, RunResultKind, SelectedFile,
};

const STATUS_NO_IMAGES: &str = "No image files found.";
const STATUS_CLEARED: &str = "Queue cleared. Select or drop a folder to start.";
const STATUS_NOT_READY: &str = "ZIP library is not ready. Please wait or refresh.";
const STATUS_LOAD_FAILED: &str = "Error: Could not load ZIP functionality. Please refresh.";
const STATUS_NOTHING_TO_PROCESS: &str = "No images in the queue to process.";
const STATUS_INITIALIZING: &str = "Initializing...";
const STATUS_PACKAGING: &str = "Generating ZIP file... This may take a moment.";
const STATUS_ARCHIVE_FAILED: &str = "Error: Could not generate the ZIP file.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesSelected(files) => {
            if state.is_generating() {
                return (state, Vec::new());
            }
            ingest(&mut state, files)
        }
        Msg::SkipToggled(id) => {
            if !state.is_generating() {
                state.toggle_skip(&id);
            }
            Vec::new()
        }
        Msg::SkipAllToggled => {
            // Empty queue is a no-op rather than "toggle to all skipped".
            if !state.is_generating() && !state.items().is_empty() {
                let all_skipped = state.all_skipped();
                state.set_all_skip(!all_skipped);
            }
            Vec::new()
        }
        Msg::ClearClicked => {
            if state.is_generating() {
                return (state, Vec::new());
            }
            let ids = state.clear_items();
            state.set_status(STATUS_CLEARED);
            if ids.is_empty() {
                Vec::new()
            } else {
                vec![Effect::ReleasePreviews { ids }]
            }
        }
        Msg::GenerateClicked => start_generation(&mut state),
        Msg::ArchiverReady => {
            state.set_archiver(ArchiverStatus::Ready);
            Vec::new()
        }
        Msg::ArchiverUnavailable(reason) => {
            state.set_archiver(ArchiverStatus::Unavailable(reason));
            state.set_status(STATUS_LOAD_FAILED);
            Vec::new()
        }
        Msg::PreviewLoaded { id, width, height } => {
            state.set_preview(&id, PreviewState::Ready { width, height });
            Vec::new()
        }
        Msg::PreviewFailed { id } => {
            state.set_preview(&id, PreviewState::Unreadable);
            Vec::new()
        }
        Msg::ItemProcessed { id: _, result } => {
            if state.is_generating() && state.advance_progress() {
                if let Some(tally) = state.last_run_mut() {
                    match result {
                        ItemResultKind::Rendered => tally.rendered += 1,
                        ItemResultKind::PassedThrough => tally.passed_through += 1,
                        ItemResultKind::Failed => tally.failed += 1,
                    }
                }
            }
            Vec::new()
        }
        Msg::PackagingStarted => {
            if state.is_generating() {
                state.set_status(STATUS_PACKAGING);
            }
            Vec::new()
        }
        Msg::CompressionProgress(percent) => {
            if state.is_generating() {
                let percent = percent.min(100);
                if let Some(tally) = state.last_run_mut() {
                    tally.compression_percent = tally.compression_percent.max(percent);
                }
                state.set_status(format!("Compressing... {percent}%"));
            }
            Vec::new()
        }
        Msg::RunFinished(result) => {
            if !state.is_generating() {
                return (state, Vec::new());
            }
            match result {
                RunResultKind::Saved { path, entries: _ } => {
                    let status = format!("Process complete! ZIP file saved to {path}.");
                    if let Some(tally) = state.last_run_mut() {
                        tally.compression_percent = 100;
                        tally.saved_to = Some(path);
                    }
                    state.set_status(status);
                }
                RunResultKind::Failed { message: _ } => {
                    state.set_status(STATUS_ARCHIVE_FAILED);
                }
            }
            state.finish_run();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn ingest(state: &mut AppState, files: Vec<SelectedFile>) -> Vec<Effect> {
    let total = files.len();
    let images: Vec<SelectedFile> = files.into_iter().filter(SelectedFile::is_image).collect();
    let ignored = total - images.len();
    if images.is_empty() {
        state.set_last_ingest(LastIngestStats {
            added: 0,
            duplicates: 0,
            ignored,
        });
        state.set_status(STATUS_NO_IMAGES);
        return Vec::new();
    }

    let image_count = images.len();
    let mut seen: HashSet<ItemId> = HashSet::with_capacity(image_count);
    let mut previews = Vec::with_capacity(image_count);
    let mut duplicates = 0;
    for file in images {
        let item = QueueItem::from_selected(file);
        if state.contains(item.id()) || !seen.insert(item.id().clone()) {
            duplicates += 1;
            continue;
        }
        previews.push(PreviewRequest {
            id: item.id().clone(),
            bytes: item.bytes().clone(),
        });
        state.push_item(item);
    }

    let added = previews.len();
    state.set_last_ingest(LastIngestStats {
        added,
        duplicates,
        ignored,
    });
    if added == 0 {
        state.set_status(format!(
            "All {image_count} image(s) are already in the queue."
        ));
        return Vec::new();
    }
    state.set_status(format!(
        "{added} image(s) loaded. Ready to generate placeholders."
    ));
    vec![Effect::LoadPreviews { items: previews }]
}

fn start_generation(state: &mut AppState) -> Vec<Effect> {
    if state.is_generating() {
        return Vec::new();
    }
    if *state.archiver() != ArchiverStatus::Ready {
        state.set_status(STATUS_NOT_READY);
        return Vec::new();
    }

    let request = state.generation_snapshot();
    if request.is_empty() {
        state.set_status(STATUS_NOTHING_TO_PROCESS);
        return Vec::new();
    }

    state.begin_run(request.total());
    state.set_status(STATUS_INITIALIZING);
    vec![Effect::StartGeneration(request)]
}
