use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use placeholder_core::{
    Effect, GenerationItem, GenerationRequest, ItemId, ItemResultKind, Msg, RunResultKind,
    SelectedFile,
};
use placeholder_engine::{
    EngineConfig, EngineEvent, EngineHandle, ItemOutcome, RunRequest, ScannedFile, SourceItem,
};

/// Executes core effects on the engine and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, msg_tx: mpsc::Sender<Msg>) -> Self {
        engine_info!(
            "Engine output: {:?}/{}",
            config.output_dir,
            config.archive_name
        );
        let engine = EngineHandle::new(config);
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadPreviews { items } => {
                    engine_debug!("Loading {} previews", items.len());
                    for item in items {
                        self.engine.load_preview(item.id.as_str(), item.bytes);
                    }
                }
                Effect::ReleasePreviews { ids } => {
                    self.engine
                        .release_previews(ids.iter().map(ItemId::to_string).collect());
                }
                Effect::StartGeneration(request) => {
                    self.engine.start_run(run_request(request));
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || {
            forward_events(|timeout| engine.recv_timeout(timeout), msg_tx);
        });
    }
}

/// Pumps engine events into the message channel until either side goes away.
/// Dropping `msg_tx` on return lets the host's receiver observe the disconnect.
fn forward_events<F>(mut recv: F, msg_tx: mpsc::Sender<Msg>)
where
    F: FnMut(Duration) -> Result<EngineEvent, RecvTimeoutError>,
{
    loop {
        let event = match recv(Duration::from_millis(50)) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                engine_warn!("Engine stopped; no further events");
                break;
            }
        };
        let Some(msg) = map_event(event) else {
            continue;
        };
        if msg_tx.send(msg).is_err() {
            break;
        }
    }
}

fn run_request(request: GenerationRequest) -> RunRequest {
    RunRequest {
        included: request.included.into_iter().map(source_item).collect(),
        skipped: request.skipped.into_iter().map(source_item).collect(),
    }
}

fn source_item(item: GenerationItem) -> SourceItem {
    SourceItem {
        key: item.id.to_string(),
        display_name: item.display_name,
        relative_path: item.relative_path,
        bytes: item.bytes,
    }
}

pub fn map_event(event: EngineEvent) -> Option<Msg> {
    let msg = match event {
        EngineEvent::ArchiverReady => Msg::ArchiverReady,
        EngineEvent::ArchiverUnavailable(reason) => Msg::ArchiverUnavailable(reason),
        EngineEvent::PreviewReady { key, width, height } => Msg::PreviewLoaded {
            id: ItemId::from_key(key),
            width,
            height,
        },
        EngineEvent::PreviewFailed { key, reason } => {
            engine_debug!("No preview for {}: {}", key, reason);
            Msg::PreviewFailed {
                id: ItemId::from_key(key),
            }
        }
        EngineEvent::RunStarted { total } => {
            engine_debug!("Engine accepted run of {} items", total);
            return None;
        }
        EngineEvent::ItemProcessed { key, outcome } => Msg::ItemProcessed {
            id: ItemId::from_key(key),
            result: match outcome {
                ItemOutcome::Rendered { .. } => ItemResultKind::Rendered,
                ItemOutcome::PassedThrough => ItemResultKind::PassedThrough,
                ItemOutcome::Failed { .. } => ItemResultKind::Failed,
            },
        },
        EngineEvent::PackagingStarted => Msg::PackagingStarted,
        EngineEvent::CompressionProgress(percent) => Msg::CompressionProgress(percent),
        EngineEvent::RunCompleted(Ok(summary)) => Msg::RunFinished(RunResultKind::Saved {
            path: summary.path.display().to_string(),
            entries: summary.entries,
        }),
        EngineEvent::RunCompleted(Err(err)) => {
            engine_error!("Run failed: {}", err);
            Msg::RunFinished(RunResultKind::Failed {
                message: err.to_string(),
            })
        }
    };
    Some(msg)
}

pub fn selected_file(file: ScannedFile) -> SelectedFile {
    SelectedFile {
        name: file.name,
        relative_path: file.relative_path,
        media_type: file.media_type.map(str::to_string),
        modified_ms: file.modified_ms,
        size: file.size,
        bytes: file.bytes,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use placeholder_engine::{RunError, RunSummary};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn engine_keys_round_trip_to_item_ids() {
        let id = ItemId::from_parts("cat.png", 1_700_000_000_000, 2048);
        let msg = map_event(EngineEvent::PreviewReady {
            key: id.to_string(),
            width: 640,
            height: 480,
        });
        assert_eq!(
            msg,
            Some(Msg::PreviewLoaded {
                id,
                width: 640,
                height: 480
            })
        );
    }

    #[test]
    fn run_outcomes_map_to_result_kinds() {
        let saved = map_event(EngineEvent::RunCompleted(Ok(RunSummary {
            path: PathBuf::from("out/placeholder-images.zip"),
            entries: 3,
            rendered: 2,
            passed_through: 1,
            failed: 0,
            archive_bytes: 100,
        })));
        assert_eq!(
            saved,
            Some(Msg::RunFinished(RunResultKind::Saved {
                path: PathBuf::from("out/placeholder-images.zip")
                    .display()
                    .to_string(),
                entries: 3
            }))
        );

        let failed = map_event(EngineEvent::RunCompleted(Err(RunError::Archive(
            "disk full".to_string(),
        ))));
        assert!(matches!(
            failed,
            Some(Msg::RunFinished(RunResultKind::Failed { message })) if message.contains("disk full")
        ));

        assert_eq!(map_event(EngineEvent::RunStarted { total: 4 }), None);
    }

    #[test]
    fn generation_snapshot_keeps_ids_as_keys() {
        let item = GenerationItem {
            id: ItemId::from_parts("a.png", 1, 2),
            display_name: "a.png".to_string(),
            relative_path: "set/a.png".to_string(),
            bytes: Arc::from(vec![1, 2, 3]),
        };
        let request = run_request(GenerationRequest {
            included: Vec::new(),
            skipped: vec![item],
        });
        assert!(request.included.is_empty());
        assert_eq!(request.skipped[0].key, "a.png-1-2");
        assert_eq!(request.skipped[0].relative_path, "set/a.png");
    }

    #[test]
    fn forwarder_stops_and_hangs_up_when_engine_disconnects() {
        let (msg_tx, msg_rx) = mpsc::channel();
        let mut script = vec![
            Err(RecvTimeoutError::Disconnected),
            Ok(EngineEvent::ArchiverUnavailable("runtime".to_string())),
            Err(RecvTimeoutError::Timeout),
        ];

        forward_events(move |_| script.pop().unwrap(), msg_tx);

        assert_eq!(
            msg_rx.recv_timeout(Duration::from_secs(1)),
            Ok(Msg::ArchiverUnavailable("runtime".to_string()))
        );
        assert_eq!(
            msg_rx.recv_timeout(Duration::from_secs(1)),
            Err(RecvTimeoutError::Disconnected)
        );
    }

    #[test]
    fn scanned_files_keep_their_metadata() {
        let file = selected_file(ScannedFile {
            name: "b.jpg".to_string(),
            relative_path: Some("photos/b.jpg".to_string()),
            media_type: Some("image/jpeg"),
            modified_ms: 5,
            size: 3,
            bytes: Arc::from(vec![9, 9, 9]),
        });
        assert!(file.is_image());
        assert_eq!(file.relative_path.as_deref(), Some("photos/b.jpg"));
        assert_eq!(&*file.bytes, &[9, 9, 9]);
    }
}
