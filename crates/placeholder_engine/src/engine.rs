use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info};

use crate::archive::{ArchiveSettings, Readiness, ZipArchiver, ARCHIVE_FILE_NAME};
use crate::label::default_painter;
use crate::orchestrator::{ChannelProgressSink, Orchestrator, ProgressSink};
use crate::persist::DirectoryDelivery;
use crate::preview::{build_preview, PreviewCache};
use crate::render::{ImagePlaceholderRenderer, PlaceholderStyle};
use crate::{EngineEvent, RunRequest};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub output_dir: PathBuf,
    pub archive_name: String,
    pub style: PlaceholderStyle,
    pub archive: ArchiveSettings,
}

impl EngineConfig {
    pub fn default_with_output(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            archive_name: ARCHIVE_FILE_NAME.to_string(),
            style: PlaceholderStyle::default(),
            archive: ArchiveSettings::default(),
        }
    }
}

enum EngineCommand {
    LoadPreview { key: String, bytes: Arc<[u8]> },
    ReleasePreviews { keys: Vec<String> },
    StartRun(RunRequest),
}

/// Background engine: a thread owning a tokio runtime, fed through a command channel.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
    previews: Arc<PreviewCache>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let renderer = ImagePlaceholderRenderer::new(config.style, default_painter());
        let archiver = ZipArchiver::probe(config.archive);
        let delivery = DirectoryDelivery::new(config.output_dir);
        let orchestrator = Orchestrator::new(
            Arc::new(renderer),
            Arc::new(archiver),
            Arc::new(delivery),
        )
        .with_archive_name(config.archive_name);
        Self::with_orchestrator(orchestrator)
    }

    /// Starts the engine thread around an already assembled orchestrator.
    ///
    /// The first event is always the archiver's readiness.
    pub fn with_orchestrator(orchestrator: Orchestrator) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let previews = Arc::new(PreviewCache::new());
        let orchestrator = Arc::new(orchestrator);
        let cache = Arc::clone(&previews);

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Engine runtime failed to start: {}", err);
                    let _ = event_tx.send(EngineEvent::ArchiverUnavailable(format!(
                        "engine runtime failed to start: {err}"
                    )));
                    return;
                }
            };

            let readiness = match orchestrator.readiness() {
                Readiness::Ready => {
                    engine_info!("Archive capability ready");
                    EngineEvent::ArchiverReady
                }
                Readiness::Unavailable(reason) => {
                    engine_error!("Archive capability unavailable: {}", reason);
                    EngineEvent::ArchiverUnavailable(reason)
                }
            };
            let _ = event_tx.send(readiness);

            while let Ok(command) = cmd_rx.recv() {
                handle_command(&runtime, &orchestrator, &cache, command, &event_tx);
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
            previews,
        }
    }

    pub fn load_preview(&self, key: impl Into<String>, bytes: Arc<[u8]>) {
        let _ = self.cmd_tx.send(EngineCommand::LoadPreview {
            key: key.into(),
            bytes,
        });
    }

    pub fn release_previews(&self, keys: Vec<String>) {
        let _ = self.cmd_tx.send(EngineCommand::ReleasePreviews { keys });
    }

    pub fn start_run(&self, request: RunRequest) {
        let _ = self.cmd_tx.send(EngineCommand::StartRun(request));
    }

    pub fn previews(&self) -> &PreviewCache {
        &self.previews
    }

    /// `Disconnected` means the engine thread is gone and no further events will arrive.
    pub fn try_recv(&self) -> Result<EngineEvent, TryRecvError> {
        match self.event_rx.lock() {
            Ok(rx) => rx.try_recv(),
            Err(_) => Err(TryRecvError::Disconnected),
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, RecvTimeoutError> {
        match self.event_rx.lock() {
            Ok(rx) => rx.recv_timeout(timeout),
            Err(_) => Err(RecvTimeoutError::Disconnected),
        }
    }
}

fn handle_command(
    runtime: &tokio::runtime::Runtime,
    orchestrator: &Arc<Orchestrator>,
    cache: &Arc<PreviewCache>,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::LoadPreview { key, bytes } => {
            let cache = Arc::clone(cache);
            let event_tx = event_tx.clone();
            runtime.spawn_blocking(move || {
                let event = match build_preview(&bytes) {
                    Ok(info) => {
                        let (width, height) = (info.width, info.height);
                        cache.insert(key.clone(), info);
                        EngineEvent::PreviewReady { key, width, height }
                    }
                    Err(err) => {
                        engine_debug!("Preview failed for {}: {}", key, err);
                        EngineEvent::PreviewFailed {
                            key,
                            reason: err.to_string(),
                        }
                    }
                };
                let _ = event_tx.send(event);
            });
        }
        EngineCommand::ReleasePreviews { keys } => {
            let released = cache.release(keys.iter().map(String::as_str));
            engine_debug!("Released {} of {} previews", released, keys.len());
        }
        EngineCommand::StartRun(request) => {
            let orchestrator = Arc::clone(orchestrator);
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let sink = ChannelProgressSink::new(event_tx);
                let result = orchestrator.run(request, &sink).await;
                sink.emit(EngineEvent::RunCompleted(result));
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receivers_report_a_stopped_engine() {
        let (cmd_tx, _cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let handle = EngineHandle {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
            previews: Arc::new(PreviewCache::new()),
        };

        event_tx.send(EngineEvent::ArchiverReady).unwrap();
        assert_eq!(handle.try_recv(), Ok(EngineEvent::ArchiverReady));
        assert_eq!(handle.try_recv(), Err(TryRecvError::Empty));

        drop(event_tx);
        assert_eq!(handle.try_recv(), Err(TryRecvError::Disconnected));
        assert_eq!(
            handle.recv_timeout(Duration::from_secs(5)),
            Err(RecvTimeoutError::Disconnected)
        );
    }
}
