use std::sync::{mpsc, Arc};

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};

use crate::archive::{ArchiveEntry, Archiver, EntrySource, Readiness, ARCHIVE_FILE_NAME};
use crate::persist::ArchiveDelivery;
use crate::render::Renderer;
use crate::{EngineEvent, ItemOutcome, RunError, RunRequest, RunSummary};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Drains a [`RunRequest`]: renders included items, passes skipped ones through,
/// packages everything and delivers the archive once.
pub struct Orchestrator {
    renderer: Arc<dyn Renderer>,
    archiver: Arc<dyn Archiver>,
    delivery: Arc<dyn ArchiveDelivery>,
    archive_name: String,
}

impl Orchestrator {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        archiver: Arc<dyn Archiver>,
        delivery: Arc<dyn ArchiveDelivery>,
    ) -> Self {
        Self {
            renderer,
            archiver,
            delivery,
            archive_name: ARCHIVE_FILE_NAME.to_string(),
        }
    }

    pub fn with_archive_name(mut self, archive_name: impl Into<String>) -> Self {
        self.archive_name = archive_name.into();
        self
    }

    pub fn readiness(&self) -> Readiness {
        self.archiver.readiness()
    }

    pub async fn run(
        &self,
        request: RunRequest,
        sink: &dyn ProgressSink,
    ) -> Result<RunSummary, RunError> {
        if let Readiness::Unavailable(reason) = self.archiver.readiness() {
            return Err(RunError::DependencyUnavailable(reason));
        }
        if request.is_empty() {
            return Err(RunError::NothingToProcess);
        }

        let total = request.total();
        engine_info!(
            "Generation started: {} to render, {} to pass through",
            request.included.len(),
            request.skipped.len()
        );
        sink.emit(EngineEvent::RunStarted { total });

        let mut entries = Vec::with_capacity(total);
        let mut rendered = 0;
        let mut failed = 0;

        // Strictly one item at a time, in queue order.
        for item in request.included {
            let outcome = match self.renderer.render(Arc::clone(&item.bytes)).await {
                Ok(placeholder) => {
                    rendered += 1;
                    entries.push(ArchiveEntry {
                        path: item.relative_path,
                        bytes: Arc::from(placeholder.png),
                        source: EntrySource::Placeholder,
                    });
                    ItemOutcome::Rendered {
                        width: placeholder.width,
                        height: placeholder.height,
                    }
                }
                Err(err) => {
                    failed += 1;
                    engine_warn!(
                        "Placeholder generation failed for {}: {}",
                        item.display_name,
                        err
                    );
                    ItemOutcome::Failed {
                        reason: err.to_string(),
                    }
                }
            };
            engine_debug!("{} -> {}", item.key, outcome);
            sink.emit(EngineEvent::ItemProcessed {
                key: item.key,
                outcome,
            });
        }

        let passed_through = request.skipped.len();
        for item in request.skipped {
            entries.push(ArchiveEntry {
                path: item.relative_path,
                bytes: item.bytes,
                source: EntrySource::Original,
            });
            sink.emit(EngineEvent::ItemProcessed {
                key: item.key,
                outcome: ItemOutcome::PassedThrough,
            });
        }

        sink.emit(EngineEvent::PackagingStarted);
        let report = |percent: u8| sink.emit(EngineEvent::CompressionProgress(percent));
        let archive = self
            .archiver
            .create_archive(&entries, &report)
            .await
            .map_err(|err| {
                engine_error!("ZIP generation failed: {}", err);
                RunError::Archive(err.to_string())
            })?;

        let path = self
            .delivery
            .deliver(&self.archive_name, &archive)
            .map_err(|err| {
                engine_error!("Saving {} failed: {}", self.archive_name, err);
                RunError::Delivery(err.to_string())
            })?;
        engine_info!(
            "Archive saved to {:?} ({} bytes, {} entries, {} failed)",
            path,
            archive.len(),
            entries.len(),
            failed
        );

        Ok(RunSummary {
            path,
            entries: entries.len(),
            rendered,
            passed_through,
            failed,
            archive_bytes: archive.len() as u64,
        })
    }
}
