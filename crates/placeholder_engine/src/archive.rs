use std::collections::HashMap;
use std::io::{self, Cursor, Write};
use std::sync::Arc;

use chrono::{Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const ARCHIVE_FILE_NAME: &str = "placeholder-images.zip";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Compression {
    #[default]
    Deflated,
    Stored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArchiveSettings {
    pub compression: Compression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySource {
    Placeholder,
    Original,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Member path, used verbatim.
    pub path: String,
    pub bytes: Arc<[u8]>,
    pub source: EntrySource,
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("zip error: {0}")]
    Zip(#[from] ZipError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("archive worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Unavailable(String),
}

#[async_trait::async_trait]
pub trait Archiver: Send + Sync {
    fn readiness(&self) -> Readiness;

    /// Packs `entries` in order. `progress` receives a non-decreasing percentage;
    /// 100 is reported only once the archive is complete.
    async fn create_archive(
        &self,
        entries: &[ArchiveEntry],
        progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<Vec<u8>, ArchiveError>;
}

#[derive(Debug, Clone)]
pub struct ZipArchiver {
    settings: ArchiveSettings,
    readiness: Readiness,
}

impl ZipArchiver {
    /// Builds the archiver and checks once that an empty archive can be finalised.
    pub fn probe(settings: ArchiveSettings) -> Self {
        let readiness = match write_zip(&[], settings, &|_: u8| {}) {
            Ok(_) => Readiness::Ready,
            Err(err) => Readiness::Unavailable(err.to_string()),
        };
        Self {
            settings,
            readiness,
        }
    }
}

#[async_trait::async_trait]
impl Archiver for ZipArchiver {
    fn readiness(&self) -> Readiness {
        self.readiness.clone()
    }

    async fn create_archive(
        &self,
        entries: &[ArchiveEntry],
        progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<Vec<u8>, ArchiveError> {
        // Payloads are shared `Arc`s; only the entry list is copied onto the worker.
        let owned: Vec<ArchiveEntry> = merge_duplicate_paths(entries)
            .into_iter()
            .cloned()
            .collect();
        let settings = self.settings;
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let worker = tokio::task::spawn_blocking(move || {
            let members: Vec<&ArchiveEntry> = owned.iter().collect();
            write_zip(&members, settings, &move |percent: u8| {
                let _ = tx.send(percent);
            })
        });

        while let Some(percent) = rx.recv().await {
            progress(percent);
        }
        worker
            .await
            .map_err(|err| ArchiveError::Worker(err.to_string()))?
    }
}

/// Later entries replace earlier ones with the same path, keeping the first position.
fn merge_duplicate_paths(entries: &[ArchiveEntry]) -> Vec<&ArchiveEntry> {
    let mut slots: HashMap<&str, usize> = HashMap::with_capacity(entries.len());
    let mut members: Vec<&ArchiveEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match slots.get(entry.path.as_str()) {
            Some(&slot) => members[slot] = entry,
            None => {
                slots.insert(entry.path.as_str(), members.len());
                members.push(entry);
            }
        }
    }
    members
}

fn write_zip(
    members: &[&ArchiveEntry],
    settings: ArchiveSettings,
    progress: &(dyn Fn(u8) + Send + Sync),
) -> Result<Vec<u8>, ArchiveError> {
    let mut reporter = PercentReporter::new(members, progress);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let modified = entry_timestamp();

    for member in members {
        let options = SimpleFileOptions::default()
            .compression_method(match settings.compression {
                Compression::Deflated => CompressionMethod::Deflated,
                Compression::Stored => CompressionMethod::Stored,
            })
            .last_modified_time(modified)
            .unix_permissions(0o644)
            .large_file(member.bytes.len() as u64 >= u64::from(u32::MAX));
        writer.start_file(member.path.as_str(), options)?;
        writer.write_all(&member.bytes)?;
        reporter.advance(member);
    }

    let cursor = writer.finish()?;
    progress(100);
    Ok(cursor.into_inner())
}

fn entry_timestamp() -> zip::DateTime {
    let now = Local::now();
    zip::DateTime::from_date_and_time(
        u16::try_from(now.year()).unwrap_or(1980),
        now.month() as u8,
        now.day() as u8,
        now.hour() as u8,
        now.minute() as u8,
        now.second() as u8,
    )
    .unwrap_or_default()
}

/// Byte-weighted percentage; each entry also counts one unit so empty payloads still move it.
struct PercentReporter<'a> {
    total: u64,
    done: u64,
    last: Option<u8>,
    emit: &'a (dyn Fn(u8) + Send + Sync),
}

impl<'a> PercentReporter<'a> {
    fn new(members: &[&ArchiveEntry], emit: &'a (dyn Fn(u8) + Send + Sync)) -> Self {
        let total = members.iter().map(|m| weight(m)).sum();
        Self {
            total,
            done: 0,
            last: None,
            emit,
        }
    }

    fn advance(&mut self, member: &ArchiveEntry) {
        self.done += weight(member);
        // 100 is reserved for the finished archive.
        let percent = ((self.done * 100) / self.total.max(1)).min(99) as u8;
        if self.last.map_or(true, |last| percent > last) {
            self.last = Some(percent);
            (self.emit)(percent);
        }
    }
}

fn weight(member: &ArchiveEntry) -> u64 {
    member.bytes.len() as u64 + 1
}
