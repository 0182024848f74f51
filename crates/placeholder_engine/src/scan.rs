use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use image::ImageFormat;
use walkdir::WalkDir;

/// A file found by a folder or file selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub name: String,
    /// `/`-separated path starting with the selected folder's name; `None` for loose files.
    pub relative_path: Option<String>,
    pub media_type: Option<&'static str>,
    pub modified_ms: u64,
    pub size: u64,
    /// File contents; left empty for files that are not image-typed.
    pub bytes: Arc<[u8]>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("selection {0:?} does not exist")]
    Missing(PathBuf),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("io error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// MIME type derived from the file extension, e.g. `image/png`.
pub fn media_type_for(path: &Path) -> Option<&'static str> {
    ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type())
}

/// Scans one selection: a folder is walked recursively, a single file is taken as-is.
pub fn scan_selection(path: &Path) -> Result<Vec<ScannedFile>, ScanError> {
    if path.is_dir() {
        scan_folder(path)
    } else if path.is_file() {
        Ok(vec![read_entry(path, None)?])
    } else {
        Err(ScanError::Missing(path.to_path_buf()))
    }
}

/// Walks `root` in file-name order. Relative paths include the root folder's name.
pub fn scan_folder(root: &Path) -> Result<Vec<ScannedFile>, ScanError> {
    let root = root.canonicalize().map_err(|source| ScanError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    let root_name = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(&root)
            .unwrap_or_else(|_| entry.path());
        let mut parts: Vec<String> = root_name.iter().cloned().collect();
        parts.extend(
            relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy().into_owned()),
        );
        files.push(read_entry(entry.path(), Some(parts.join("/")))?);
    }
    Ok(files)
}

fn read_entry(path: &Path, relative_path: Option<String>) -> Result<ScannedFile, ScanError> {
    let io_err = |source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    };
    let meta = fs::metadata(path).map_err(io_err)?;
    let media_type = media_type_for(path);
    let bytes: Arc<[u8]> = if media_type.is_some() {
        Arc::from(fs::read(path).map_err(io_err)?)
    } else {
        Arc::from(Vec::new())
    };
    let modified_ms = meta
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0);

    Ok(ScannedFile {
        name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        relative_path,
        media_type,
        modified_ms,
        size: meta.len(),
        bytes,
    })
}
