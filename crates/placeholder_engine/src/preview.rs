use std::collections::HashMap;
use std::sync::Mutex;

use image::RgbaImage;

/// Longest edge of generated preview thumbnails.
pub const THUMBNAIL_SIZE: u32 = 96;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewInfo {
    pub width: u32,
    pub height: u32,
    pub thumbnail: RgbaImage,
}

pub fn build_preview(bytes: &[u8]) -> Result<PreviewInfo, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    Ok(PreviewInfo {
        width: decoded.width(),
        height: decoded.height(),
        thumbnail: decoded.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE).to_rgba8(),
    })
}

/// Transient per-item previews, keyed by item key; entries live until released.
#[derive(Debug, Default)]
pub struct PreviewCache {
    entries: Mutex<HashMap<String, PreviewInfo>>,
}

impl PreviewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: String, info: PreviewInfo) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, info);
        }
    }

    pub fn dimensions(&self, key: &str) -> Option<(u32, u32)> {
        let entries = self.entries.lock().ok()?;
        entries.get(key).map(|info| (info.width, info.height))
    }

    /// Drops the given previews and returns how many were present.
    pub fn release<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> usize {
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };
        keys.into_iter()
            .filter(|key| entries.remove(*key).is_some())
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
