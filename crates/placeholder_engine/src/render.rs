use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tiny_skia::{Color, Paint, Pixmap};

use crate::label::LabelPainter;

/// An opaque sRGB colour; `(r, g, b)` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    fn to_color(self) -> Color {
        Color::from_rgba8(self.0, self.1, self.2, 0xff)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderStyle {
    pub background: Rgb,
    pub foreground: Rgb,
    pub min_font_px: f32,
    pub max_font_px: f32,
}

impl Default for PlaceholderStyle {
    fn default() -> Self {
        Self {
            background: Rgb(0xbc, 0xbc, 0xbc),
            foreground: Rgb(0x00, 0x00, 0x00),
            min_font_px: 14.0,
            max_font_px: 100.0,
        }
    }
}

/// `max(min_font_px, min(width / 10, height / 5, max_font_px))`.
pub fn font_size_for(width: u32, height: u32, style: &PlaceholderStyle) -> f32 {
    let fitted = (width as f32 / 10.0)
        .min(height as f32 / 5.0)
        .min(style.max_font_px);
    fitted.max(style.min_font_px)
}

pub fn dimension_label(width: u32, height: u32) -> String {
    format!("{width} x {height}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPlaceholder {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to decode source image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to encode placeholder: {0}")]
    Encode(String),
    #[error("render worker failed: {0}")]
    Worker(String),
}

/// Decodes `source` and paints a same-size placeholder: background fill plus a centred
/// `"{W} x {H}"` label. None of the source pixels survive.
pub fn render_placeholder(
    source: &[u8],
    style: &PlaceholderStyle,
    painter: &dyn LabelPainter,
) -> Result<RenderedPlaceholder, RenderError> {
    let decoded = image::load_from_memory(source)?;
    let (width, height) = (decoded.width(), decoded.height());
    drop(decoded);

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        RenderError::Encode(format!("cannot allocate a {width}x{height} canvas"))
    })?;
    pixmap.fill(style.background.to_color());

    let mut paint = Paint::default();
    paint.set_color(style.foreground.to_color());
    paint.anti_alias = true;

    let font_size = font_size_for(width, height, style);
    painter.paint(&mut pixmap, &dimension_label(width, height), font_size, &paint);

    let png = pixmap
        .encode_png()
        .map_err(|err| RenderError::Encode(err.to_string()))?;
    Ok(RenderedPlaceholder { width, height, png })
}

#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, source: Arc<[u8]>) -> Result<RenderedPlaceholder, RenderError>;
}

/// Runs [`render_placeholder`] on tokio's blocking pool.
#[derive(Clone)]
pub struct ImagePlaceholderRenderer {
    style: PlaceholderStyle,
    painter: Arc<dyn LabelPainter>,
}

impl ImagePlaceholderRenderer {
    pub fn new(style: PlaceholderStyle, painter: Arc<dyn LabelPainter>) -> Self {
        Self { style, painter }
    }

    pub fn style(&self) -> &PlaceholderStyle {
        &self.style
    }
}

#[async_trait::async_trait]
impl Renderer for ImagePlaceholderRenderer {
    async fn render(&self, source: Arc<[u8]>) -> Result<RenderedPlaceholder, RenderError> {
        let style = self.style.clone();
        let painter = Arc::clone(&self.painter);
        tokio::task::spawn_blocking(move || render_placeholder(&source, &style, painter.as_ref()))
            .await
            .map_err(|err| RenderError::Worker(err.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_size_follows_width_and_height_bounds() {
        let style = PlaceholderStyle::default();
        assert_eq!(font_size_for(1000, 500, &style), 100.0);
        assert_eq!(font_size_for(400, 200, &style), 40.0);
        assert_eq!(font_size_for(800, 100, &style), 20.0);
        assert_eq!(font_size_for(5000, 5000, &style), 100.0);
    }

    #[test]
    fn font_size_is_floored_at_minimum() {
        let style = PlaceholderStyle::default();
        assert_eq!(font_size_for(50, 50, &style), 14.0);
        assert_eq!(font_size_for(1, 1, &style), 14.0);
    }

    #[test]
    fn label_uses_spaced_x() {
        assert_eq!(dimension_label(1920, 1080), "1920 x 1080");
    }
}
