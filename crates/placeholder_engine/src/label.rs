//! Label painting: draws the dimension text centred on a placeholder canvas.
//!
//! Two painters exist. [`SystemFontPainter`] outlines glyphs from a bold
//! sans-serif system face. [`SegmentPainter`] needs no fonts at all and draws
//! seven-segment digits; it is the fallback on hosts without a usable face.

use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform,
};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

const SANS_SERIF_FAMILIES: [Family<'static>; 5] = [
    Family::SansSerif,
    Family::Name("Arial"),
    Family::Name("Helvetica"),
    Family::Name("DejaVu Sans"),
    Family::Name("Liberation Sans"),
];

pub trait LabelPainter: Send + Sync {
    fn name(&self) -> &str;

    /// Draws `text` centred (horizontally and on its middle line) in `pixmap`.
    fn paint(&self, pixmap: &mut Pixmap, text: &str, font_size: f32, paint: &Paint<'_>);
}

/// Picks the system font painter when a bold sans-serif face is installed.
pub fn default_painter() -> Arc<dyn LabelPainter> {
    match SystemFontPainter::discover() {
        Some(painter) => {
            engine_info!("Label font: {}", painter.name());
            Arc::new(painter)
        }
        None => {
            engine_warn!("No bold sans-serif system font found; using segment digits");
            Arc::new(SegmentPainter)
        }
    }
}

pub struct SystemFontPainter {
    db: Database,
    face: fontdb::ID,
    family: String,
}

impl SystemFontPainter {
    pub fn discover() -> Option<Self> {
        let mut db = Database::new();
        db.load_system_fonts();
        Self::from_database(db)
    }

    pub fn from_database(db: Database) -> Option<Self> {
        let face = db.query(&Query {
            families: &SANS_SERIF_FAMILIES,
            weight: Weight::BOLD,
            stretch: Stretch::Normal,
            style: Style::Normal,
        })?;
        let parses = db.with_face_data(face, |data, index| Face::parse(data, index).is_ok())?;
        if !parses {
            return None;
        }
        let family = db
            .face(face)
            .and_then(|info| info.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| "sans-serif".to_string());
        Some(Self { db, face, family })
    }
}

impl LabelPainter for SystemFontPainter {
    fn name(&self) -> &str {
        &self.family
    }

    fn paint(&self, pixmap: &mut Pixmap, text: &str, font_size: f32, paint: &Paint<'_>) {
        let center_x = pixmap.width() as f32 / 2.0;
        let center_y = pixmap.height() as f32 / 2.0;
        let path = self
            .db
            .with_face_data(self.face, |data, index| {
                let face = Face::parse(data, index).ok()?;
                outline_text(&face, text, font_size, center_x, center_y)
            })
            .flatten();

        if let Some(path) = path {
            pixmap.fill_path(&path, paint, FillRule::Winding, Transform::identity(), None);
        }
    }
}

fn outline_text(face: &Face<'_>, text: &str, font_size: f32, center_x: f32, center_y: f32) -> Option<Path> {
    let scale = font_size / f32::from(face.units_per_em());
    let glyphs: Vec<GlyphId> = text
        .chars()
        .map(|ch| face.glyph_index(ch).unwrap_or(GlyphId(0)))
        .collect();
    let advance = |glyph: GlyphId| f32::from(face.glyph_hor_advance(glyph).unwrap_or(0)) * scale;

    let width: f32 = glyphs.iter().map(|glyph| advance(*glyph)).sum();
    // Middle of the em box sits on the vertical centre.
    let baseline = center_y + (f32::from(face.ascender()) + f32::from(face.descender())) * scale / 2.0;

    let mut pen = GlyphPen {
        builder: PathBuilder::new(),
        scale,
        origin_x: center_x - width / 2.0,
        baseline,
    };
    for glyph in glyphs {
        // Blank glyphs (spaces) have no outline.
        let _ = face.outline_glyph(glyph, &mut pen);
        pen.origin_x += advance(glyph);
    }
    pen.builder.finish()
}

/// Converts ttf-parser outlines (y up, font units) into tiny-skia paths (y down, pixels).
struct GlyphPen {
    builder: PathBuilder,
    scale: f32,
    origin_x: f32,
    baseline: f32,
}

impl GlyphPen {
    fn x(&self, x: f32) -> f32 {
        self.origin_x + x * self.scale
    }

    fn y(&self, y: f32) -> f32 {
        self.baseline - y * self.scale
    }
}

impl OutlineBuilder for GlyphPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(self.x(x), self.y(y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(self.x(x), self.y(y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder
            .quad_to(self.x(x1), self.y(y1), self.x(x), self.y(y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            self.x(x1),
            self.y(y1),
            self.x(x2),
            self.y(y2),
            self.x(x),
            self.y(y),
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

// Cell geometry of the segment face, as fractions of the font size.
const CELL_ADVANCE: f32 = 0.6;
const GLYPH_WIDTH: f32 = 0.42;
const GLYPH_HEIGHT: f32 = 0.7;
const STROKE_WIDTH: f32 = 0.11;

// Segment bits: a=top, b=upper right, c=lower right, d=bottom, e=lower left, f=upper left, g=middle.
const SEG_A: u8 = 1 << 0;
const SEG_B: u8 = 1 << 1;
const SEG_C: u8 = 1 << 2;
const SEG_D: u8 = 1 << 3;
const SEG_E: u8 = 1 << 4;
const SEG_F: u8 = 1 << 5;
const SEG_G: u8 = 1 << 6;

const DIGIT_SEGMENTS: [u8; 10] = [
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,
    SEG_B | SEG_C,
    SEG_A | SEG_B | SEG_G | SEG_E | SEG_D,
    SEG_A | SEG_B | SEG_G | SEG_C | SEG_D,
    SEG_F | SEG_G | SEG_B | SEG_C,
    SEG_A | SEG_F | SEG_G | SEG_C | SEG_D,
    SEG_A | SEG_F | SEG_G | SEG_E | SEG_D | SEG_C,
    SEG_A | SEG_B | SEG_C,
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_F | SEG_G,
];

/// Monospaced stroke face covering digits, `x` and space.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentPainter;

impl SegmentPainter {
    fn add_glyph(builder: &mut PathBuilder, ch: char, cell_x: f32, center_y: f32, font_size: f32) {
        let glyph_width = GLYPH_WIDTH * font_size;
        let glyph_height = GLYPH_HEIGHT * font_size;
        let left = cell_x + (CELL_ADVANCE * font_size - glyph_width) / 2.0;
        let right = left + glyph_width;
        let top = center_y - glyph_height / 2.0;
        let bottom = center_y + glyph_height / 2.0;

        let mut segment = |x0: f32, y0: f32, x1: f32, y1: f32| {
            builder.move_to(x0, y0);
            builder.line_to(x1, y1);
        };

        if ch == 'x' || ch == 'X' {
            let half = glyph_height / 4.0;
            segment(left, center_y - half, right, center_y + half);
            segment(left, center_y + half, right, center_y - half);
            return;
        }

        let Some(mask) = ch.to_digit(10).map(|d| DIGIT_SEGMENTS[d as usize]) else {
            return;
        };
        let lit = |bit: u8| mask & bit != 0;
        if lit(SEG_A) {
            segment(left, top, right, top);
        }
        if lit(SEG_B) {
            segment(right, top, right, center_y);
        }
        if lit(SEG_C) {
            segment(right, center_y, right, bottom);
        }
        if lit(SEG_D) {
            segment(left, bottom, right, bottom);
        }
        if lit(SEG_E) {
            segment(left, center_y, left, bottom);
        }
        if lit(SEG_F) {
            segment(left, top, left, center_y);
        }
        if lit(SEG_G) {
            segment(left, center_y, right, center_y);
        }
    }
}

impl LabelPainter for SegmentPainter {
    fn name(&self) -> &str {
        "segment"
    }

    fn paint(&self, pixmap: &mut Pixmap, text: &str, font_size: f32, paint: &Paint<'_>) {
        let advance = CELL_ADVANCE * font_size;
        let width = advance * text.chars().count() as f32;
        let center_y = pixmap.height() as f32 / 2.0;
        let mut cell_x = pixmap.width() as f32 / 2.0 - width / 2.0;

        let mut builder = PathBuilder::new();
        for ch in text.chars() {
            Self::add_glyph(&mut builder, ch, cell_x, center_y, font_size);
            cell_x += advance;
        }
        let Some(path) = builder.finish() else {
            return;
        };

        let stroke = Stroke {
            width: STROKE_WIDTH * font_size,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, paint, &stroke, Transform::identity(), None);
    }
}
