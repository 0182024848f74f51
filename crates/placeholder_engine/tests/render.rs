use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use placeholder_engine::{
    render_placeholder, ImagePlaceholderRenderer, PlaceholderStyle, RenderError, Renderer,
    Rgb, SegmentPainter,
};
use pretty_assertions::assert_eq;

fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([220, 30, 30, 255]));
    let mut out = Cursor::new(Vec::new());
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
        _ => DynamicImage::ImageRgba8(img),
    };
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

fn decode(png: &[u8]) -> RgbaImage {
    image::load_from_memory_with_format(png, ImageFormat::Png)
        .unwrap()
        .to_rgba8()
}

#[test]
fn placeholder_keeps_source_dimensions() {
    let style = PlaceholderStyle::default();
    for (width, height) in [(1, 1), (50, 50), (400, 200), (1000, 500), (37, 1013)] {
        let source = encoded(width, height, ImageFormat::Png);
        let rendered = render_placeholder(&source, &style, &SegmentPainter).unwrap();

        assert_eq!((rendered.width, rendered.height), (width, height));
        let decoded = decode(&rendered.png);
        assert_eq!(decoded.dimensions(), (width, height));
    }
}

#[test]
fn placeholder_is_background_with_centred_label() {
    let style = PlaceholderStyle::default();
    let source = encoded(400, 200, ImageFormat::Png);
    let rendered = render_placeholder(&source, &style, &SegmentPainter).unwrap();
    let decoded = decode(&rendered.png);

    let background = Rgba([0xbc, 0xbc, 0xbc, 0xff]);
    assert_eq!(*decoded.get_pixel(0, 0), background);
    assert_eq!(*decoded.get_pixel(399, 199), background);
    assert_eq!(*decoded.get_pixel(399, 0), background);
    // The "x" of "400 x 200" crosses the exact centre.
    assert_eq!(*decoded.get_pixel(200, 100), Rgba([0, 0, 0, 0xff]));
}

#[test]
fn no_source_pixels_survive() {
    let style = PlaceholderStyle::default();
    let source = encoded(120, 80, ImageFormat::Png);
    let rendered = render_placeholder(&source, &style, &SegmentPainter).unwrap();
    let decoded = decode(&rendered.png);

    assert!(decoded.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
}

#[test]
fn custom_colours_are_applied() {
    let style = PlaceholderStyle {
        background: Rgb(10, 20, 30),
        foreground: Rgb(250, 240, 230),
        ..PlaceholderStyle::default()
    };
    let source = encoded(400, 200, ImageFormat::Png);
    let rendered = render_placeholder(&source, &style, &SegmentPainter).unwrap();
    let decoded = decode(&rendered.png);

    assert_eq!(*decoded.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
    assert_eq!(*decoded.get_pixel(200, 100), Rgba([250, 240, 230, 255]));
}

#[test]
fn jpeg_sources_are_supported() {
    let source = encoded(64, 48, ImageFormat::Jpeg);
    let rendered =
        render_placeholder(&source, &PlaceholderStyle::default(), &SegmentPainter).unwrap();
    assert_eq!(decode(&rendered.png).dimensions(), (64, 48));
}

#[test]
fn undecodable_source_is_a_decode_error() {
    let result = render_placeholder(
        b"definitely not an image",
        &PlaceholderStyle::default(),
        &SegmentPainter,
    );
    assert!(matches!(result, Err(RenderError::Decode(_))));

    let mut truncated = encoded(32, 32, ImageFormat::Png);
    truncated.truncate(20);
    let result = render_placeholder(&truncated, &PlaceholderStyle::default(), &SegmentPainter);
    assert!(matches!(result, Err(RenderError::Decode(_))));
}

#[tokio::test]
async fn async_renderer_matches_direct_rendering() {
    let renderer =
        ImagePlaceholderRenderer::new(PlaceholderStyle::default(), Arc::new(SegmentPainter));
    let source: Arc<[u8]> = Arc::from(encoded(90, 30, ImageFormat::Png));

    let rendered = renderer.render(Arc::clone(&source)).await.unwrap();
    let direct =
        render_placeholder(&source, renderer.style(), &SegmentPainter).unwrap();

    assert_eq!((rendered.width, rendered.height), (90, 30));
    assert_eq!(decode(&rendered.png), decode(&direct.png));

    let failure = renderer.render(Arc::from(vec![0u8; 16])).await;
    assert!(matches!(failure, Err(RenderError::Decode(_))));
}
