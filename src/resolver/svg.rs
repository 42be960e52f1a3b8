//! SVG measurement.
//!
//! Declared `width`/`height` on the root element win when both are plain
//! integers (an optional `px` suffix is allowed). Anything else (units,
//! percentages, missing attributes) means the document is rasterized and its
//! intrinsic canvas size is measured instead.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use resvg::{tiny_skia, usvg};

use super::{Measured, ResolveError, SizeSource};

/// Largest pixmap that will be allocated (4096 x 4096).
const MAX_RASTER_PIXELS: u64 = 4096 * 4096;

pub const SVG_MIME: &str = "image/svg+xml";
const PNG_MIME: &str = "image/png";

/// Measure an SVG document.
///
/// The payload is the SVG markup itself when the declared size is used, and
/// the rendered PNG when the document had to be rasterized.
pub fn measure(svg: Vec<u8>) -> Result<Measured, ResolveError> {
    if let Some((width, height)) = declared_size(&svg)? {
        return Ok(Measured {
            width,
            height,
            payload: svg,
            mime_type: SVG_MIME.to_string(),
            size_source: SizeSource::DeclaredSvg,
        });
    }

    let rendered = rasterize(&svg)?;
    Ok(Measured {
        width: rendered.width,
        height: rendered.height,
        payload: rendered.png,
        mime_type: PNG_MIME.to_string(),
        size_source: SizeSource::RasterizedSvg,
    })
}

/// Integer `width` and `height` declared on the root element.
///
/// Reads the whole document so that malformed XML is rejected even when the
/// root element itself is fine.
pub fn declared_size(svg: &[u8]) -> Result<Option<(u32, u32)>, ResolveError> {
    let mut reader = Reader::from_reader(svg);
    let mut buf = Vec::new();
    let mut root: Option<(Option<String>, Option<String>)> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if root.is_none() => {
                let mut width = None;
                let mut height = None;
                for attr in e.attributes().flatten() {
                    let Ok(key) = reader.decoder().decode(attr.key.as_ref()) else {
                        continue;
                    };
                    let Ok(value) = reader.decoder().decode(&attr.value) else {
                        continue;
                    };
                    match &*key {
                        "width" => width = Some(value.into_owned()),
                        "height" => height = Some(value.into_owned()),
                        _ => {}
                    }
                }
                root = Some((width, height));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ResolveError::Svg(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let Some((width, height)) = root else {
        return Err(ResolveError::Svg("document has no root element".to_string()));
    };
    let width = width.as_deref().and_then(parse_dimension);
    let height = height.as_deref().and_then(parse_dimension);
    Ok(width.zip(height))
}

/// `"120"` and `"120px"` parse; `"12.5"`, `"10em"`, `"100%"` and `""` do not.
fn parse_dimension(value: &str) -> Option<u32> {
    let digits = value.replace("px", "");
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// A rendered SVG.
///
/// `width` and `height` are the intrinsic canvas size, even when `png` was
/// rendered at a smaller scale.
#[derive(Debug, Clone)]
pub struct Rasterized {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Render an SVG to PNG.
///
/// Canvases above 4096 x 4096 pixels are rendered downscaled, keeping the
/// aspect ratio.
pub fn rasterize(svg: &[u8]) -> Result<Rasterized, ResolveError> {
    let tree = usvg::Tree::from_data(svg, &usvg::Options::default())
        .map_err(|e| ResolveError::Svg(e.to_string()))?;

    let size = tree.size().to_int_size();
    let (width, height) = (size.width(), size.height());
    let scale = render_scale(width, height);
    let (render_width, render_height) = scaled(width, height, scale);

    let mut pixmap = tiny_skia::Pixmap::new(render_width, render_height).ok_or_else(|| {
        ResolveError::Svg(format!(
            "cannot allocate a {render_width}x{render_height} canvas"
        ))
    })?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    let png = pixmap
        .encode_png()
        .map_err(|e| ResolveError::Svg(e.to_string()))?;

    Ok(Rasterized { png, width, height })
}

/// `1.0`, or the factor that brings `width * height` under the pixel limit.
fn render_scale(width: u32, height: u32) -> f32 {
    let area = u64::from(width) * u64::from(height);
    if area <= MAX_RASTER_PIXELS {
        1.0
    } else {
        (MAX_RASTER_PIXELS as f64 / area as f64).sqrt() as f32
    }
}

#[allow(clippy::cast_sign_loss)]
fn scaled(width: u32, height: u32, scale: f32) -> (u32, u32) {
    if scale >= 1.0 {
        return (width, height);
    }
    let shrink = |side: u32| ((side as f32 * scale).floor() as u32).max(1);
    (shrink(width), shrink(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_accept_plain_and_px_integers() {
        assert_eq!(parse_dimension("120"), Some(120));
        assert_eq!(parse_dimension("120px"), Some(120));
        assert_eq!(parse_dimension("0"), Some(0));
    }

    #[test]
    fn dimensions_reject_units_and_fractions() {
        assert_eq!(parse_dimension("12.5"), None);
        assert_eq!(parse_dimension("10em"), None);
        assert_eq!(parse_dimension("100%"), None);
        assert_eq!(parse_dimension(""), None);
        assert_eq!(parse_dimension("px"), None);
        assert_eq!(parse_dimension(" 10"), None);
    }

    #[test]
    fn declared_size_reads_root_attributes() {
        let svg = br#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" width="64px" height="32"><rect width="1" height="1"/></svg>"#;
        assert_eq!(declared_size(svg).unwrap(), Some((64, 32)));
    }

    #[test]
    fn declared_size_ignores_nested_elements() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="5" height="5"/></svg>"#;
        assert_eq!(declared_size(svg).unwrap(), None);
    }

    #[test]
    fn declared_size_needs_both_dimensions() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="64"></svg>"#;
        assert_eq!(declared_size(svg).unwrap(), None);
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let svg = br#"<svg width="10" height="10"><g></svg>"#;
        assert!(declared_size(svg).is_err());
        assert!(declared_size(b"").is_err());
    }

    #[test]
    fn declared_measurement_keeps_markup() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"></svg>"#.to_vec();
        let measured = measure(svg.clone()).unwrap();
        assert_eq!((measured.width, measured.height), (40, 20));
        assert_eq!(measured.size_source, SizeSource::DeclaredSvg);
        assert_eq!(measured.mime_type, SVG_MIME);
        assert_eq!(measured.payload, svg);
    }

    #[test]
    fn view_box_only_is_rasterized() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 30 40"><rect width="30" height="40" fill="red"/></svg>"#.to_vec();
        let measured = measure(svg).unwrap();
        assert_eq!((measured.width, measured.height), (30, 40));
        assert_eq!(measured.size_source, SizeSource::RasterizedSvg);
        assert_eq!(measured.mime_type, "image/png");
        assert!(measured.payload.starts_with(b"\x89PNG"));
    }

    #[test]
    fn small_canvas_is_not_scaled() {
        assert_eq!(render_scale(4096, 4096), 1.0);
        assert_eq!(scaled(300, 200, 1.0), (300, 200));
    }

    #[test]
    fn large_canvas_scale_stays_under_the_limit() {
        let scale = render_scale(6000, 4000);
        assert!(scale < 1.0);
        let (w, h) = scaled(6000, 4000, scale);
        assert!(u64::from(w) * u64::from(h) <= MAX_RASTER_PIXELS);
        assert!(w > h);
        assert_eq!(scaled(100_000_000, 1, render_scale(100_000_000, 1)).1, 1);
    }

    #[test]
    fn large_canvas_reports_intrinsic_size() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 6000 4000"><rect width="6000" height="4000" fill="blue"/></svg>"#.to_vec();
        let measured = measure(svg).unwrap();
        assert_eq!((measured.width, measured.height), (6000, 4000));
        assert_eq!(measured.size_source, SizeSource::RasterizedSvg);
        assert!(measured.payload.starts_with(b"\x89PNG"));
    }
}
