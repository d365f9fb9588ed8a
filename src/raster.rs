use std::path::Path;

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use crate::error::{LadderError, Result};

/// Directory probed for bundled fonts next to the working directory.
const LOCAL_FONT_DIR: &str = "fonts";

/// Loads system faces and [`LOCAL_FONT_DIR`] into a `fontdb::Database`, then binds the
/// generic sans and serif families to installed faces. resvg and svg2pdf link different
/// `fontdb` versions, so the same steps are expanded once per database type.
macro_rules! load_chart_fonts {
    ($fontdb:expr) => {{
        let fontdb = $fontdb;
        fontdb.load_system_fonts();
        let local = Path::new(LOCAL_FONT_DIR);
        if local.is_dir() {
            fontdb.load_fonts_dir(local);
        }

        let families: Vec<String> = fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
            .collect();
        let sans = families
            .iter()
            .find(|name| name.to_ascii_lowercase().contains("sans"));
        let serif = families.iter().find(|name| {
            let lower = name.to_ascii_lowercase();
            lower.contains("serif") && !lower.contains("sans")
        });

        if let Some(family) = sans.or(families.first()) {
            fontdb.set_sans_serif_family(family.clone());
        }
        if let Some(family) = serif.or(families.first()) {
            fontdb.set_serif_family(family.clone());
        }
        log::debug!("loaded {} font faces", fontdb.len());
    }};
}

fn render_error<E: std::fmt::Display>(stage: &'static str) -> impl Fn(E) -> LadderError {
    move |e| LadderError::Render(format!("{}: {}", stage, e))
}

/// Rasterizes `svg` at `scale` device pixels per chart pixel.
///
/// A non-positive or non-finite scale and any resvg or PNG encoder failure come back as
/// [`LadderError::Render`] carrying the failing stage.
pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(LadderError::Render(format!("invalid PNG scale {}", scale)));
    }

    let mut opts = usvg::Options::default();
    load_chart_fonts!(opts.fontdb_mut());
    let tree = usvg::Tree::from_str(svg, &opts).map_err(render_error("parse chart SVG"))?;

    let width = (tree.size().width() * scale).ceil() as u32;
    let height = (tree.size().height() * scale).ceil() as u32;
    log::debug!("rasterizing chart at {}x{}", width, height);

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        LadderError::Render(format!("allocate {}x{} pixmap", width, height))
    })?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());
    pixmap.encode_png().map_err(render_error("encode PNG"))
}

/// Converts `svg` to a single-page PDF with labels outlined as paths.
///
/// Parse and conversion failures come back as [`LadderError::Render`].
pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut fontdb = svg2pdf::usvg::fontdb::Database::new();
    load_chart_fonts!(&mut fontdb);

    let mut opts = svg2pdf::usvg::Options::default();
    opts.fontdb = std::sync::Arc::new(fontdb);
    let tree =
        svg2pdf::usvg::Tree::from_str(svg, &opts).map_err(render_error("parse chart SVG"))?;

    let mut options = svg2pdf::ConversionOptions::default();
    options.embed_text = false;
    svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default())
        .map_err(render_error("convert chart to PDF"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LadderState;
    use crate::render::ChartRenderer;

    #[test]
    fn rejects_non_positive_scale() {
        assert!(matches!(svg_to_png("<svg/>", 0.0), Err(LadderError::Render(_))));
        assert!(svg_to_png("<svg/>", f32::NAN).is_err());
    }

    #[test]
    fn unparsable_markup_is_a_render_error() {
        match svg_to_png("<svg", 1.0) {
            Err(LadderError::Render(message)) => assert!(message.starts_with("parse chart SVG")),
            other => panic!("expected a render error, got {:?}", other.map(|png| png.len())),
        }
        assert!(matches!(svg_to_pdf("not svg"), Err(LadderError::Render(_))));
    }

    #[test]
    fn png_has_scaled_dimensions() {
        let svg = ChartRenderer::default().render(&LadderState::default());
        let png = svg_to_png(&svg, 2.0).unwrap();

        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        assert_eq!((width, height), (800, 800));
    }

    #[test]
    fn pdf_output_has_header() {
        let svg = ChartRenderer::default().render(&LadderState::default());
        let pdf = svg_to_pdf(&svg).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }
}
