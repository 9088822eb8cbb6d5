//! SVG rasterization with resvg, and RGB PNG encoding for page embedding.

use crate::renderer::{RenderResult, RendererError};
use resvg::{tiny_skia, usvg};
use std::sync::Arc;

pub use usvg::fontdb;

/// Families tried, in order, for the generic `sans-serif` family.
const SANS_FAMILIES: &[&str] = &[
    "Inter",
    "Helvetica",
    "Arial",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
];

/// Installed system fonts, with `sans-serif` mapped to the first preferred
/// family available (or any installed family).
pub fn system_fonts() -> Arc<fontdb::Database> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    let has_family = |name: &str| db.faces().any(|face| face.families.iter().any(|(family, _)| family == name));
    let family = SANS_FAMILIES
        .iter()
        .find(|name| has_family(name))
        .map(|name| name.to_string())
        .or_else(|| {
            db.faces()
                .next()
                .and_then(|face| face.families.first())
                .map(|(family, _)| family.clone())
        });

    match family {
        Some(family) => {
            log::debug!("Loaded {} font faces, sans-serif is {family}", db.len());
            db.set_sans_serif_family(family);
        }
        None => log::warn!("No system fonts found; exported text will be missing"),
    }
    Arc::new(db)
}

/// Rasterize `svg` into a `width` x `height` pixmap at `scale` pixels per
/// SVG unit.
pub fn rasterize_svg(
    svg: &str,
    fonts: &Arc<fontdb::Database>,
    width: u32,
    height: u32,
    scale: f32,
) -> RenderResult<tiny_skia::Pixmap> {
    let options = usvg::Options {
        fontdb: fonts.clone(),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| RendererError::RenderFailed(format!("failed to parse SVG: {e}")))?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RendererError::InitFailed(format!("cannot allocate {width}x{height} pixmap")))?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Opaque RGB bytes of `pixmap`, row by row.
pub fn to_rgb(pixmap: &tiny_skia::Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue()]
        })
        .collect()
}

/// Encode raw pixel rows as PNG.
pub fn encode_png(data: &[u8], width: u32, height: u32, color: png::ColorType) -> RenderResult<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RendererError::Encode(e.to_string()))?;
        writer
            .write_image_data(data)
            .map_err(|e| RendererError::Encode(e.to_string()))?;
    }
    Ok(out)
}
