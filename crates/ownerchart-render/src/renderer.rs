//! Snapshot renderer for PNG and PDF exports.

use crate::pdf;
use crate::raster::{fontdb, rasterize_svg, system_fonts};
use crate::svg::chart_svg;
use kurbo::Rect;
use ownerchart_core::export::{ChartSnapshot, EXPORT_TITLE, ExportError, ExportFormat, SnapshotRenderer};
use peniko::Color;
use resvg::tiny_skia::Pixmap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

impl From<RendererError> for ExportError {
    fn from(e: RendererError) -> Self {
        ExportError::Render(e.to_string())
    }
}

/// Largest raster edge, in pixels.
pub const MAX_DIMENSION: u32 = 16_384;

/// Largest raster area, in pixels. Wider charts are exported at a lower scale.
pub const MAX_PIXELS: u64 = 32 * 1024 * 1024;

/// Colors and stroke widths used in exports.
#[derive(Debug, Clone, Copy)]
pub struct ChartStyle {
    pub background: Color,
    pub box_fill: Color,
    pub box_border: Color,
    pub name_text: Color,
    pub id_text: Color,
    pub company_badge: Color,
    pub company_mark: Color,
    pub person_badge: Color,
    pub person_mark: Color,
    pub line: Color,
    pub line_width: f64,
    pub label_fill: Color,
    pub label_border: Color,
    pub label_text: Color,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            box_fill: Color::WHITE,
            box_border: Color::from_rgb8(229, 231, 235),
            name_text: Color::from_rgb8(17, 24, 39),
            id_text: Color::from_rgb8(107, 114, 128),
            company_badge: Color::from_rgb8(219, 234, 254),
            company_mark: Color::from_rgb8(37, 99, 235),
            person_badge: Color::from_rgb8(220, 252, 231),
            person_mark: Color::from_rgb8(22, 163, 74),
            line: Color::from_rgb8(107, 114, 128),
            line_width: 2.0,
            label_fill: Color::WHITE,
            label_border: Color::from_rgb8(209, 213, 219),
            label_text: Color::from_rgb8(55, 65, 81),
        }
    }
}

/// Renders snapshots through an SVG scene rasterized by resvg.
#[derive(Clone)]
pub struct ExportRenderer {
    /// Device pixels per canvas unit.
    scale: f64,
    style: ChartStyle,
    fonts: Arc<fontdb::Database>,
}

impl fmt::Debug for ExportRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportRenderer")
            .field("scale", &self.scale)
            .field("style", &self.style)
            .field("font_faces", &self.fonts.len())
            .finish()
    }
}

impl Default for ExportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportRenderer {
    /// Renderer at 2x using the installed system fonts.
    pub fn new() -> Self {
        Self::with_fonts(system_fonts())
    }

    pub fn with_fonts(fonts: Arc<fontdb::Database>) -> Self {
        Self {
            scale: 2.0,
            style: ChartStyle::default(),
            fonts,
        }
    }

    /// Set the device pixels per canvas unit (at least 1).
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = if scale.is_finite() { scale.max(1.0) } else { 1.0 };
        self
    }

    pub fn with_style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn font_faces(&self) -> usize {
        self.fonts.len()
    }

    /// Scale actually used for `bounds`: the configured scale, lowered until
    /// the raster fits [`MAX_DIMENSION`] and [`MAX_PIXELS`].
    pub fn scale_for(&self, bounds: Rect) -> f64 {
        let (w, h) = (bounds.width(), bounds.height());
        let by_edge = MAX_DIMENSION as f64 / w.max(h);
        let by_area = (MAX_PIXELS as f64 / (w * h)).sqrt();
        self.scale.min(by_edge).min(by_area)
    }

    /// Rasterize `snapshot`.
    pub fn rasterize(&self, snapshot: &ChartSnapshot) -> RenderResult<Pixmap> {
        let bounds = snapshot.bounds;
        if !(bounds.width() > 0.0 && bounds.height() > 0.0) {
            return Err(RendererError::RenderFailed("empty bounds".to_string()));
        }

        let scale = self.scale_for(bounds);
        if scale < self.scale {
            log::info!("Chart is large; exporting at {scale:.3}x instead of {}x", self.scale);
        }
        let width = (bounds.width() * scale).floor().max(1.0) as u32;
        let height = (bounds.height() * scale).floor().max(1.0) as u32;

        let svg = chart_svg(snapshot, &self.style);
        let pixmap = rasterize_svg(&svg, &self.fonts, width, height, scale as f32)?;
        log::debug!(
            "Rasterized {} boxes and {} lines at {width}x{height}",
            snapshot.boxes.len(),
            snapshot.lines.len(),
        );
        Ok(pixmap)
    }

    /// Render `snapshot` to PNG bytes.
    pub fn render_png(&self, snapshot: &ChartSnapshot) -> RenderResult<Vec<u8>> {
        self.rasterize(snapshot)?
            .encode_png()
            .map_err(|e| RendererError::Encode(e.to_string()))
    }

    /// Render `snapshot` to a one-page PDF.
    pub fn render_pdf(&self, snapshot: &ChartSnapshot) -> RenderResult<Vec<u8>> {
        let pixmap = self.rasterize(snapshot)?;
        pdf::write_pdf(EXPORT_TITLE, &pixmap)
    }
}

impl SnapshotRenderer for ExportRenderer {
    fn render(&self, snapshot: &ChartSnapshot, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        let bytes = match format {
            ExportFormat::Png => self.render_png(snapshot)?,
            ExportFormat::Pdf => self.render_pdf(snapshot)?,
        };
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use ownerchart_core::export::SNAPSHOT_PADDING;
    use ownerchart_core::model::{ChartData, Entity, EntityKind};
    use ownerchart_core::sample::sample_chart;
    use std::sync::OnceLock;

    /// System fonts are scanned once for the whole test binary.
    fn fonts() -> Arc<fontdb::Database> {
        static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
        FONTS.get_or_init(system_fonts).clone()
    }

    fn renderer() -> ExportRenderer {
        ExportRenderer::with_fonts(fonts())
    }

    fn snapshot_of(entities: Vec<Entity>) -> ChartSnapshot {
        let mut data = ChartData::new();
        data.entities = entities;
        ChartSnapshot::capture(&data).unwrap()
    }

    fn rgb(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 3] {
        let c = pixmap.pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue()]
    }

    fn rgb_of(color: Color) -> [u8; 3] {
        let c = color.to_rgba8();
        [c.r, c.g, c.b]
    }

    fn decode_png(bytes: &[u8]) -> (u32, u32, Vec<u8>) {
        let decoder = png::Decoder::new(bytes);
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        (info.width, info.height, buf)
    }

    #[test]
    fn test_raster_size_follows_bounds() {
        let snapshot = ChartSnapshot::capture(&sample_chart()).unwrap();
        let pixmap = renderer().with_scale(1.0).rasterize(&snapshot).unwrap();
        assert_eq!(pixmap.width(), snapshot.bounds.width().floor() as u32);
        assert_eq!(pixmap.height(), snapshot.bounds.height().floor() as u32);

        let doubled = renderer().rasterize(&snapshot).unwrap();
        assert_eq!(doubled.width(), (snapshot.bounds.width() * 2.0).floor() as u32);
    }

    #[test]
    fn test_box_fill_and_badge_drawn() {
        let style = ChartStyle {
            background: Color::from_rgb8(250, 250, 250),
            ..ChartStyle::default()
        };
        let person = Entity::new("p", "Jo", "", EntityKind::Person, Point::new(100.0, 100.0));
        let snapshot = snapshot_of(vec![person]);
        let pixmap = renderer().with_scale(1.0).with_style(style).rasterize(&snapshot).unwrap();

        // Box origin lands at the padding offset; the badge mark is centered
        // at (22, 24) inside the box
        let pad = SNAPSHOT_PADDING as u32;
        assert_eq!(rgb(&pixmap, pad + 22, pad + 24), rgb_of(style.person_mark));
        assert_eq!(rgb(&pixmap, pad + 110, pad + 60), rgb_of(style.box_fill));
        assert_eq!(rgb(&pixmap, 2, 2), rgb_of(style.background));
    }

    #[test]
    fn test_names_render_as_distinct_text() {
        let renderer = renderer().with_scale(1.0);
        if renderer.font_faces() == 0 {
            return;
        }
        let render = |name: &str| {
            let entity = Entity::new("1", name, "", EntityKind::Company, Point::ZERO);
            renderer.rasterize(&snapshot_of(vec![entity])).unwrap()
        };
        assert_ne!(render("Müller").data(), render("Mäller").data());
        assert_ne!(render("acme").data(), render("ACME").data());
    }

    #[test]
    fn test_render_png_decodes() {
        let renderer = renderer().with_scale(1.0);
        let snapshot = ChartSnapshot::capture(&sample_chart()).unwrap();
        let bytes = renderer.render(&snapshot, ExportFormat::Png).unwrap();
        let (width, height, data) = decode_png(&bytes);
        let pixmap = renderer.rasterize(&snapshot).unwrap();
        assert_eq!((width, height), (pixmap.width(), pixmap.height()));
        assert_eq!(data, pixmap.data());
    }

    #[test]
    fn test_render_pdf() {
        let snapshot = ChartSnapshot::capture(&sample_chart()).unwrap();
        let bytes = renderer().render(&snapshot, ExportFormat::Pdf).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("(Ownership Hierarchy Diagram) Tj"));
    }

    #[test]
    fn test_spread_out_chart_stays_within_pixel_budget() {
        let snapshot = snapshot_of(vec![
            Entity::new("a", "A", "", EntityKind::Company, Point::ZERO),
            Entity::new("b", "B", "", EntityKind::Company, Point::new(8000.0, 8000.0)),
        ]);
        let renderer = renderer();
        let scale = renderer.scale_for(snapshot.bounds);
        assert!(scale < 1.0, "{scale}");

        let pixmap = renderer.rasterize(&snapshot).unwrap();
        assert!(pixmap.width() as u64 * pixmap.height() as u64 <= MAX_PIXELS);
        assert!(pixmap.width() <= MAX_DIMENSION && pixmap.height() <= MAX_DIMENSION);
    }

    #[test]
    fn test_long_thin_chart_capped_by_edge() {
        let snapshot = snapshot_of(vec![
            Entity::new("a", "A", "", EntityKind::Company, Point::ZERO),
            Entity::new("b", "B", "", EntityKind::Company, Point::new(1e6, 0.0)),
        ]);
        let pixmap = renderer().rasterize(&snapshot).unwrap();
        assert!(pixmap.width() <= MAX_DIMENSION);
        assert!(pixmap.height() >= 1);
    }

    #[test]
    fn test_small_chart_keeps_configured_scale() {
        let snapshot = ChartSnapshot::capture(&sample_chart()).unwrap();
        assert_eq!(renderer().scale_for(snapshot.bounds), 2.0);
    }

    #[test]
    fn test_scale_floor() {
        assert_eq!(renderer().with_scale(0.25).scale(), 1.0);
        assert_eq!(renderer().with_scale(f64::NAN).scale(), 1.0);
    }
}
