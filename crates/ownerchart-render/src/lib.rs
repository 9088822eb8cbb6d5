//! OwnerChart Render Library
//!
//! Export renderers for the ownership chart editor. Snapshots are laid out as
//! SVG, rasterized with resvg and encoded as PNG, or embedded in a landscape
//! PDF page.

pub mod pdf;
pub mod raster;
mod renderer;
pub mod svg;

pub use raster::{encode_png, fontdb, rasterize_svg, system_fonts};
pub use renderer::{ChartStyle, ExportRenderer, MAX_DIMENSION, MAX_PIXELS, RenderResult, RendererError};
