//! Single-page PDF writer embedding a raster image.
//!
//! The image is stored as the zlib stream of an RGB PNG, which PDF readers
//! decode directly with `/FlateDecode` and PNG predictors.

use crate::raster::{encode_png, to_rgb};
use crate::renderer::{RenderResult, RendererError};
use resvg::tiny_skia::Pixmap;

/// Landscape page size, in points.
pub const PAGE_WIDTH: f64 = 1200.0;
pub const PAGE_HEIGHT: f64 = 800.0;

const MARGIN: f64 = 20.0;
const TITLE_SIZE: f64 = 16.0;
/// Distance from the top edge to the title baseline.
const TITLE_BASELINE: f64 = 30.0;
/// Distance from the top edge to the top of the image area.
const IMAGE_TOP: f64 = 50.0;

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// Concatenated `IDAT` payloads of a PNG stream.
fn idat_stream(png: &[u8]) -> RenderResult<Vec<u8>> {
    let body = png
        .strip_prefix(PNG_SIGNATURE)
        .ok_or_else(|| RendererError::Encode("not a PNG stream".to_string()))?;

    let mut out = Vec::new();
    let mut rest = body;
    while rest.len() >= 12 {
        let len = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
        let kind = &rest[4..8];
        let end = 8 + len + 4;
        if rest.len() < end {
            return Err(RendererError::Encode("truncated PNG chunk".to_string()));
        }
        if kind == b"IDAT" {
            out.extend_from_slice(&rest[8..8 + len]);
        }
        rest = &rest[end..];
    }

    if out.is_empty() {
        return Err(RendererError::Encode("PNG has no image data".to_string()));
    }
    Ok(out)
}

/// Escape a string for a PDF literal.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Fit a `width` x `height` image into the area below the title, keeping its
/// aspect ratio. Returns (x, y, w, h) in PDF user space.
fn image_placement(width: u32, height: u32) -> (f64, f64, f64, f64) {
    let area_w = PAGE_WIDTH - 2.0 * MARGIN;
    let area_h = PAGE_HEIGHT - IMAGE_TOP - MARGIN;
    let scale = (area_w / width as f64).min(area_h / height as f64);
    let (w, h) = (width as f64 * scale, height as f64 * scale);
    let x = MARGIN + (area_w - w) / 2.0;
    let y = PAGE_HEIGHT - IMAGE_TOP - h;
    (x, y, w, h)
}

struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self { buf, offsets: Vec::new() }
    }

    fn push(&mut self, text: &str) {
        self.buf.extend_from_slice(text.as_bytes());
    }

    /// Write object `offsets.len() + 1` with a dictionary body.
    fn object(&mut self, dict: &str) {
        self.offsets.push(self.buf.len());
        let n = self.offsets.len();
        self.push(&format!("{n} 0 obj\n{dict}\nendobj\n"));
    }

    /// Write a stream object; `dict` must not include `/Length`.
    fn stream(&mut self, dict: &str, data: &[u8]) {
        self.offsets.push(self.buf.len());
        let n = self.offsets.len();
        self.push(&format!("{n} 0 obj\n<< {dict} /Length {} >>\nstream\n", data.len()));
        self.buf.extend_from_slice(data);
        self.push("\nendstream\nendobj\n");
    }

    fn finish(mut self, root: usize) -> Vec<u8> {
        let xref = self.buf.len();
        let size = self.offsets.len() + 1;
        self.push(&format!("xref\n0 {size}\n0000000000 65535 f \n"));
        for offset in std::mem::take(&mut self.offsets) {
            self.push(&format!("{offset:010} 00000 n \n"));
        }
        self.push(&format!(
            "trailer\n<< /Size {size} /Root {root} 0 R >>\nstartxref\n{xref}\n%%EOF\n"
        ));
        self.buf
    }
}

/// Write a landscape page titled `title` showing `image`.
pub fn write_pdf(title: &str, image: &Pixmap) -> RenderResult<Vec<u8>> {
    let (width, height) = (image.width(), image.height());
    let png = encode_png(&to_rgb(image), width, height, png::ColorType::Rgb)?;
    let pixels = idat_stream(&png)?;

    let (x, y, w, h) = image_placement(width, height);
    let content = format!(
        "q\n{w:.2} 0 0 {h:.2} {x:.2} {y:.2} cm\n/Im1 Do\nQ\nBT\n/F1 {TITLE_SIZE} Tf\n{MARGIN} {:.2} Td\n({}) Tj\nET\n",
        PAGE_HEIGHT - TITLE_BASELINE,
        escape(title),
    );

    let mut pdf = PdfWriter::new();
    pdf.object("<< /Type /Catalog /Pages 2 0 R >>");
    pdf.object("<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    pdf.object(&format!(
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
         /Resources << /Font << /F1 5 0 R >> /XObject << /Im1 6 0 R >> >> /Contents 4 0 R >>"
    ));
    pdf.stream("", content.as_bytes());
    pdf.object("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>");
    pdf.stream(
        &format!(
            "/Type /XObject /Subtype /Image /Width {width} /Height {height} /ColorSpace /DeviceRGB \
             /BitsPerComponent 8 /Filter /FlateDecode \
             /DecodeParms << /Predictor 15 /Colors 3 /BitsPerComponent 8 /Columns {width} >>"
        ),
        &pixels,
    );

    let bytes = pdf.finish(1);
    log::debug!("Wrote PDF page ({} bytes)", bytes.len());
    Ok(bytes)
}
