//! Chart snapshot as an SVG document.
//!
//! The document is laid out in canvas units with the snapshot bounds as its
//! view box, so rasterizing it at scale `s` gives `s` pixels per canvas unit.

use crate::renderer::ChartStyle;
use kurbo::{Point, Rect};
use ownerchart_core::export::{BoxSnapshot, ChartSnapshot, LineSnapshot};
use ownerchart_core::geometry::LINE_HEIGHT;
use ownerchart_core::model::EntityKind;
use peniko::Color;
use std::fmt::Write;

// Box layout, relative to the box origin
const CORNER_RADIUS: f64 = 8.0;
const BADGE: Rect = Rect::new(12.0, 14.0, 32.0, 34.0);
const TEXT_LEFT: f64 = 40.0;
/// Baseline of the first name line.
const NAME_BASELINE: f64 = 28.0;
/// Baseline of the `ID:` line below the last name line.
const ID_GAP: f64 = 18.0;
const NAME_SIZE: f64 = 12.0;
const ID_SIZE: f64 = 11.0;

// Percentage plates
const LABEL_SIZE: f64 = 12.0;
const LABEL_CHAR_WIDTH: f64 = 7.0;
const LABEL_MIN_WIDTH: f64 = 30.0;
const LABEL_HEIGHT: f64 = 20.0;

fn hex(color: Color) -> String {
    let c = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
}

fn escape_xml(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(c),
        }
    }
    s
}

/// Plate behind a percentage label centered on `anchor`.
pub fn label_plate(anchor: Point, label: &str) -> Rect {
    let width = (label.chars().count() as f64 * LABEL_CHAR_WIDTH + 12.0).max(LABEL_MIN_WIDTH);
    Rect::from_center_size(anchor, (width, LABEL_HEIGHT))
}

/// Render `snapshot` as a standalone SVG document.
pub fn chart_svg(snapshot: &ChartSnapshot, style: &ChartStyle) -> String {
    let b = snapshot.bounds;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w:.2}\" height=\"{h:.2}\" \
         viewBox=\"{:.2} {:.2} {w:.2} {h:.2}\" font-family=\"sans-serif\">",
        b.x0,
        b.y0,
        w = b.width(),
        h = b.height(),
    );
    let _ = writeln!(
        out,
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
        b.x0,
        b.y0,
        b.width(),
        b.height(),
        hex(style.background)
    );

    for line in &snapshot.lines {
        let l = line.line;
        let _ = writeln!(
            out,
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            l.p0.x,
            l.p0.y,
            l.p1.x,
            l.p1.y,
            hex(style.line),
            style.line_width
        );
    }
    for line in &snapshot.lines {
        write_label(&mut out, line, style);
    }
    for entity in &snapshot.boxes {
        write_box(&mut out, entity, style);
    }

    out.push_str("</svg>\n");
    out
}

fn write_label(out: &mut String, line: &LineSnapshot, style: &ChartStyle) {
    let plate = label_plate(line.label_anchor, &line.label);
    let _ = writeln!(
        out,
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"4\" fill=\"{}\" stroke=\"{}\"/>",
        plate.x0,
        plate.y0,
        plate.width(),
        plate.height(),
        hex(style.label_fill),
        hex(style.label_border)
    );
    let _ = writeln!(
        out,
        "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{LABEL_SIZE}\" text-anchor=\"middle\" fill=\"{}\">{}</text>",
        line.label_anchor.x,
        line.label_anchor.y + LABEL_SIZE / 3.0,
        hex(style.label_text),
        escape_xml(&line.label)
    );
}

fn write_box(out: &mut String, entity: &BoxSnapshot, style: &ChartStyle) {
    let r = entity.rect;
    let _ = writeln!(
        out,
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{CORNER_RADIUS}\" fill=\"{}\" stroke=\"{}\"/>",
        r.x0,
        r.y0,
        r.width(),
        r.height(),
        hex(style.box_fill),
        hex(style.box_border)
    );

    let (badge, mark) = match entity.kind {
        EntityKind::Company => (style.company_badge, style.company_mark),
        EntityKind::Person => (style.person_badge, style.person_mark),
    };
    let badge_rect = BADGE + r.origin().to_vec2();
    let _ = writeln!(
        out,
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"4\" fill=\"{}\"/>",
        badge_rect.x0,
        badge_rect.y0,
        badge_rect.width(),
        badge_rect.height(),
        hex(badge)
    );
    let c = badge_rect.center();
    match entity.kind {
        // Building for companies, head for people
        EntityKind::Company => {
            let _ = writeln!(
                out,
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"8\" height=\"10\" fill=\"{}\"/>",
                c.x - 4.0,
                c.y - 5.0,
                hex(mark)
            );
        }
        EntityKind::Person => {
            let _ = writeln!(
                out,
                "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"4.5\" fill=\"{}\"/>",
                c.x,
                c.y,
                hex(mark)
            );
        }
    }

    let x = r.x0 + TEXT_LEFT;
    let baseline = |line: usize| r.y0 + NAME_BASELINE + line as f64 * LINE_HEIGHT;
    for (i, text) in entity.name_lines.iter().enumerate() {
        let y = baseline(i);
        let _ = writeln!(
            out,
            "<text x=\"{x:.2}\" y=\"{y:.2}\" font-size=\"{NAME_SIZE}\" font-weight=\"600\" fill=\"{}\">{}</text>",
            hex(style.name_text),
            escape_xml(text)
        );
    }
    if let Some(id_label) = &entity.id_label {
        let _ = writeln!(
            out,
            "<text x=\"{x:.2}\" y=\"{:.2}\" font-size=\"{ID_SIZE}\" fill=\"{}\">{}</text>",
            baseline(entity.name_lines.len().saturating_sub(1)) + ID_GAP,
            hex(style.id_text),
            escape_xml(id_label)
        );
    }
}
