//! Derived geometry of entity boxes and connection lines.
//!
//! Box sizes are estimated from text content. The renderer, the snap engine
//! and the exporter all size boxes through this module so they never disagree.

use crate::model::Entity;
use kurbo::{Line, Point, Rect, Size, Vec2};

/// Estimated advance of one name character.
pub const NAME_CHAR_WIDTH: f64 = 7.0;
/// Estimated advance of one id-number character.
pub const ID_CHAR_WIDTH: f64 = 6.0;
/// Horizontal padding plus the type icon.
pub const WIDTH_PADDING: f64 = 48.0;
/// Narrowest box.
pub const MIN_WIDTH: f64 = 140.0;
/// Widest box.
pub const MAX_WIDTH: f64 = 240.0;
/// Characters per wrapped name line.
pub const NAME_WRAP_CHARS: usize = 32;
/// Height of a box with a single name line.
pub const BASE_HEIGHT: f64 = 68.0;
/// Extra height per additional name line.
pub const LINE_HEIGHT: f64 = 16.0;

/// Width of a box showing `name` and `id_number`.
pub fn width_for(name: &str, id_number: &str) -> f64 {
    let name_width = name.chars().count() as f64 * NAME_CHAR_WIDTH;
    let id_width = id_number.chars().count() as f64 * ID_CHAR_WIDTH;
    (name_width.max(id_width) + WIDTH_PADDING).clamp(MIN_WIDTH, MAX_WIDTH)
}

/// Number of lines `name` occupies.
pub fn name_line_count(name: &str) -> usize {
    let len = name.chars().count();
    if len > NAME_WRAP_CHARS {
        len.div_ceil(NAME_WRAP_CHARS)
    } else {
        1
    }
}

/// Height of a box showing `name`.
pub fn height_for(name: &str) -> f64 {
    BASE_HEIGHT + (name_line_count(name) - 1) as f64 * LINE_HEIGHT
}

/// Rendered width of an entity box.
pub fn estimate_width(entity: &Entity) -> f64 {
    width_for(&entity.name, &entity.id_number)
}

/// Rendered height of an entity box.
pub fn compute_height(entity: &Entity) -> f64 {
    height_for(&entity.name)
}

/// Rendered size of an entity box.
pub fn size_of(entity: &Entity) -> Size {
    Size::new(estimate_width(entity), compute_height(entity))
}

/// Center of an entity box in canvas space.
pub fn center_of(entity: &Entity) -> Point {
    center_at(entity, entity.position)
}

/// Center the box would have if its top-left corner were at `position`.
pub fn center_at(entity: &Entity, position: Point) -> Point {
    let size = size_of(entity);
    position + Vec2::new(size.width / 2.0, size.height / 2.0)
}

/// Bounding rectangle of an entity box in canvas space.
pub fn bounds(entity: &Entity) -> Rect {
    Rect::from_origin_size(entity.position, size_of(entity))
}

/// Break a name into exactly [`name_line_count`] display lines of at most
/// [`NAME_WRAP_CHARS`] characters, so the text always fits the box height.
///
/// Lines break at spaces. A single word longer than the limit is cut and
/// marked with a trailing `-`, and its remainder continues on the next line.
/// When word breaks would give a different line count, the name is cut into
/// fixed-size chunks instead.
pub fn wrap_name(name: &str) -> Vec<String> {
    let expected = name_line_count(name);
    if expected == 1 {
        return vec![name.to_string()];
    }

    let lines = wrap_at_spaces(name);
    if lines.len() == expected {
        return lines;
    }

    let chars: Vec<char> = name.chars().collect();
    chars
        .chunks(NAME_WRAP_CHARS)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn wrap_at_spaces(name: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in name.split(' ') {
        let mut word = word.to_string();
        loop {
            let current_len = current.chars().count();
            let word_len = word.chars().count();
            let joined_len = if current.is_empty() {
                word_len
            } else {
                current_len + 1 + word_len
            };

            if joined_len <= NAME_WRAP_CHARS {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(&word);
                break;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                continue;
            }

            // Word alone exceeds the limit
            let head: String = word.chars().take(NAME_WRAP_CHARS).collect();
            let tail: String = word.chars().skip(NAME_WRAP_CHARS).collect();
            lines.push(format!("{head}-"));
            if tail.is_empty() {
                break;
            }
            word = tail;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Geometry of a connection line between two entity boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionGeometry {
    /// Center of the owning box to center of the owned box.
    pub line: Line,
    /// Anchor of the percentage label.
    pub label_anchor: Point,
}

/// Line between the centers of `from` and `to`.
pub fn connection_geometry(from: &Entity, to: &Entity) -> ConnectionGeometry {
    let line = Line::new(center_of(from), center_of(to));
    ConnectionGeometry {
        line,
        label_anchor: line.p0.midpoint(line.p1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;

    fn entity(name: &str, id_number: &str) -> Entity {
        Entity::new("e", name, id_number, EntityKind::Company, Point::new(10.0, 20.0))
    }

    #[test]
    fn test_width_clamped_to_min() {
        assert_eq!(estimate_width(&entity("", "")), MIN_WIDTH);
        assert_eq!(estimate_width(&entity("Acme", "")), MIN_WIDTH);
    }

    #[test]
    fn test_width_from_name() {
        // 20 * 7 + 48
        assert_eq!(estimate_width(&entity(&"a".repeat(20), "")), 188.0);
    }

    #[test]
    fn test_width_from_id_number() {
        // 25 * 6 + 48 beats 10 * 7 + 48
        assert_eq!(estimate_width(&entity(&"a".repeat(10), &"1".repeat(25))), 198.0);
    }

    #[test]
    fn test_width_clamped_to_max() {
        assert_eq!(estimate_width(&entity(&"a".repeat(500), &"1".repeat(500))), MAX_WIDTH);
    }

    #[test]
    fn test_height_steps() {
        assert_eq!(compute_height(&entity("", "")), 68.0);
        assert_eq!(compute_height(&entity(&"a".repeat(32), "")), 68.0);
        assert_eq!(compute_height(&entity(&"a".repeat(33), "")), 84.0);
        assert_eq!(compute_height(&entity(&"a".repeat(64), "")), 84.0);
        assert_eq!(compute_height(&entity(&"a".repeat(65), "")), 100.0);
    }

    #[test]
    fn test_center_of() {
        let e = entity("Acme", "");
        assert_eq!(center_of(&e), Point::new(10.0 + 70.0, 20.0 + 34.0));
        assert_eq!(bounds(&e), Rect::new(10.0, 20.0, 150.0, 88.0));
    }

    #[test]
    fn test_wrap_short_name() {
        assert_eq!(wrap_name("Acme Corporation"), vec!["Acme Corporation"]);
    }

    #[test]
    fn test_wrap_at_spaces() {
        let name = "International Widget Manufacturing Holdings Limited";
        let lines = wrap_name(name);
        assert_eq!(lines, vec!["International Widget", "Manufacturing Holdings Limited"]);
        assert!(lines.iter().all(|l| l.chars().count() <= NAME_WRAP_CHARS));
    }

    #[test]
    fn test_wrap_falls_back_to_chunks() {
        // Ten 16-character words break into ten lines at spaces, but the box
        // only has room for six.
        let name = vec!["abcdefghijklmnop"; 10].join(" ");
        let lines = wrap_name(&name);
        assert_eq!(lines.len(), name_line_count(&name));
        assert_eq!(lines.len(), 6);
        assert_eq!(lines.concat(), name);
        assert!(lines.iter().all(|l| l.chars().count() <= NAME_WRAP_CHARS));
    }

    #[test]
    fn test_wrap_long_word() {
        let word = "x".repeat(40);
        let lines = wrap_name(&format!("{word} Ltd"));
        assert_eq!(lines[0], format!("{}-", "x".repeat(32)));
        assert_eq!(lines[1], format!("{} Ltd", "x".repeat(8)));
    }

    #[test]
    fn test_connection_geometry_uses_centers() {
        let a = Entity::new("a", "A", "", EntityKind::Company, Point::new(0.0, 0.0));
        let b = Entity::new("b", "B", "", EntityKind::Company, Point::new(200.0, 200.0));
        let geom = connection_geometry(&a, &b);
        assert_eq!(geom.line.p0, Point::new(70.0, 34.0));
        assert_eq!(geom.line.p1, Point::new(270.0, 234.0));
        assert_eq!(geom.label_anchor, Point::new(170.0, 134.0));
    }
}
