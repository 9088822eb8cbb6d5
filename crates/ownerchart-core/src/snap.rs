//! Snap functionality for aligning dragged entities to the grid and to
//! entity pairs.

use crate::geometry::{center_at, center_of, size_of};
use crate::model::Entity;
use kurbo::{Line, Point, Vec2};

/// Spacing of the alignment grid, in chart units.
pub const GRID_SIZE: f64 = 120.0;

/// Distance within which a snap target captures the dragged entity (in
/// canvas units).
pub const SNAP_THRESHOLD: f64 = 20.0;

/// Half-length of a grid guide drawn around the snapped entity.
pub const GUIDE_EXTENT: f64 = 240.0;

/// Snap mode for dragged entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapMode {
    /// Positions follow the pointer exactly.
    Off,
    /// Grid and V-shape snapping.
    #[default]
    On,
}

impl SnapMode {
    /// Mode matching the persisted "snap to alignment" preference.
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled { SnapMode::On } else { SnapMode::Off }
    }

    /// False only for `Off`.
    pub fn is_enabled(self) -> bool {
        self == SnapMode::On
    }

    /// Switch to the other mode.
    pub fn toggle(self) -> Self {
        match self {
            SnapMode::Off => SnapMode::On,
            SnapMode::On => SnapMode::Off,
        }
    }
}

/// Tunable snap distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapConfig {
    /// Spacing of grid lines.
    pub grid_size: f64,
    /// Capture distance per axis.
    pub threshold: f64,
    /// Half-length of emitted grid guides.
    pub guide_extent: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            threshold: SNAP_THRESHOLD,
            guide_extent: GUIDE_EXTENT,
        }
    }
}

/// Guide segments to draw while a snap is active.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapGuides {
    /// Guides of constant y.
    pub horizontal: Vec<Line>,
    /// Guides of constant x.
    pub vertical: Vec<Line>,
}

impl SnapGuides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.horizontal.is_empty() && self.vertical.is_empty()
    }

    pub fn clear(&mut self) {
        self.horizontal.clear();
        self.vertical.clear();
    }
}

/// Which rule produced a snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapKind {
    /// Aligned to grid lines.
    Grid,
    /// Placed below the midpoint of two same-row entities.
    VShape,
}

/// Where a dragged box ends up, and which axes were pulled.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    /// Top-left position to apply to the dragged entity.
    pub position: Point,
    /// Guides to render.
    pub guides: SnapGuides,
    pub snapped_x: bool,
    pub snapped_y: bool,
    /// The rule that fired, if any.
    pub kind: Option<SnapKind>,
}

impl SnapResult {
    /// `point` unchanged.
    pub fn none(position: Point) -> Self {
        Self {
            position,
            guides: SnapGuides::default(),
            snapped_x: false,
            snapped_y: false,
            kind: None,
        }
    }

    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Snap target below a pair of entities sharing a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VShapeTarget {
    /// Centers of the two entities of the pair.
    pub left: Point,
    pub right: Point,
    /// Point the dragged entity's center snaps to.
    pub point: Point,
}

impl VShapeTarget {
    /// Average center y of the pair.
    pub fn row_y(&self) -> f64 {
        (self.left.y + self.right.y) / 2.0
    }

    fn guides(&self) -> SnapGuides {
        let row_y = self.row_y();
        SnapGuides {
            horizontal: vec![Line::new((self.left.x, row_y), (self.right.x, row_y))],
            vertical: vec![Line::new((self.point.x, row_y), self.point)],
        }
    }
}

/// Compute the snapped position of `dragged` at `proposed` using the default
/// [`SnapConfig`].
///
/// `others` may contain `dragged` itself; it is skipped by id.
pub fn compute_snap(dragged: &Entity, proposed: Point, others: &[Entity], mode: SnapMode) -> SnapResult {
    compute_snap_with(&SnapConfig::default(), dragged, proposed, others, mode)
}

/// Compute the snapped position of `dragged` at `proposed`.
///
/// Grid snapping is tried first; V-shape snapping only when no grid axis
/// matched. The result depends on the arguments alone.
pub fn compute_snap_with(
    config: &SnapConfig,
    dragged: &Entity,
    proposed: Point,
    others: &[Entity],
    mode: SnapMode,
) -> SnapResult {
    if !mode.is_enabled() {
        return SnapResult::none(proposed);
    }

    if let Some(result) = snap_to_grid(config, dragged, proposed) {
        return result;
    }

    let others: Vec<&Entity> = others.iter().filter(|e| e.id != dragged.id).collect();
    snap_to_v_shape(config, dragged, proposed, &others).unwrap_or_else(|| SnapResult::none(proposed))
}

fn nearest_grid_line(value: f64, grid_size: f64) -> f64 {
    (value / grid_size).round() * grid_size
}

/// Align the box center to a vertical grid line and the box top to a
/// horizontal grid line, each axis independently.
///
/// Returns `None` when neither axis is within the threshold.
pub fn snap_to_grid(config: &SnapConfig, dragged: &Entity, proposed: Point) -> Option<SnapResult> {
    let size = size_of(dragged);
    let center_x = proposed.x + size.width / 2.0;

    let grid_x = nearest_grid_line(center_x, config.grid_size);
    let grid_y = nearest_grid_line(proposed.y, config.grid_size);
    let snapped_x = (grid_x - center_x).abs() <= config.threshold;
    let snapped_y = (grid_y - proposed.y).abs() <= config.threshold;

    if !snapped_x && !snapped_y {
        return None;
    }

    let mut position = proposed;
    if snapped_x {
        position.x = grid_x - size.width / 2.0;
    }
    if snapped_y {
        position.y = grid_y;
    }

    let center = center_at(dragged, position);
    let extent = config.guide_extent;
    let mut guides = SnapGuides::new();
    if snapped_x {
        guides
            .vertical
            .push(Line::new((grid_x, center.y - extent), (grid_x, center.y + extent)));
    }
    if snapped_y {
        guides
            .horizontal
            .push(Line::new((center.x - extent, grid_y), (center.x + extent, grid_y)));
    }

    Some(SnapResult {
        position,
        guides,
        snapped_x,
        snapped_y,
        kind: Some(SnapKind::Grid),
    })
}

/// V-shape targets for every unordered pair in `others` whose centers lie
/// within half a grid cell of each other vertically.
pub fn v_shape_targets(config: &SnapConfig, others: &[&Entity]) -> Vec<VShapeTarget> {
    let centers: Vec<Point> = others.iter().map(|e| center_of(e)).collect();
    let mut targets = Vec::new();

    for (i, &a) in centers.iter().enumerate() {
        for &b in &centers[i + 1..] {
            if (a.y - b.y).abs() > config.grid_size / 2.0 {
                continue;
            }
            let (left, right) = if a.x <= b.x { (a, b) } else { (b, a) };
            let row_y = (a.y + b.y) / 2.0;
            targets.push(VShapeTarget {
                left,
                right,
                point: Point::new((a.x + b.x) / 2.0, row_y + config.grid_size),
            });
        }
    }

    targets
}

/// Snap the dragged center onto the closest V-shape target within the
/// threshold on both axes. Ties keep the earlier pair.
pub fn snap_to_v_shape(
    config: &SnapConfig,
    dragged: &Entity,
    proposed: Point,
    others: &[&Entity],
) -> Option<SnapResult> {
    let center = center_at(dragged, proposed);
    let mut best: Option<(f64, VShapeTarget)> = None;

    for target in v_shape_targets(config, others) {
        let delta = target.point - center;
        if delta.x.abs() > config.threshold || delta.y.abs() > config.threshold {
            continue;
        }
        let dist_sq = delta.hypot2();
        if best.is_none_or(|(best_dist_sq, _)| dist_sq < best_dist_sq) {
            best = Some((dist_sq, target));
        }
    }

    best.map(|(_, target)| {
        let offset: Vec2 = target.point - center;
        SnapResult {
            position: proposed + offset,
            guides: target.guides(),
            snapped_x: true,
            snapped_y: true,
            kind: Some(SnapKind::VShape),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;

    fn entity(id: &str, x: f64, y: f64) -> Entity {
        Entity::new(id, "Acme", "", EntityKind::Company, Point::new(x, y))
    }

    /// Box of 140 x 68: center = position + (70, 34).
    fn at_center(cx: f64, cy: f64) -> Point {
        Point::new(cx - 70.0, cy - 34.0)
    }

    #[test]
    fn off_is_the_only_disabled_mode() {
        assert!(!SnapMode::Off.is_enabled());
        assert!(SnapMode::On.is_enabled());
        assert_eq!(SnapMode::from_enabled(true), SnapMode::On);
        assert_eq!(SnapMode::On.toggle(), SnapMode::Off);
        assert_eq!(SnapMode::default(), SnapMode::On);
    }

    #[test]
    fn test_off_returns_proposed() {
        let dragged = entity("d", 0.0, 0.0);
        let proposed = Point::new(51.0, 1.0);
        let result = compute_snap(&dragged, proposed, &[], SnapMode::Off);
        assert_eq!(result.position, proposed);
        assert!(result.guides.is_empty());
        assert!(!result.is_snapped());
    }

    #[test]
    fn test_grid_snap_x_only() {
        let dragged = entity("d", 0.0, 0.0);
        let proposed = at_center(122.0, 5.0);
        let result = compute_snap(&dragged, proposed, &[], SnapMode::On);

        assert_eq!(center_at(&dragged, result.position).x, 120.0);
        assert_eq!(result.position.y, proposed.y);
        assert_eq!(result.guides.vertical.len(), 1);
        assert!(result.guides.horizontal.is_empty());
        assert_eq!(result.guides.vertical[0].p0.x, 120.0);
        assert_eq!(result.kind, Some(SnapKind::Grid));
        assert!(result.snapped_x && !result.snapped_y);
    }

    #[test]
    fn test_grid_snap_both_axes() {
        let dragged = entity("d", 0.0, 0.0);
        // center x 245 -> 240, top y 230 -> 240
        let proposed = Point::new(175.0, 230.0);
        let result = compute_snap(&dragged, proposed, &[], SnapMode::On);
        assert_eq!(result.position, Point::new(170.0, 240.0));
        assert_eq!(result.guides.vertical.len(), 1);
        assert_eq!(result.guides.horizontal.len(), 1);
        let guide = result.guides.horizontal[0];
        assert_eq!(guide.p0.y, 240.0);
        assert_eq!(guide.p1.x - guide.p0.x, GUIDE_EXTENT * 2.0);
    }

    #[test]
    fn test_no_match_keeps_position() {
        let dragged = entity("d", 0.0, 0.0);
        // center x 60 is 60 away from either line, top 60 likewise
        let proposed = Point::new(-10.0, 60.0);
        let result = compute_snap(&dragged, proposed, &[], SnapMode::On);
        assert_eq!(result.position, proposed);
        assert!(result.guides.is_empty());
        assert_eq!(result.kind, None);
    }

    fn v_pair() -> Vec<Entity> {
        // centers (70, 74) and (270, 94): target (170, 204)
        vec![entity("a", 0.0, 40.0), entity("b", 200.0, 60.0)]
    }

    #[test]
    fn test_v_shape_snap() {
        let others = v_pair();
        let dragged = entity("d", 0.0, 0.0);
        let proposed = at_center(178.0, 196.0);
        let result = compute_snap(&dragged, proposed, &others, SnapMode::On);

        assert_eq!(result.kind, Some(SnapKind::VShape));
        assert_eq!(center_at(&dragged, result.position), Point::new(170.0, 204.0));
        assert_eq!(result.guides.horizontal, vec![Line::new((70.0, 84.0), (270.0, 84.0))]);
        assert_eq!(result.guides.vertical, vec![Line::new((170.0, 84.0), (170.0, 204.0))]);
    }

    #[test]
    fn test_v_shape_requires_both_axes() {
        let others = v_pair();
        let dragged = entity("d", 0.0, 0.0);
        let proposed = at_center(178.0, 175.0);
        let result = compute_snap(&dragged, proposed, &others, SnapMode::On);
        assert_eq!(result.kind, None);
        assert_eq!(result.position, proposed);
    }

    #[test]
    fn test_v_shape_ignores_pairs_on_different_rows() {
        let others = vec![entity("a", 0.0, 40.0), entity("b", 200.0, 140.0)];
        let config = SnapConfig::default();
        let refs: Vec<&Entity> = others.iter().collect();
        assert!(v_shape_targets(&config, &refs).is_empty());
    }

    #[test]
    fn test_v_shape_skips_dragged_entity() {
        // "b" is the dragged entity; without it there is no pair
        let others = v_pair();
        let dragged = others[1].clone();
        let proposed = at_center(178.0, 196.0);
        let result = compute_snap(&dragged, proposed, &others, SnapMode::On);
        assert_eq!(result.kind, None);
    }

    #[test]
    fn test_grid_wins_over_v_shape() {
        // pair centers (50, 34) and (190, 34): target (120, 154), on a grid column
        let others = vec![entity("a", -20.0, 0.0), entity("b", 120.0, 0.0)];
        let dragged = entity("d", 0.0, 0.0);
        let proposed = at_center(121.0, 154.0);
        let result = compute_snap(&dragged, proposed, &others, SnapMode::On);
        assert_eq!(result.kind, Some(SnapKind::Grid));
    }

    #[test]
    fn test_snap_is_deterministic() {
        let others = v_pair();
        let dragged = entity("d", 0.0, 0.0);
        let proposed = at_center(178.0, 196.0);
        let first = compute_snap(&dragged, proposed, &others, SnapMode::On);
        let second = compute_snap(&dragged, proposed, &others, SnapMode::On);
        assert_eq!(first, second);
    }
}
