//! Chart view: pan offset and zoom level, and the coordinate conversions
//! between the canvas container and chart space.

use kurbo::{Affine, Point, Vec2};

/// Zoom level shown as "100%".
pub const DEFAULT_ZOOM: f64 = 1.0;
/// Zoom bounds.
pub const MIN_ZOOM: f64 = 0.3;
pub const MAX_ZOOM: f64 = 3.0;
/// Factor applied by a single zoom in/out step.
pub const ZOOM_STEP: f64 = 1.2;

/// The chart is drawn with `translate(pan) * scale(zoom)`, so a canvas
/// point `p` appears on screen at `p * zoom + pan`. Screen points are relative
/// to the canvas container's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Offset in screen pixels.
    pub pan: Vec2,
    /// Always within [`MIN_ZOOM`, `MAX_ZOOM`].
    zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Camera {
    /// 100% zoom, no pan.
    pub fn new() -> Self {
        Self::default()
    }

    /// `zoom` is clamped into range.
    pub fn with(pan: Vec2, zoom: f64) -> Self {
        let mut camera = Self { pan, zoom: DEFAULT_ZOOM };
        camera.set_zoom(zoom);
        camera
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Clamps into range; NaN is ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_nan() {
            return;
        }
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Label value for the zoom indicator.
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    /// Chart space to screen space.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Screen space to chart space.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// Pointer events carry window coordinates; `container_origin` is where the
    /// canvas container starts in the window.
    pub fn client_to_canvas(&self, client_point: Point, container_origin: Point) -> Point {
        self.screen_to_canvas((client_point - container_origin).to_point())
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Toolbar "+".
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP);
    }

    /// Toolbar "-".
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP);
    }

    /// Wheel zoom: scale by `factor` while the chart point under `anchor`
    /// stays under it.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        let target = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if target == self.zoom || target.is_nan() {
            return;
        }
        let pinned = self.screen_to_canvas(anchor);
        self.zoom = target;
        self.pan = anchor.to_vec2() - pinned.to_vec2() * target;
    }

    /// Toolbar "reset".
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
