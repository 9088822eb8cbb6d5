//! Pointer handling for the canvas: panning the view and dragging entities.
//!
//! All view state lives in [`ViewState`], which [`handle_pointer`] takes by
//! value and returns updated. Entity moves are written through the store.

use crate::camera::{Camera, ZOOM_STEP};
use crate::model::EntityId;
use crate::snap::{SnapGuides, SnapMode, compute_snap};
use crate::storage::{BlobStorage, StorageResult, load_snap_enabled, save_snap_enabled};
use crate::store::Store;
use kurbo::{Point, Vec2};

/// What the pointer went down on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty canvas or grid.
    Background,
    /// An entity box.
    Entity(EntityId),
}

/// Pointer input in client coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Down { position: Point, target: PointerTarget },
    Move { position: Point },
    Up,
    Leave,
    /// Wheel scroll; negative `delta_y` zooms in.
    Wheel { position: Point, delta_y: f64 },
}

/// Current pointer interaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Panning; `origin` is the pointer position minus the pan at press time.
    Panning { origin: Vec2 },
    /// Dragging an entity; `offset` is the pointer's canvas position minus
    /// the entity's position at press time.
    Dragging { entity_id: EntityId, offset: Vec2 },
}

/// Per-session canvas state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub camera: Camera,
    pub interaction: Interaction,
    /// Guides of the snap applied by the latest drag move.
    pub guides: SnapGuides,
    pub snap_mode: SnapMode,
    /// Client position of the canvas container's top-left corner.
    pub container_origin: Point,
}

impl ViewState {
    pub fn new(snap_mode: SnapMode) -> Self {
        Self {
            snap_mode,
            ..Self::default()
        }
    }

    /// Fresh view using the persisted snap preference.
    pub fn restore(storage: &impl BlobStorage) -> Self {
        Self::new(SnapMode::from_enabled(load_snap_enabled(storage)))
    }

    /// Id of the entity being dragged, if any.
    pub fn dragged_entity(&self) -> Option<&str> {
        match &self.interaction {
            Interaction::Dragging { entity_id, .. } => Some(entity_id),
            _ => None,
        }
    }

    pub fn is_dragging(&self, entity_id: &str) -> bool {
        self.dragged_entity() == Some(entity_id)
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.interaction, Interaction::Panning { .. })
    }

    /// Client position relative to the canvas container.
    fn container_point(&self, client: Point) -> Point {
        (client - self.container_origin).to_point()
    }

    pub fn zoom_in(mut self) -> Self {
        self.camera.zoom_in();
        self
    }

    pub fn zoom_out(mut self) -> Self {
        self.camera.zoom_out();
        self
    }

    /// Back to zoom 1 and no pan.
    pub fn reset_view(mut self) -> Self {
        self.camera.reset();
        self
    }

    /// Flip snapping and persist the preference.
    pub fn toggle_snap(mut self, storage: &impl BlobStorage) -> StorageResult<Self> {
        self.snap_mode = self.snap_mode.toggle();
        save_snap_enabled(storage, self.snap_mode.is_enabled())?;
        log::info!("Snap to alignment {}", if self.snap_mode.is_enabled() { "on" } else { "off" });
        Ok(self)
    }

    /// Drop guides and any interaction, e.g. before an export capture.
    pub fn end_interaction(mut self) -> Self {
        self.interaction = Interaction::Idle;
        self.guides.clear();
        self
    }
}

/// Apply one pointer event.
pub fn handle_pointer<S: BlobStorage>(mut view: ViewState, event: PointerEvent, store: &mut Store<S>) -> ViewState {
    match event {
        PointerEvent::Down { position, target } => {
            if view.interaction != Interaction::Idle {
                log::debug!("Ignoring pointer down during {:?}", view.interaction);
                return view;
            }
            match target {
                PointerTarget::Background => {
                    view.interaction = Interaction::Panning {
                        origin: position.to_vec2() - view.camera.pan,
                    };
                }
                PointerTarget::Entity(entity_id) => {
                    let Some(entity) = store.entity(&entity_id) else {
                        log::debug!("Pointer down on unknown entity {entity_id}");
                        return view;
                    };
                    let canvas = view.camera.client_to_canvas(position, view.container_origin);
                    let offset = canvas - entity.position;
                    log::debug!("Drag start {entity_id}");
                    view.interaction = Interaction::Dragging { entity_id, offset };
                }
            }
            view
        }
        PointerEvent::Move { position } => match view.interaction.clone() {
            Interaction::Idle => view,
            Interaction::Panning { origin } => {
                view.camera.pan = position.to_vec2() - origin;
                view
            }
            Interaction::Dragging { entity_id, offset } => {
                let Some(entity) = store.entity(&entity_id).cloned() else {
                    log::debug!("Dragged entity {entity_id} is gone");
                    return view.end_interaction();
                };
                let canvas = view.camera.client_to_canvas(position, view.container_origin);
                let proposed = canvas - offset;
                let snap = compute_snap(&entity, proposed, store.entities(), view.snap_mode);

                if let Err(e) = store.move_entity(&entity_id, snap.position) {
                    log::debug!("Drag move failed: {e}");
                    return view.end_interaction();
                }
                view.guides = snap.guides;
                view
            }
        },
        PointerEvent::Up | PointerEvent::Leave => {
            if let Some(id) = view.dragged_entity() {
                log::debug!("Drag end {id}");
            }
            view.end_interaction()
        }
        PointerEvent::Wheel { position, delta_y } => {
            if delta_y == 0.0 {
                return view;
            }
            let factor = if delta_y < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
            let anchor = view.container_point(position);
            view.camera.zoom_at(anchor, factor);
            view
        }
    }
}
