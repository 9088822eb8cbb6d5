//! OwnerChart Core Library
//!
//! Platform-agnostic data model, geometry, snapping and interaction logic for
//! the ownership chart editor.

pub mod camera;
pub mod controller;
pub mod export;
pub mod feedback;
pub mod form;
pub mod geometry;
pub mod model;
pub mod sample;
pub mod snap;
pub mod storage;
pub mod store;

pub use camera::Camera;
pub use controller::{Interaction, PointerEvent, PointerTarget, ViewState, handle_pointer};
pub use export::{ChartSnapshot, ExportArtifact, ExportError, ExportFormat, ExportJob, ExportState, SnapshotRenderer};
pub use feedback::{Feedback, FeedbackError, FeedbackRelay, RelayError, submit_feedback};
pub use form::{EntityForm, ValidationError};
pub use model::{ChartData, Connection, ConnectionId, Entity, EntityId, EntityKind, Relation};
pub use snap::{SnapGuides, SnapMode, SnapResult, compute_snap, GRID_SIZE, SNAP_THRESHOLD};
pub use storage::{BlobStorage, StorageError, StorageResult};
pub use store::{EntityPatch, Store, StoreError};
