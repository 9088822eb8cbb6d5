//! End-to-end editing sessions against in-memory storage.

use kurbo::Point;
use ownerchart_core::export::{ChartSnapshot, ExportError, ExportFormat, ExportJob, SnapshotRenderer};
use ownerchart_core::form::EntityForm;
use ownerchart_core::model::{EntityKind, Relation};
use ownerchart_core::snap::SnapMode;
use ownerchart_core::storage::MemoryStorage;
use ownerchart_core::{PointerEvent, PointerTarget, Store, ViewState, handle_pointer};

struct CountingRenderer;

impl SnapshotRenderer for CountingRenderer {
    fn render(&self, snapshot: &ChartSnapshot, _format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        Ok(vec![snapshot.boxes.len() as u8, snapshot.lines.len() as u8])
    }
}

#[test]
fn add_owner_drag_and_reload() {
    let storage = MemoryStorage::new();
    let mut store = Store::open(&storage);
    assert_eq!(store.entities().len(), 4);

    let form = EntityForm::with("Jane Doe", "JD001", EntityKind::Person);
    let id = store.add_entity(&form, Some(("1", Relation::Owner))).unwrap();
    assert_eq!(store.entity(&id).unwrap().position, Point::new(400.0, 150.0));
    let link = store.connections_of(&id).next().unwrap();
    assert_eq!((link.from.as_str(), link.to.as_str(), link.percentage), (id.as_str(), "1", 100.0));

    let mut view = ViewState::new(SnapMode::Off);
    view = handle_pointer(
        view,
        PointerEvent::Down {
            position: Point::new(410.0, 160.0),
            target: PointerTarget::Entity(id.clone()),
        },
        &mut store,
    );
    assert!(view.is_dragging(&id));
    view = handle_pointer(view, PointerEvent::Move { position: Point::new(700.0, 1010.0) }, &mut store);
    view = handle_pointer(view, PointerEvent::Up, &mut store);
    assert!(view.dragged_entity().is_none());

    let reopened = Store::open(&storage);
    assert_eq!(reopened.entity(&id).unwrap().position, Point::new(690.0, 1000.0));
    assert_eq!(reopened.connections().len(), 4);
}

#[test]
fn delete_then_export() {
    let storage = MemoryStorage::new();
    let mut store = Store::open(&storage);
    store.delete_entity("1").unwrap();
    // Every sample connection touches Acme
    assert!(store.connections().is_empty());

    let mut job = ExportJob::new();
    job.begin(ExportFormat::Pdf).unwrap();
    job.finish(store.data(), &CountingRenderer);
    let artifact = job.take_artifact().unwrap();
    assert_eq!(artifact.file_name, "ownership-hierarchy.pdf");
    assert_eq!(artifact.bytes, vec![3, 0]);
}

#[test]
fn clear_survives_reload() {
    let storage = MemoryStorage::new();
    let mut store = Store::open(&storage);
    store.clear_all();
    assert!(store.data().is_empty());

    let reopened = Store::open(&storage);
    assert!(reopened.data().is_empty());

    let mut job = ExportJob::new();
    job.begin(ExportFormat::Png).unwrap();
    job.finish(reopened.data(), &CountingRenderer);
    assert_eq!(job.take_artifact(), None);
}

#[test]
fn snap_preference_survives_reload() {
    let storage = MemoryStorage::new();
    let view = ViewState::restore(&storage);
    assert_eq!(view.snap_mode, SnapMode::On);

    let view = view.toggle_snap(&storage).unwrap();
    assert_eq!(view.snap_mode, SnapMode::Off);
    assert_eq!(ViewState::restore(&storage).snap_mode, SnapMode::Off);
}
