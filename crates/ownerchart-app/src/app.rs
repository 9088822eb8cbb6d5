//! Command execution against a persisted chart.

use crate::cli::{Command, Toggle};
use kurbo::Point;
use ownerchart_core::export::{CAPTURE_DELAY, ExportError, ExportJob, ExportState};
use ownerchart_core::feedback::{Feedback, FeedbackError, FeedbackRelay, RelayError, submit_feedback};
use ownerchart_core::form::EntityForm;
use ownerchart_core::snap::{SnapKind, compute_snap};
use ownerchart_core::storage::{BlobStorage, FileStorage, StorageError};
use ownerchart_core::store::{EntityPatch, Store, StoreError};
use ownerchart_core::{SnapMode, ViewState};
use ownerchart_render::ExportRenderer;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "OWNERCHART_DATA_DIR";

/// Storage key of queued feedback messages.
pub const FEEDBACK_OUTBOX_KEY: &str = "feedbackOutbox";

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Storage directory; `None` uses the platform data directory.
    pub data_dir: Option<PathBuf>,
    /// Device pixels per canvas unit in exports.
    pub export_scale: f64,
    /// Pause between entering capture and rendering an export.
    pub capture_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            export_scale: 2.0,
            capture_delay: CAPTURE_DELAY,
        }
    }
}

impl AppConfig {
    /// Default configuration with `OWNERCHART_DATA_DIR` applied.
    pub fn from_env() -> Self {
        let data_dir = std::env::var_os(DATA_DIR_ENV)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);
        Self {
            data_dir,
            ..Self::default()
        }
    }

    /// Open the configured file storage.
    pub fn open_storage(&self) -> Result<FileStorage, StorageError> {
        match &self.data_dir {
            Some(dir) => FileStorage::new(dir.clone()),
            None => FileStorage::default_location(),
        }
    }
}

/// Feedback relay that queues messages in local storage.
pub struct OutboxRelay<'a, S: BlobStorage> {
    storage: &'a S,
}

impl<'a, S: BlobStorage> OutboxRelay<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Queued messages, oldest first.
    pub fn queued(&self) -> Vec<Feedback> {
        match self.storage.get(FEEDBACK_OUTBOX_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Discarding malformed feedback outbox: {e}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Failed to read feedback outbox: {e}");
                Vec::new()
            }
        }
    }
}

impl<S: BlobStorage> FeedbackRelay for OutboxRelay<'_, S> {
    fn deliver(&self, feedback: &Feedback) -> Result<u16, RelayError> {
        let mut queued = self.queued();
        queued.push(feedback.clone());
        let json = serde_json::to_string(&queued).map_err(|e| RelayError::Queue(e.to_string()))?;
        self.storage
            .set(FEEDBACK_OUTBOX_KEY, &json)
            .map_err(|e| RelayError::Queue(e.to_string()))?;
        Ok(202)
    }
}

/// The chart editor shell.
pub struct App<S: BlobStorage> {
    store: Store<S>,
    view: ViewState,
    export: ExportJob,
    renderer: ExportRenderer,
    config: AppConfig,
}

impl<S: BlobStorage> App<S> {
    /// Open the chart and view preferences in `storage`.
    pub fn open(storage: S, config: AppConfig) -> Self {
        let view = ViewState::restore(&storage);
        let store = Store::open(storage);
        log::info!(
            "Opened chart with {} entities and {} connections",
            store.entities().len(),
            store.connections().len()
        );
        Self {
            store,
            view,
            export: ExportJob::new(),
            renderer: ExportRenderer::new().with_scale(config.export_scale),
            config,
        }
    }

    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Execute `command`, writing user-facing output to `out`.
    pub fn run(&mut self, command: Command, out: &mut impl Write) -> Result<(), AppError> {
        match command {
            Command::List => self.list(out)?,
            Command::Add(args) => {
                let form = EntityForm::with(args.name.clone(), args.id_number.clone(), args.kind());
                let id = self.store.add_entity(&form, args.parent())?;
                writeln!(out, "Added {id}")?;
            }
            Command::Edit(args) => {
                let kind = args.kind();
                self.store.update_entity(
                    &args.id,
                    EntityPatch {
                        name: args.name,
                        id_number: args.id_number,
                        kind,
                    },
                )?;
                writeln!(out, "Updated {}", args.id)?;
            }
            Command::Delete { id } => {
                let removed = self.store.delete_entity(&id)?;
                writeln!(out, "Deleted {} ({})", removed.name, removed.id)?;
            }
            Command::Percent { connection, value } => {
                let stored = self.store.update_percentage(&connection, value)?;
                writeln!(out, "{connection} = {stored}%")?;
            }
            Command::Move { id, x, y } => self.move_entity(&id, Point::new(x, y), out)?,
            Command::Snap { state: None } => {
                writeln!(out, "Snap to alignment: {}", on_off(self.view.snap_mode))?;
            }
            Command::Snap { state: Some(state) } => {
                let enabled = state == Toggle::On;
                if self.view.snap_mode.is_enabled() != enabled {
                    self.view = self.view.clone().toggle_snap(self.store.storage())?;
                }
                writeln!(out, "Snap to alignment: {}", on_off(self.view.snap_mode))?;
            }
            Command::Export { format, path } => {
                self.export.begin(format.into())?;
                std::thread::sleep(self.config.capture_delay);
                self.export.finish(self.store.data(), &self.renderer);

                let Some(artifact) = self.export.take_artifact() else {
                    let err = match self.export.state() {
                        ExportState::Failed(e) => e.clone(),
                        _ => ExportError::NotCapturing,
                    };
                    self.export.reset();
                    return Err(err.into());
                };
                let path = path.unwrap_or_else(|| PathBuf::from(&artifact.file_name));
                std::fs::write(&path, &artifact.bytes)?;
                log::info!("Exported {} to {:?}", artifact.format.mime_type(), path);
                writeln!(out, "Wrote {} ({} bytes)", path.display(), artifact.bytes.len())?;
            }
            Command::Feedback { message } => {
                submit_feedback(&OutboxRelay::new(self.store.storage()), &message.join(" "))?;
                writeln!(out, "Thanks for your feedback")?;
            }
            Command::Clear => {
                self.store.clear_all();
                writeln!(out, "Cleared chart")?;
            }
        }
        Ok(())
    }

    fn list(&self, out: &mut impl Write) -> Result<(), AppError> {
        let data = self.store.data();
        if data.is_empty() {
            writeln!(out, "Chart is empty")?;
            return Ok(());
        }

        writeln!(out, "Entities:")?;
        for entity in &data.entities {
            let id_number = entity.id_number().map(|n| format!(" [{n}]")).unwrap_or_default();
            writeln!(
                out,
                "  {} {}{} ({}) at ({}, {})",
                entity.id,
                entity.name,
                id_number,
                entity.kind.label(),
                entity.position.x,
                entity.position.y
            )?;
        }

        writeln!(out, "Connections:")?;
        for (connection, from, to) in data.drawable_connections() {
            writeln!(out, "  {} {} -> {} {}", connection.id, from.name, to.name, connection.label())?;
        }
        Ok(())
    }

    /// Move an entity, applying snapping like a drag that ends at `position`.
    fn move_entity(&mut self, id: &str, position: Point, out: &mut impl Write) -> Result<(), AppError> {
        let entity = self
            .store
            .entity(id)
            .ok_or_else(|| StoreError::EntityNotFound(id.to_string()))?;
        let snap = compute_snap(entity, position, self.store.entities(), self.view.snap_mode);
        self.store.move_entity(id, snap.position)?;

        let how = match snap.kind {
            Some(SnapKind::Grid) => " (snapped to grid)",
            Some(SnapKind::VShape) => " (snapped to V-shape)",
            None => "",
        };
        writeln!(out, "Moved {id} to ({}, {}){how}", snap.position.x, snap.position.y)?;
        Ok(())
    }
}

fn on_off(mode: SnapMode) -> &'static str {
    if mode.is_enabled() { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{AddArgs, Format};
    use ownerchart_core::storage::MemoryStorage;

    fn config() -> AppConfig {
        AppConfig {
            data_dir: None,
            export_scale: 1.0,
            capture_delay: Duration::ZERO,
        }
    }

    fn run(app: &mut App<&MemoryStorage>, command: Command) -> String {
        let mut out = Vec::new();
        app.run(command, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_list_sample() {
        let storage = MemoryStorage::new();
        let mut app = App::open(&storage, config());
        let text = run(&mut app, Command::List);
        assert!(text.contains("1 Acme Corporation [AC001] (Company) at (400, 300)"));
        assert!(text.contains("conn1 John Smith -> Acme Corporation 60%"));
    }

    #[test]
    fn test_add_owner_persists() {
        let storage = MemoryStorage::new();
        let mut app = App::open(&storage, config());
        run(
            &mut app,
            Command::Add(AddArgs {
                name: "Jane".to_string(),
                id_number: String::new(),
                person: true,
                owner_of: Some("1".to_string()),
                subsidiary_of: None,
            }),
        );

        let reopened = App::open(&storage, config());
        assert_eq!(reopened.store().entities().len(), 5);
        assert_eq!(reopened.store().connections().len(), 4);
    }

    #[test]
    fn test_errors_surface() {
        let storage = MemoryStorage::new();
        let mut app = App::open(&storage, config());
        let mut out = Vec::new();
        let err = app.run(Command::Delete { id: "missing".to_string() }, &mut out).unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::EntityNotFound(_))));

        let blank = Command::Feedback {
            message: vec!["  ".to_string()],
        };
        let err = app.run(blank, &mut out).unwrap_err();
        assert!(matches!(err, AppError::Feedback(FeedbackError::Validation(_))));
        assert_eq!(err.to_string(), "Feedback message is required");
    }

    #[test]
    fn test_move_snaps_when_enabled() {
        let storage = MemoryStorage::new();
        let mut app = App::open(&storage, config());
        // Innovation Labs is 153 wide; center x 476.5 is within reach of 480
        let text = run(&mut app, Command::Move { id: "4".to_string(), x: 400.0, y: 400.0 });
        assert!(text.contains("snapped to grid"), "{text}");
        assert_eq!(app.store().entity("4").unwrap().position, Point::new(403.5, 400.0));

        run(&mut app, Command::Snap { state: Some(Toggle::Off) });
        let text = run(&mut app, Command::Move { id: "4".to_string(), x: 400.0, y: 400.0 });
        assert!(!text.contains("snapped"));
        assert_eq!(app.store().entity("4").unwrap().position, Point::new(400.0, 400.0));
        assert_eq!(App::open(&storage, config()).view().snap_mode, SnapMode::Off);
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let storage = MemoryStorage::new();
        let mut app = App::open(&storage, config());
        run(
            &mut app,
            Command::Export {
                format: Format::Png,
                path: Some(path.clone()),
            },
        );
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_export_empty_chart_fails() {
        let storage = MemoryStorage::new();
        let mut app = App::open(&storage, config());
        run(&mut app, Command::Clear);
        let mut out = Vec::new();
        let err = app
            .run(
                Command::Export {
                    format: Format::Pdf,
                    path: None,
                },
                &mut out,
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Export(ExportError::EmptyChart)));

        // The job is free again
        run(&mut app, Command::Snap { state: None });
    }

    #[test]
    fn test_feedback_queued() {
        let storage = MemoryStorage::new();
        let mut app = App::open(&storage, config());
        for text in ["first", "second thought"] {
            let message = text.split(' ').map(String::from).collect();
            run(&mut app, Command::Feedback { message });
        }
        let queued = OutboxRelay::new(&storage).queued();
        let messages: Vec<&str> = queued.iter().map(|f| f.feedback.as_str()).collect();
        assert_eq!(messages, ["first", "second thought"]);
    }
}
