//! Export of the chart to image and page documents.
//!
//! Exporting is a two-phase job. [`ExportJob::begin`] enters the capturing
//! state so hosts can hide transient UI (snap guides, hover buttons); after
//! [`CAPTURE_DELAY`] the host calls [`ExportJob::finish`], which snapshots the
//! chart and hands it to a [`SnapshotRenderer`] for encoding.

use crate::geometry::{bounds, connection_geometry, wrap_name};
use crate::model::{ChartData, ConnectionId, EntityId, EntityKind};
use kurbo::{Line, Point, Rect};
use std::time::Duration;
use thiserror::Error;

/// Pause between hiding transient UI and taking the snapshot.
pub const CAPTURE_DELAY: Duration = Duration::from_millis(100);

/// Margin around the chart in exported artifacts (canvas units).
pub const SNAPSHOT_PADDING: f64 = 40.0;

/// Title printed on page exports.
pub const EXPORT_TITLE: &str = "Ownership Hierarchy Diagram";

/// Artifact formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Raster image.
    Png,
    /// Landscape page embedding the raster.
    Pdf,
}

impl ExportFormat {
    /// Download name of the artifact.
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Png => "ownership-hierarchy.png",
            ExportFormat::Pdf => "ownership-hierarchy.pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

/// Export errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("Nothing to export")]
    EmptyChart,
    #[error("An export is already in progress")]
    Busy,
    #[error("No export has been started")]
    NotCapturing,
    #[error("Render failed: {0}")]
    Render(String),
}

/// An entity box as it appears in an export.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    pub rect: Rect,
    pub name_lines: Vec<String>,
    /// `ID: …` line, when the entity has an id number.
    pub id_label: Option<String>,
}

/// A connection line as it appears in an export.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSnapshot {
    pub id: ConnectionId,
    pub line: Line,
    pub label_anchor: Point,
    pub label: String,
}

/// Geometry of the whole chart at one instant, in canvas space.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSnapshot {
    pub boxes: Vec<BoxSnapshot>,
    /// Only connections whose both ends exist.
    pub lines: Vec<LineSnapshot>,
    /// Union of all boxes, grown by [`SNAPSHOT_PADDING`].
    pub bounds: Rect,
}

impl ChartSnapshot {
    /// Snapshot `data`. Returns `None` when there are no entities.
    pub fn capture(data: &ChartData) -> Option<Self> {
        let boxes: Vec<BoxSnapshot> = data
            .entities
            .iter()
            .map(|entity| BoxSnapshot {
                id: entity.id.clone(),
                kind: entity.kind,
                rect: bounds(entity),
                name_lines: wrap_name(&entity.name),
                id_label: entity.id_number().map(|n| format!("ID: {n}")),
            })
            .collect();

        let union = boxes.iter().map(|b| b.rect).reduce(|a, b| a.union(b))?;

        let lines = data
            .drawable_connections()
            .map(|(connection, from, to)| {
                let geometry = connection_geometry(from, to);
                LineSnapshot {
                    id: connection.id.clone(),
                    line: geometry.line,
                    label_anchor: geometry.label_anchor,
                    label: connection.label(),
                }
            })
            .collect();

        Some(Self {
            boxes,
            lines,
            bounds: union.inflate(SNAPSHOT_PADDING, SNAPSHOT_PADDING),
        })
    }
}

/// Encodes a snapshot into artifact bytes.
pub trait SnapshotRenderer {
    fn render(&self, snapshot: &ChartSnapshot, format: ExportFormat) -> Result<Vec<u8>, ExportError>;
}

/// A finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// State of an export job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportState {
    #[default]
    Idle,
    /// Transient UI should be hidden until the job leaves this state.
    Capturing(ExportFormat),
    Ready(ExportArtifact),
    Failed(ExportError),
}

/// Drives one export at a time.
#[derive(Debug, Default)]
pub struct ExportJob {
    state: ExportState,
}

impl ExportJob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ExportState {
        &self.state
    }

    /// Whether transient UI must stay hidden.
    pub fn is_capturing(&self) -> bool {
        matches!(self.state, ExportState::Capturing(_))
    }

    /// Start capturing. Refused while another capture is pending.
    pub fn begin(&mut self, format: ExportFormat) -> Result<(), ExportError> {
        if self.is_capturing() {
            return Err(ExportError::Busy);
        }
        log::debug!("Export {:?} capturing", format);
        self.state = ExportState::Capturing(format);
        Ok(())
    }

    /// Snapshot `data` and render it. Ends in `Ready` or `Failed`.
    pub fn finish(&mut self, data: &ChartData, renderer: &impl SnapshotRenderer) -> &ExportState {
        let ExportState::Capturing(format) = self.state else {
            self.state = ExportState::Failed(ExportError::NotCapturing);
            return &self.state;
        };

        let result = ChartSnapshot::capture(data)
            .ok_or(ExportError::EmptyChart)
            .and_then(|snapshot| renderer.render(&snapshot, format));

        self.state = match result {
            Ok(bytes) => {
                log::info!("Exported {} ({} bytes)", format.file_name(), bytes.len());
                ExportState::Ready(ExportArtifact {
                    format,
                    file_name: format.file_name().to_string(),
                    bytes,
                })
            }
            Err(e) => {
                log::warn!("Export {:?} failed: {e}", format);
                ExportState::Failed(e)
            }
        };
        &self.state
    }

    /// Take the finished artifact, returning the job to `Idle`.
    pub fn take_artifact(&mut self) -> Option<ExportArtifact> {
        match std::mem::take(&mut self.state) {
            ExportState::Ready(artifact) => Some(artifact),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Return to `Idle`, dropping any result.
    pub fn reset(&mut self) {
        self.state = ExportState::Idle;
    }
}
