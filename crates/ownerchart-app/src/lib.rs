//! OwnerChart Application
//!
//! Command-line shell over the chart store: editing, snapping moves, exports
//! and feedback.

mod app;
mod cli;

pub use app::{App, AppConfig, AppError, DATA_DIR_ENV, FEEDBACK_OUTBOX_KEY, OutboxRelay};
pub use cli::{AddArgs, Cli, Command, EditArgs, Format, Toggle};
