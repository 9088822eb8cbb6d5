//! Command-line arguments.

use clap::{Args, Parser, Subcommand, ValueEnum};
use ownerchart_core::export::ExportFormat;
use ownerchart_core::model::{EntityKind, Relation};
use std::path::PathBuf;

/// Edit and export ownership hierarchy charts
#[derive(Parser, Debug)]
#[command(name = "ownerchart")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Defaults to `list`
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::List)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print entities and connections
    #[command(visible_alias = "ls")]
    List,
    /// Add an entity, optionally linked to an existing one
    Add(AddArgs),
    /// Change an entity's name, id number or type
    Edit(EditArgs),
    /// Delete an entity and its connections
    #[command(visible_alias = "rm")]
    Delete { id: String },
    /// Set an ownership percentage
    Percent {
        connection: String,
        #[arg(allow_negative_numbers = true, value_parser = finite)]
        value: f64,
    },
    /// Move an entity's top-left corner
    Move {
        id: String,
        #[arg(allow_negative_numbers = true, value_parser = finite)]
        x: f64,
        #[arg(allow_negative_numbers = true, value_parser = finite)]
        y: f64,
    },
    /// Show or set snap-to-alignment
    Snap { state: Option<Toggle> },
    /// Export the chart
    Export {
        #[arg(ignore_case = true)]
        format: Format,
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },
    /// Queue a feedback message
    Feedback {
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// Remove every entity and connection
    Clear,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct AddArgs {
    pub name: String,
    #[arg(long = "id", value_name = "ID_NUMBER", default_value = "")]
    pub id_number: String,
    /// Add a person instead of a company
    #[arg(long)]
    pub person: bool,
    /// Link the new entity as an owner of ID
    #[arg(long, value_name = "ID", group = "parent")]
    pub owner_of: Option<String>,
    /// Link the new entity as a subsidiary of ID
    #[arg(long, value_name = "ID", group = "parent")]
    pub subsidiary_of: Option<String>,
}

impl AddArgs {
    pub fn kind(&self) -> EntityKind {
        if self.person { EntityKind::Person } else { EntityKind::Company }
    }

    pub fn parent(&self) -> Option<(&str, Relation)> {
        match (&self.owner_of, &self.subsidiary_of) {
            (Some(id), _) => Some((id, Relation::Owner)),
            (None, Some(id)) => Some((id, Relation::Subsidiary)),
            (None, None) => None,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long = "id", value_name = "ID_NUMBER")]
    pub id_number: Option<String>,
    #[arg(long, group = "kind")]
    pub person: bool,
    #[arg(long, group = "kind")]
    pub company: bool,
}

impl EditArgs {
    pub fn kind(&self) -> Option<EntityKind> {
        match (self.person, self.company) {
            (true, _) => Some(EntityKind::Person),
            (_, true) => Some(EntityKind::Company),
            _ => None,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Png,
    Pdf,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => ExportFormat::Png,
            Format::Pdf => ExportFormat::Pdf,
        }
    }
}

fn finite(value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("`{value}` is not a finite number"))
}
