//! Entities, connections and the chart document that holds them.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Identifier of an entity box.
pub type EntityId = String;

/// Identifier of an ownership connection.
pub type ConnectionId = String;

/// Kind of party shown in an entity box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Company,
    Person,
}

impl EntityKind {
    /// Display name for this kind.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Company => "Company",
            EntityKind::Person => "Person",
        }
    }
}

/// A company or person node in the ownership chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    /// Registration or personal id number. Empty when absent.
    #[serde(rename = "idNumber", default)]
    pub id_number: String,
    #[serde(rename = "type", default)]
    pub kind: EntityKind,
    /// Top-left corner in canvas space.
    pub position: Point,
}

impl Entity {
    pub fn new(
        id: impl Into<EntityId>,
        name: impl Into<String>,
        id_number: impl Into<String>,
        kind: EntityKind,
        position: Point,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            id_number: id_number.into(),
            kind,
            position,
        }
    }

    /// The id number, if one was entered.
    pub fn id_number(&self) -> Option<&str> {
        if self.id_number.is_empty() {
            None
        } else {
            Some(&self.id_number)
        }
    }
}

/// Lowest storable ownership percentage.
pub const MIN_PERCENTAGE: f64 = 0.0;
/// Highest storable ownership percentage.
pub const MAX_PERCENTAGE: f64 = 100.0;

/// Clamp a percentage into `[0, 100]`. NaN becomes 0.
pub fn clamp_percentage(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_PERCENTAGE;
    }
    value.clamp(MIN_PERCENTAGE, MAX_PERCENTAGE)
}

/// A directed ownership edge: `from` holds `percentage` of `to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from: EntityId,
    pub to: EntityId,
    pub percentage: f64,
}

impl Connection {
    /// Create a connection; the percentage is clamped.
    pub fn new(
        id: impl Into<ConnectionId>,
        from: impl Into<EntityId>,
        to: impl Into<EntityId>,
        percentage: f64,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            percentage: clamp_percentage(percentage),
        }
    }

    /// Whether `entity_id` is either end of this connection.
    pub fn touches(&self, entity_id: &str) -> bool {
        self.from == entity_id || self.to == entity_id
    }

    /// Text shown on the line, e.g. `60%`.
    pub fn label(&self) -> String {
        format!("{}%", self.percentage)
    }
}

/// How a newly added entity relates to the entity it was added from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// The new entity owns the parent (placed above it).
    Owner,
    /// The new entity is owned by the parent (placed below it).
    Subsidiary,
}

/// Full chart contents, in draw order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub entities: Vec<Entity>,
    pub connections: Vec<Connection>,
}

impl ChartData {
    /// Create an empty chart.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.connections.is_empty()
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn connection_mut(&mut self, id: &str) -> Option<&mut Connection> {
        self.connections.iter_mut().find(|c| c.id == id)
    }

    /// Connections with `entity_id` at either end.
    pub fn connections_of<'a>(&'a self, entity_id: &'a str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.touches(entity_id))
    }

    /// Connections whose both ends exist, paired with those ends.
    pub fn drawable_connections(&self) -> impl Iterator<Item = (&Connection, &Entity, &Entity)> {
        self.connections.iter().filter_map(|c| {
            let from = self.entity(&c.from)?;
            let to = self.entity(&c.to)?;
            Some((c, from, to))
        })
    }

    /// Serialize the chart to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize a chart from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
