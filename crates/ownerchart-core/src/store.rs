//! The entity/connection store.
//!
//! [`Store`] owns the chart and is the only place it is mutated. Each
//! operation works on a copy of the current chart and swaps it in only when
//! the whole operation succeeded, then writes the full chart to storage.

use crate::form::{EntityForm, ValidationError};
use crate::model::{
    ChartData, Connection, ConnectionId, Entity, EntityId, EntityKind, Relation, clamp_percentage,
};
use crate::sample::sample_chart;
use crate::storage::{BlobStorage, CHART_KEY};
use kurbo::{Point, Vec2};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Where an entity without a parent is placed.
pub const DEFAULT_ORIGIN: Point = Point::new(400.0, 300.0);

/// Offset of a new owner from the entity it owns.
pub const OWNER_OFFSET: Vec2 = Vec2::new(0.0, -150.0);

/// Offset of a new subsidiary from its owner.
pub const SUBSIDIARY_OFFSET: Vec2 = Vec2::new(200.0, 150.0);

/// Percentage of the connection created together with a new entity.
pub const NEW_CONNECTION_PERCENTAGE: f64 = 100.0;

/// Store errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),
    #[error("Connection not found: {0}")]
    ConnectionNotFound(ConnectionId),
}

/// Fields to merge into an existing entity. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityPatch {
    pub name: Option<String>,
    pub id_number: Option<String>,
    pub kind: Option<EntityKind>,
}

impl From<EntityForm> for EntityPatch {
    fn from(form: EntityForm) -> Self {
        Self {
            name: Some(form.name),
            id_number: Some(form.id_number),
            kind: Some(form.kind),
        }
    }
}

/// Stored chart layout. Missing collections fall back to the sample chart
/// individually.
#[derive(Deserialize)]
struct PersistedChart {
    entities: Option<Vec<Entity>>,
    connections: Option<Vec<Connection>>,
}

/// Read the chart from `storage`.
///
/// Returns `None` when nothing is stored or the blob cannot be parsed.
pub fn load_chart(storage: &impl BlobStorage) -> Option<ChartData> {
    let raw = match storage.get(CHART_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Failed to read stored chart: {e}");
            return None;
        }
    };

    let persisted: PersistedChart = match serde_json::from_str(&raw) {
        Ok(persisted) => persisted,
        Err(e) => {
            log::warn!("Ignoring malformed stored chart: {e}");
            return None;
        }
    };

    let sample = sample_chart();
    let mut data = ChartData {
        entities: persisted.entities.unwrap_or(sample.entities),
        connections: persisted.connections.unwrap_or(sample.connections),
    };
    for connection in &mut data.connections {
        connection.percentage = clamp_percentage(connection.percentage);
    }
    Some(data)
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// In-memory chart with write-through persistence.
#[derive(Debug)]
pub struct Store<S: BlobStorage> {
    data: ChartData,
    storage: S,
}

impl<S: BlobStorage> Store<S> {
    /// Open the store, restoring the stored chart or seeding the sample chart.
    pub fn open(storage: S) -> Self {
        let data = load_chart(&storage).unwrap_or_else(|| {
            log::info!("No stored chart, starting from the sample chart");
            sample_chart()
        });
        Self { data, storage }
    }

    /// Create a store around `data` without touching storage.
    pub fn with_data(storage: S, data: ChartData) -> Self {
        Self { data, storage }
    }

    /// Current chart snapshot.
    pub fn data(&self) -> &ChartData {
        &self.data
    }

    pub fn entities(&self) -> &[Entity] {
        &self.data.entities
    }

    pub fn connections(&self) -> &[Connection] {
        &self.data.connections
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.data.entity(id)
    }

    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.data.connection(id)
    }

    /// Connections with `id` at either end.
    pub fn connections_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.data.connections_of(id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Run `op` on a copy of the chart; commit and persist only on success.
    fn apply<T>(&mut self, op: impl FnOnce(&mut ChartData) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let mut next = self.data.clone();
        let out = op(&mut next)?;
        self.data = next;
        self.persist();
        Ok(out)
    }

    /// Write the full chart to storage. Failures are logged only.
    fn persist(&self) {
        let json = match self.data.to_json() {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize chart: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set(CHART_KEY, &json) {
            log::warn!("Failed to save chart: {e}");
        }
    }

    /// Add an entity from `form`.
    ///
    /// With a parent, the entity is placed relative to it and linked with a
    /// 100% connection: an owner points at the parent, a subsidiary is
    /// pointed at by it.
    pub fn add_entity(
        &mut self,
        form: &EntityForm,
        parent: Option<(&str, Relation)>,
    ) -> Result<EntityId, StoreError> {
        form.validate()?;

        let id = new_id();
        let connection_id = new_id();

        self.apply(|data| {
            let (position, connection) = match parent {
                None => (DEFAULT_ORIGIN, None),
                Some((parent_id, relation)) => {
                    let parent = data
                        .entity(parent_id)
                        .ok_or_else(|| StoreError::EntityNotFound(parent_id.to_string()))?;
                    let (offset, from, to) = match relation {
                        Relation::Owner => (OWNER_OFFSET, id.as_str(), parent_id),
                        Relation::Subsidiary => (SUBSIDIARY_OFFSET, parent_id, id.as_str()),
                    };
                    let connection = Connection::new(connection_id, from, to, NEW_CONNECTION_PERCENTAGE);
                    (parent.position + offset, Some(connection))
                }
            };

            data.entities.push(Entity::new(
                id.clone(),
                form.name.clone(),
                form.id_number.clone(),
                form.kind,
                position,
            ));
            data.connections.extend(connection);
            Ok(())
        })?;

        log::info!("Added entity {} ({})", id, form.name);
        Ok(id)
    }

    /// Merge `patch` into the entity `id`. The resulting name must not be
    /// blank.
    pub fn update_entity(&mut self, id: &str, patch: EntityPatch) -> Result<(), StoreError> {
        self.apply(|data| {
            let entity = data
                .entity_mut(id)
                .ok_or_else(|| StoreError::EntityNotFound(id.to_string()))?;

            let mut form = EntityForm::read(entity);
            if let Some(name) = patch.name {
                form.name = name;
            }
            if let Some(id_number) = patch.id_number {
                form.id_number = id_number;
            }
            if let Some(kind) = patch.kind {
                form.kind = kind;
            }
            *entity = form.commit(entity)?;
            Ok(())
        })?;

        log::info!("Updated entity {id}");
        Ok(())
    }

    /// Remove the entity `id` and every connection touching it.
    pub fn delete_entity(&mut self, id: &str) -> Result<Entity, StoreError> {
        let removed = self.apply(|data| {
            let index = data
                .entities
                .iter()
                .position(|e| e.id == id)
                .ok_or_else(|| StoreError::EntityNotFound(id.to_string()))?;
            let entity = data.entities.remove(index);
            data.connections.retain(|c| !c.touches(id));
            Ok(entity)
        })?;

        log::info!("Deleted entity {id}");
        Ok(removed)
    }

    /// Set a connection's percentage, clamped to `[0, 100]`. Returns the
    /// stored value.
    pub fn update_percentage(&mut self, connection_id: &str, value: f64) -> Result<f64, StoreError> {
        let stored = self.apply(|data| {
            let connection = data
                .connection_mut(connection_id)
                .ok_or_else(|| StoreError::ConnectionNotFound(connection_id.to_string()))?;
            connection.percentage = clamp_percentage(value);
            Ok(connection.percentage)
        })?;

        log::debug!("Connection {connection_id} set to {stored}%");
        Ok(stored)
    }

    /// Overwrite an entity's position.
    pub fn move_entity(&mut self, id: &str, position: Point) -> Result<(), StoreError> {
        self.apply(|data| {
            let entity = data
                .entity_mut(id)
                .ok_or_else(|| StoreError::EntityNotFound(id.to_string()))?;
            entity.position = position;
            Ok(())
        })
    }

    /// Remove every entity and connection.
    ///
    /// The stored blob is removed and the empty chart written back, so a
    /// later [`Store::open`] restores an empty chart rather than the sample.
    pub fn clear_all(&mut self) {
        if let Err(e) = self.storage.remove(CHART_KEY) {
            log::warn!("Failed to remove stored chart: {e}");
        }
        self.data = ChartData::new();
        self.persist();
        log::info!("Cleared chart");
    }
}
