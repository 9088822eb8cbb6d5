//! Add/edit entity forms.
//!
//! A form is a detached copy of the editable fields. It is read from an
//! entity, edited freely, and only written back through [`EntityForm::commit`]
//! after validation.

use crate::model::{Entity, EntityKind};
use thiserror::Error;

/// Rejected user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Entity name is required")]
    EmptyName,
    #[error("Feedback message is required")]
    EmptyFeedback,
}

/// Editable fields of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityForm {
    pub name: String,
    pub id_number: String,
    pub kind: EntityKind,
}

impl EntityForm {
    /// Empty "add entity" form.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(name: impl Into<String>, id_number: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            id_number: id_number.into(),
            kind,
        }
    }

    /// Copy the editable fields out of `entity`.
    pub fn read(entity: &Entity) -> Self {
        Self {
            name: entity.name.clone(),
            id_number: entity.id_number.clone(),
            kind: entity.kind,
        }
    }

    /// Check the form can be committed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    /// Apply the form to a copy of `entity`. Position and id are kept.
    pub fn commit(&self, entity: &Entity) -> Result<Entity, ValidationError> {
        self.validate()?;
        Ok(Entity {
            name: self.name.clone(),
            id_number: self.id_number.clone(),
            kind: self.kind,
            ..entity.clone()
        })
    }
}
