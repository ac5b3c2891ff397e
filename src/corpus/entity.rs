//! Canonical entity records.
//!
//! An entity aggregates every mention judged to refer to the same real-world
//! thing. The four kinds form a closed set; the kind only changes downstream
//! interpretation (geo lookups apply to locations, nothing else), so all
//! variants share the same [`EntityRecord`].

use serde::{Deserialize, Serialize};

use crate::error::{KopisError, Result};

use crate::corpus::EntityId;

/// The closed set of entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Person,
    Organization,
    Location,
    Date,
}

impl EntityKind {
    /// The backing store's string for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Person => "PERSON",
            EntityKind::Organization => "ORGANIZATION",
            EntityKind::Location => "LOCATION",
            EntityKind::Date => "DATE",
        }
    }

    /// Parse a backing-store kind string.
    pub fn parse(s: &str) -> Result<EntityKind> {
        match s {
            "PERSON" => Ok(EntityKind::Person),
            "ORGANIZATION" => Ok(EntityKind::Organization),
            "LOCATION" => Ok(EntityKind::Location),
            "DATE" => Ok(EntityKind::Date),
            other => Err(KopisError::lookup(format!("bad entity kind: {other}"))),
        }
    }
}

/// Fields shared by every entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Identifier in the backing store.
    pub id: EntityId,

    /// Canonical text of the entity.
    pub text: String,

    /// Number of mentions of this entity across the corpus.
    pub num_mentions: u32,

    /// Number of documents this entity appears in.
    pub num_documents: u32,

    /// Provenance tag for the pipeline stage that created the entity.
    pub created_by: String,
}

/// A canonical entity, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entity {
    Person(EntityRecord),
    Organization(EntityRecord),
    Location(EntityRecord),
    Date(EntityRecord),
}

impl Entity {
    /// Create an entity of the given kind.
    pub fn new(kind: EntityKind, record: EntityRecord) -> Self {
        match kind {
            EntityKind::Person => Entity::Person(record),
            EntityKind::Organization => Entity::Organization(record),
            EntityKind::Location => Entity::Location(record),
            EntityKind::Date => Entity::Date(record),
        }
    }

    /// The kind tag of this entity.
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Person(_) => EntityKind::Person,
            Entity::Organization(_) => EntityKind::Organization,
            Entity::Location(_) => EntityKind::Location,
            Entity::Date(_) => EntityKind::Date,
        }
    }

    /// The shared record of this entity.
    pub fn record(&self) -> &EntityRecord {
        match self {
            Entity::Person(r)
            | Entity::Organization(r)
            | Entity::Location(r)
            | Entity::Date(r) => r,
        }
    }

    /// Identifier in the backing store.
    pub fn id(&self) -> EntityId {
        self.record().id
    }

    /// Canonical text of the entity.
    pub fn text(&self) -> &str {
        &self.record().text
    }

    /// Collect the ids of a slice of entities, preserving order.
    pub fn ids(entities: &[Entity]) -> Vec<EntityId> {
        entities.iter().map(|e| e.id()).collect()
    }
}
