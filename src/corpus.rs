//! Core data model for the corpus.
//!
//! Everything here is a plain record: documents, the canonical entities that
//! aggregate mentions, the compact [`MentionLocation`] used on the query hot
//! path, and rank-0 geo points for location entities. All records are created
//! once per cache load (deserialized from a snapshot or rebuilt from the
//! backing store) and are immutable afterwards.

pub mod document;
pub mod entity;
pub mod geo;
pub mod mention;

pub use document::Document;
pub use entity::{Entity, EntityKind, EntityRecord};
pub use geo::GeoPoint;
pub use mention::{MentionLocation, TypeCodeTable};

/// Identifier of a document in the backing store.
pub type DocumentId = i32;

/// Identifier of a canonical entity in the backing store.
pub type EntityId = i32;

/// Small integer code standing in for a mention-type string.
pub type TypeCode = u16;
