//! The contract the cache requires of the backing relational store.

use crate::corpus::{Document, DocumentId, Entity, EntityId, GeoPoint};
use crate::error::Result;

/// A raw mention row as supplied by the backing store.
///
/// The mention type arrives as a string; the cache interns it to a
/// [`TypeCode`](crate::corpus::TypeCode) while building the mention index.
/// Offsets are signed here because the store may hand back malformed rows;
/// the index build rejects negative starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionRow {
    /// The document the mention occurs in.
    pub document_id: DocumentId,

    /// The entity the mention resolves to, or `None` if unlinked.
    pub entity_id: Option<EntityId>,

    /// 0-based sequence index of the mention within its document.
    pub index: u32,

    /// Character offset of the start of the mention text.
    pub text_start: i64,

    /// Character offset just past the end of the mention text.
    pub text_stop: i64,

    /// Mention type string, e.g. `"PERSON"`.
    pub mention_type: String,
}

/// A document/entity association row with its per-pair mention count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssociationRow {
    pub document_id: DocumentId,
    pub entity_id: EntityId,
    pub mention_count: u32,
}

/// A trait for backing stores that can supply bulk corpus rows.
///
/// The cache calls the `list_*` methods exactly once per cold load, and
/// [`fetch_document_text`](BackingStore::fetch_document_text) lazily per
/// document. Any error from these methods is treated as fatal by
/// [`CorpusCache::open`](crate::cache::CorpusCache::open).
pub trait BackingStore: Send + std::fmt::Debug {
    /// List all documents (id, name, path; text is not bulk-fetched).
    fn list_documents(&self) -> Result<Vec<Document>>;

    /// Fetch the full text of one document, or `None` if it has none.
    fn fetch_document_text(&self, document_id: DocumentId) -> Result<Option<String>>;

    /// List all entities, every kind, with counts and provenance.
    fn list_entities(&self) -> Result<Vec<Entity>>;

    /// List all mention rows in compact form, text omitted.
    fn list_mention_locations(&self) -> Result<Vec<MentionRow>>;

    /// List the rank-0 geo point of every geocoded location entity.
    fn list_rank0_geo_points(&self) -> Result<Vec<GeoPoint>>;

    /// List the document/entity association rows with mention counts.
    fn list_document_entity_associations(&self) -> Result<Vec<AssociationRow>>;

    /// Close the store and release its connection.
    fn close(&mut self) -> Result<()>;
}
