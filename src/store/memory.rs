//! In-memory backing store implementation.
//!
//! Holds the corpus rows in plain vectors. Fast but non-persistent, intended
//! for tests, benchmarks and prototyping. The store counts its queries
//! through a shareable [`StoreStats`] handle so callers can verify, for
//! example, that a warm cache open never touches the store.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use ahash::AHashMap;

use crate::corpus::{Document, DocumentId, Entity, EntityId, GeoPoint};
use crate::error::{KopisError, Result};
use crate::store::backing::{AssociationRow, BackingStore, MentionRow};

/// Query counters for a [`MemoryBackingStore`].
///
/// Handed out as an `Arc` so the counters stay observable after the store is
/// boxed into a cache.
#[derive(Debug, Default)]
pub struct StoreStats {
    bulk_queries: AtomicU32,
    text_fetches: AtomicU32,
}

impl StoreStats {
    /// Number of bulk `list_*` queries served so far.
    pub fn bulk_queries(&self) -> u32 {
        self.bulk_queries.load(Ordering::Relaxed)
    }

    /// Number of document-text fetches served so far.
    pub fn text_fetches(&self) -> u32 {
        self.text_fetches.load(Ordering::Relaxed)
    }
}

/// An in-memory backing store.
#[derive(Debug, Default)]
pub struct MemoryBackingStore {
    documents: Vec<Document>,
    texts: AHashMap<DocumentId, String>,
    entities: Vec<Entity>,
    mentions: Vec<MentionRow>,
    geo_points: Vec<GeoPoint>,
    associations: Vec<AssociationRow>,
    closed: bool,
    stats: Arc<StoreStats>,
}

impl MemoryBackingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        MemoryBackingStore::default()
    }

    /// Add a document row.
    pub fn add_document(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Set the full text of a document.
    pub fn set_document_text<S: Into<String>>(&mut self, document_id: DocumentId, text: S) {
        self.texts.insert(document_id, text.into());
    }

    /// Add an entity row.
    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Add a mention row.
    pub fn add_mention(&mut self, mention: MentionRow) {
        self.mentions.push(mention);
    }

    /// Add a rank-0 geo point row.
    pub fn add_geo_point(&mut self, point: GeoPoint) {
        self.geo_points.push(point);
    }

    /// Add a document/entity association row.
    pub fn add_association(
        &mut self,
        document_id: DocumentId,
        entity_id: EntityId,
        mention_count: u32,
    ) {
        self.associations.push(AssociationRow {
            document_id,
            entity_id,
            mention_count,
        });
    }

    /// A shared handle on this store's query counters.
    pub fn stats(&self) -> Arc<StoreStats> {
        self.stats.clone()
    }

    fn check_closed(&self) -> Result<()> {
        if self.closed {
            Err(KopisError::store("backing store is closed"))
        } else {
            Ok(())
        }
    }

    fn count_bulk_query(&self) {
        self.stats.bulk_queries.fetch_add(1, Ordering::Relaxed);
    }
}

impl BackingStore for MemoryBackingStore {
    fn list_documents(&self) -> Result<Vec<Document>> {
        self.check_closed()?;
        self.count_bulk_query();
        Ok(self.documents.clone())
    }

    fn fetch_document_text(&self, document_id: DocumentId) -> Result<Option<String>> {
        self.check_closed()?;
        self.stats.text_fetches.fetch_add(1, Ordering::Relaxed);
        Ok(self.texts.get(&document_id).cloned())
    }

    fn list_entities(&self) -> Result<Vec<Entity>> {
        self.check_closed()?;
        self.count_bulk_query();
        Ok(self.entities.clone())
    }

    fn list_mention_locations(&self) -> Result<Vec<MentionRow>> {
        self.check_closed()?;
        self.count_bulk_query();
        Ok(self.mentions.clone())
    }

    fn list_rank0_geo_points(&self) -> Result<Vec<GeoPoint>> {
        self.check_closed()?;
        self.count_bulk_query();
        Ok(self.geo_points.clone())
    }

    fn list_document_entity_associations(&self) -> Result<Vec<AssociationRow>> {
        self.check_closed()?;
        self.count_bulk_query();
        Ok(self.associations.clone())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
