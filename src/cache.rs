//! The in-memory corpus cache.
//!
//! [`CorpusCache`] fronts a [`BackingStore`]: on open it loads five index
//! artifacts — documents, entities, the mention index with its type-code
//! table, rank-0 geo points and the document/entity association maps — each
//! from its snapshot when one is present and valid, otherwise from the
//! backing store with a save-back so the next open is warm. Once open, every
//! query is answered from memory; only the lazy document-text fetch goes
//! back to the store.
//!
//! The indices are never mutated after load, so a cache behind a shared
//! reference is safe to read concurrently. The one write path, the lazy text
//! slot, is guarded by a mutex held across the fetch so each document's text
//! is fetched at most once.
//!
//! # Example
//!
//! ```
//! use kopis::cache::CorpusCache;
//! use kopis::store::MemoryBackingStore;
//!
//! # fn main() -> kopis::error::Result<()> {
//! let store = MemoryBackingStore::new();
//! let dir = tempfile::tempdir().unwrap();
//! let mut cache = CorpusCache::open(Box::new(store), dir.path())?;
//! assert!(cache.documents().is_empty());
//! cache.close()?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use ahash::{AHashMap, AHashSet};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::corpus::{
    Document, DocumentId, Entity, EntityId, EntityKind, GeoPoint, MentionLocation, TypeCodeTable,
};
use crate::error::Result;
use crate::proximity::{DistanceMetric, EntityCounts, ProximityEngine};
use crate::store::backing::{AssociationRow, BackingStore, MentionRow};
use crate::store::snapshot::SnapshotStore;

/// Snapshot artifact names, one per index kind.
const DOCUMENTS_ARTIFACT: &str = "documents";
const ENTITIES_ARTIFACT: &str = "entities";
const MENTION_LOCATIONS_ARTIFACT: &str = "mention-locations";
const TYPE_CODES_ARTIFACT: &str = "type-codes";
const GEO_POINTS_ARTIFACT: &str = "geo-points";
const ASSOCIATIONS_ARTIFACT: &str = "doc-entity-assoc";

/// The three mutually consistent document/entity association maps.
///
/// Invariant: `e ∈ document_to_entities[d]` iff `d ∈ entity_to_documents[e]`,
/// and `entity_document_mention_counts[e][d]` exists for exactly those pairs.
/// All three are built from the same association rows in one pass and
/// persisted as a single artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssociationIndex {
    document_to_entities: AHashMap<DocumentId, AHashSet<EntityId>>,
    entity_to_documents: AHashMap<EntityId, AHashSet<DocumentId>>,
    entity_document_mention_counts: AHashMap<EntityId, AHashMap<DocumentId, u32>>,
}

impl AssociationIndex {
    /// Build the three maps from raw association rows.
    pub fn from_rows(rows: &[AssociationRow]) -> Self {
        let mut index = AssociationIndex::default();
        for row in rows {
            index
                .document_to_entities
                .entry(row.document_id)
                .or_default()
                .insert(row.entity_id);
            index
                .entity_to_documents
                .entry(row.entity_id)
                .or_default()
                .insert(row.document_id);
            index
                .entity_document_mention_counts
                .entry(row.entity_id)
                .or_default()
                .insert(row.document_id, row.mention_count);
        }
        index
    }

    /// The entities associated with a document.
    pub fn entities_for_document(&self, document_id: DocumentId) -> Option<&AHashSet<EntityId>> {
        self.document_to_entities.get(&document_id)
    }

    /// The documents associated with an entity.
    pub fn documents_for_entity(&self, entity_id: EntityId) -> Option<&AHashSet<DocumentId>> {
        self.entity_to_documents.get(&entity_id)
    }

    /// Per-document mention counts for an entity.
    pub fn mention_counts_for_entity(
        &self,
        entity_id: EntityId,
    ) -> Option<&AHashMap<DocumentId, u32>> {
        self.entity_document_mention_counts.get(&entity_id)
    }
}

/// An in-memory index-and-cache layer over a backing corpus store.
#[derive(Debug)]
pub struct CorpusCache {
    store: Box<dyn BackingStore>,
    documents: Vec<Document>,
    document_index: AHashMap<DocumentId, usize>,
    entities: Vec<Entity>,
    entity_index: AHashMap<EntityId, usize>,
    type_codes: TypeCodeTable,
    mentions_by_document: AHashMap<DocumentId, Vec<MentionLocation>>,
    geo_points: AHashMap<EntityId, GeoPoint>,
    associations: AssociationIndex,
    text_cache: Mutex<AHashMap<DocumentId, Arc<str>>>,
    closed: bool,
}

impl CorpusCache {
    /// Open the cache: load every index artifact from its snapshot under
    /// `directory`, falling back to the backing store (with a save-back)
    /// for whatever is missing or corrupt.
    ///
    /// A backing-store error is fatal; a snapshot error only costs the
    /// affected artifact its warm load.
    pub fn open<P: AsRef<Path>>(store: Box<dyn BackingStore>, directory: P) -> Result<Self> {
        let snapshots = SnapshotStore::new(directory)?;

        let documents = Self::fetch_or_build(&snapshots, DOCUMENTS_ARTIFACT, || {
            store.list_documents()
        })?;
        let document_index = documents
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id, i))
            .collect();

        let entities = Self::fetch_or_build(&snapshots, ENTITIES_ARTIFACT, || {
            store.list_entities()
        })?;
        let entity_index: AHashMap<EntityId, usize> = entities
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id(), i))
            .collect();

        let known_entities: AHashSet<EntityId> = entity_index.keys().copied().collect();
        let (mentions_by_document, type_codes) =
            Self::fetch_or_build_mention_index(&snapshots, store.as_ref(), &known_entities)?;

        let geo_points = Self::fetch_or_build(&snapshots, GEO_POINTS_ARTIFACT, || {
            let points = store.list_rank0_geo_points()?;
            Ok(points
                .into_iter()
                .map(|p| (p.location_entity_id, p))
                .collect::<AHashMap<EntityId, GeoPoint>>())
        })?;

        let associations = Self::fetch_or_build(&snapshots, ASSOCIATIONS_ARTIFACT, || {
            let rows = store.list_document_entity_associations()?;
            Ok(AssociationIndex::from_rows(&rows))
        })?;

        Ok(CorpusCache {
            store,
            documents,
            document_index,
            entities,
            entity_index,
            type_codes,
            mentions_by_document,
            geo_points,
            associations,
            text_cache: Mutex::new(AHashMap::new()),
            closed: false,
        })
    }

    /// Close the backing store connection. The in-memory indices stay usable
    /// until the cache is dropped; only the lazy text fetch needs the store.
    pub fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.store.close()?;
            self.closed = true;
        }
        Ok(())
    }

    // -- load protocol ------------------------------------------------------

    /// Load an artifact from its snapshot, or build it and save it back.
    fn fetch_or_build<T, F>(snapshots: &SnapshotStore, name: &str, build: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        let started = Instant::now();
        if let Some(value) = Self::snapshot_or_none::<T>(snapshots, name) {
            debug!(artifact = name, elapsed = ?started.elapsed(), "loaded from snapshot");
            return Ok(value);
        }

        let value = build()?;
        debug!(artifact = name, elapsed = ?started.elapsed(), "built from backing store");
        Self::save_artifact(snapshots, name, &value);
        Ok(value)
    }

    /// The mention index and its type-code table are a coupled pair: codes in
    /// the index are meaningless without the table that assigned them, so a
    /// miss or corruption on either side rebuilds both.
    fn fetch_or_build_mention_index(
        snapshots: &SnapshotStore,
        store: &dyn BackingStore,
        known_entities: &AHashSet<EntityId>,
    ) -> Result<(AHashMap<DocumentId, Vec<MentionLocation>>, TypeCodeTable)> {
        let started = Instant::now();
        let mentions = Self::snapshot_or_none::<AHashMap<DocumentId, Vec<MentionLocation>>>(
            snapshots,
            MENTION_LOCATIONS_ARTIFACT,
        );
        let codes = Self::snapshot_or_none::<TypeCodeTable>(snapshots, TYPE_CODES_ARTIFACT);
        if let (Some(mentions), Some(codes)) = (mentions, codes) {
            debug!(elapsed = ?started.elapsed(), "loaded mention index from snapshot");
            return Ok((mentions, codes));
        }

        let rows = store.list_mention_locations()?;
        let (index, table) = Self::build_mention_index(rows, known_entities);
        debug!(elapsed = ?started.elapsed(), "built mention index from backing store");
        Self::save_artifact(snapshots, MENTION_LOCATIONS_ARTIFACT, &index);
        Self::save_artifact(snapshots, TYPE_CODES_ARTIFACT, &table);
        Ok((index, table))
    }

    /// Load a snapshot artifact, mapping absence and corruption to `None`.
    fn snapshot_or_none<T: DeserializeOwned>(snapshots: &SnapshotStore, name: &str) -> Option<T> {
        match snapshots.load::<T>(name) {
            Ok(found) => found,
            Err(e) => {
                warn!(artifact = name, error = %e, "snapshot unreadable, rebuilding");
                None
            }
        }
    }

    /// Save an artifact back to the snapshot store. A failed save costs the
    /// next open its warm load but never fails this one.
    fn save_artifact<T: Serialize>(snapshots: &SnapshotStore, name: &str, value: &T) {
        if let Err(e) = snapshots.save(name, value) {
            warn!(artifact = name, error = %e, "failed to save snapshot");
        }
    }

    /// Group mention rows by document, interning type strings to codes.
    ///
    /// Two passes: the first counts mentions per document so the vectors are
    /// allocated at exactly the right size, the second fills them in. Rows
    /// naming an unknown entity are kept as unlinked; rows with a negative
    /// start offset are dropped. Both anomalies are logged, neither aborts
    /// the load.
    fn build_mention_index(
        rows: Vec<MentionRow>,
        known_entities: &AHashSet<EntityId>,
    ) -> (AHashMap<DocumentId, Vec<MentionLocation>>, TypeCodeTable) {
        let mut per_document_counts: AHashMap<DocumentId, usize> = AHashMap::new();
        for row in &rows {
            *per_document_counts.entry(row.document_id).or_insert(0) += 1;
        }

        let mut index: AHashMap<DocumentId, Vec<MentionLocation>> =
            AHashMap::with_capacity(per_document_counts.len());
        for (&document_id, &count) in &per_document_counts {
            index.insert(document_id, Vec::with_capacity(count));
        }

        let mut table = TypeCodeTable::new();
        for row in rows {
            if row.text_start < 0 {
                warn!(
                    document_id = row.document_id,
                    index = row.index,
                    text_start = row.text_start,
                    "mention has negative start offset, dropping"
                );
                continue;
            }
            let entity_id = match row.entity_id {
                Some(id) if known_entities.contains(&id) => Some(id),
                Some(id) => {
                    warn!(
                        document_id = row.document_id,
                        entity_id = id,
                        "mention references unknown entity, treating as unlinked"
                    );
                    None
                }
                None => None,
            };
            let type_code = table.code_for(&row.mention_type);
            index
                .entry(row.document_id)
                .or_default()
                .push(MentionLocation {
                    document_id: row.document_id,
                    entity_id,
                    index: row.index,
                    text_start: row.text_start as u32,
                    text_stop: row.text_stop.max(0) as u32,
                    type_code,
                });
        }

        (index, table)
    }

    // -- direct lookups -----------------------------------------------------

    /// All documents, in backing-store order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// All entities, in backing-store order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The document with the given id, if any.
    pub fn document_by_id(&self, document_id: DocumentId) -> Option<&Document> {
        self.document_index
            .get(&document_id)
            .map(|&i| &self.documents[i])
    }

    /// The entity with the given id, if any.
    pub fn entity_by_id(&self, entity_id: EntityId) -> Option<&Entity> {
        self.entity_index.get(&entity_id).map(|&i| &self.entities[i])
    }

    /// The documents with the given ids; ids with no match are skipped.
    pub fn documents_with_ids(&self, document_ids: &[DocumentId]) -> Vec<&Document> {
        document_ids
            .iter()
            .filter_map(|&id| self.document_by_id(id))
            .collect()
    }

    /// The entities with the given ids; ids with no match are skipped.
    pub fn entities_with_ids(&self, entity_ids: &[EntityId]) -> Vec<&Entity> {
        entity_ids
            .iter()
            .filter_map(|&id| self.entity_by_id(id))
            .collect()
    }

    /// All entities of one kind.
    pub fn entities_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.kind() == kind)
    }

    /// All person entities.
    pub fn person_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities_of_kind(EntityKind::Person)
    }

    /// All organization entities.
    pub fn organization_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities_of_kind(EntityKind::Organization)
    }

    /// All location entities.
    pub fn location_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities_of_kind(EntityKind::Location)
    }

    /// All date entities.
    pub fn date_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities_of_kind(EntityKind::Date)
    }

    /// The type-code table assigned while building the mention index.
    pub fn type_codes(&self) -> &TypeCodeTable {
        &self.type_codes
    }

    /// The rank-0 geo point for a location entity, if it was geocoded.
    pub fn geo_point_for(&self, entity_id: EntityId) -> Option<GeoPoint> {
        self.geo_points.get(&entity_id).copied()
    }

    /// The rank-0 geo points for the given location entities, in one-to-one
    /// correspondence with the input ids.
    pub fn top_geo_points_for(&self, entity_ids: &[EntityId]) -> Vec<Option<GeoPoint>> {
        entity_ids.iter().map(|&id| self.geo_point_for(id)).collect()
    }

    /// The full text of a document, fetched from the backing store on first
    /// access and retained. Returns `None` if the document has no text.
    pub fn document_text(&self, document_id: DocumentId) -> Result<Option<Arc<str>>> {
        let mut cache = self.text_cache.lock();
        if let Some(text) = cache.get(&document_id) {
            return Ok(Some(text.clone()));
        }
        // The lock is held across the round-trip so a document's text is
        // fetched at most once even under concurrent readers.
        match self.store.fetch_document_text(document_id)? {
            Some(text) => {
                let text: Arc<str> = text.into();
                cache.insert(document_id, text.clone());
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    /// The mention locations of a document, in ingestion order. Empty for an
    /// unknown document or one without mentions.
    pub fn mention_locations_for_document(&self, document_id: DocumentId) -> &[MentionLocation] {
        self.mentions_by_document
            .get(&document_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The mention locations of the given entities within one document.
    pub fn mention_locations_for_entities_in_document(
        &self,
        entity_ids: &[EntityId],
        document_id: DocumentId,
    ) -> Vec<MentionLocation> {
        let wanted: AHashSet<EntityId> = entity_ids.iter().copied().collect();
        self.mention_locations_for_document(document_id)
            .iter()
            .filter(|m| m.entity_id.is_some_and(|id| wanted.contains(&id)))
            .copied()
            .collect()
    }

    /// The document/entity association maps.
    pub fn associations(&self) -> &AssociationIndex {
        &self.associations
    }

    // -- set-algebra queries ------------------------------------------------

    /// The ids of every document mentioning all of the given entities,
    /// sorted. The empty entity set vacuously matches every document.
    ///
    /// Candidates are generated from the union of the entities' document
    /// sets, then filtered to those whose entity set is a superset of the
    /// query, so the whole corpus is never scanned.
    pub fn documents_with_all_entities(&self, entity_ids: &[EntityId]) -> Vec<DocumentId> {
        if entity_ids.is_empty() {
            let mut all = Document::ids(&self.documents);
            all.sort_unstable();
            return all;
        }

        let mut candidates: AHashSet<DocumentId> = AHashSet::new();
        for &entity_id in entity_ids {
            if let Some(doc_ids) = self.associations.documents_for_entity(entity_id) {
                candidates.extend(doc_ids.iter().copied());
            }
        }

        let mut matching: Vec<DocumentId> = candidates
            .into_iter()
            .filter(|&doc_id| {
                self.associations
                    .entities_for_document(doc_id)
                    .is_some_and(|entities| entity_ids.iter().all(|e| entities.contains(e)))
            })
            .collect();
        matching.sort_unstable();
        matching
    }

    /// The ids of every entity mentioned in any of the given documents.
    pub fn entity_ids_in_any_document(&self, doc_ids: &[DocumentId]) -> AHashSet<EntityId> {
        let mut entity_ids: AHashSet<EntityId> = AHashSet::new();
        for &doc_id in doc_ids {
            if let Some(ids) = self.associations.entities_for_document(doc_id) {
                entity_ids.extend(ids.iter().copied());
            }
        }
        entity_ids
    }

    /// For each given entity, the total number of its mentions across the
    /// given documents. Entities with no overlap map to 0.
    pub fn mention_counts(
        &self,
        entity_ids: &[EntityId],
        doc_ids: &[DocumentId],
    ) -> AHashMap<EntityId, u32> {
        let doc_set: AHashSet<DocumentId> = doc_ids.iter().copied().collect();
        let mut counts: AHashMap<EntityId, u32> = AHashMap::with_capacity(entity_ids.len());
        for &entity_id in entity_ids {
            let mut total = 0;
            if let Some(per_document) = self.associations.mention_counts_for_entity(entity_id) {
                for (doc_id, count) in per_document {
                    if doc_set.contains(doc_id) {
                        total += count;
                    }
                }
            }
            counts.insert(entity_id, total);
        }
        counts
    }

    /// For each given entity, the number of the given documents it appears
    /// in. Entities with no overlap map to 0.
    pub fn document_counts(
        &self,
        entity_ids: &[EntityId],
        doc_ids: &[DocumentId],
    ) -> AHashMap<EntityId, u32> {
        let doc_set: AHashSet<DocumentId> = doc_ids.iter().copied().collect();
        let mut counts: AHashMap<EntityId, u32> = AHashMap::with_capacity(entity_ids.len());
        for &entity_id in entity_ids {
            let overlap = match self.associations.documents_for_entity(entity_id) {
                Some(doc_ids) => doc_ids.iter().filter(|d| doc_set.contains(d)).count() as u32,
                None => 0,
            };
            counts.insert(entity_id, overlap);
        }
        counts
    }

    // -- proximity queries --------------------------------------------------

    /// For each wanted entity, count its mentions falling within `distance`
    /// of a query-entity mention, over the given documents. See
    /// [`ProximityEngine::entities_near_entities`].
    pub fn entities_near_entities(
        &self,
        query_entity_ids: &[EntityId],
        wanted_entity_ids: &[EntityId],
        doc_ids: &[DocumentId],
        distance: u32,
        metric: DistanceMetric,
    ) -> AHashMap<EntityId, EntityCounts> {
        ProximityEngine::new(&self.mentions_by_document).entities_near_entities(
            query_entity_ids,
            wanted_entity_ids,
            doc_ids,
            distance,
            metric,
        )
    }

    /// The documents in which a mention of `wanted_entity_id` falls within
    /// `distance` of a query-entity mention. See
    /// [`ProximityEngine::documents_for_entities_near_entity`].
    pub fn documents_for_entities_near_entity(
        &self,
        query_entity_ids: &[EntityId],
        wanted_entity_id: EntityId,
        doc_ids: &[DocumentId],
        distance: u32,
        metric: DistanceMetric,
    ) -> AHashSet<DocumentId> {
        ProximityEngine::new(&self.mentions_by_document).documents_for_entities_near_entity(
            query_entity_ids,
            wanted_entity_id,
            doc_ids,
            distance,
            metric,
        )
    }
}
