//! The windowed co-occurrence engine.

use ahash::{AHashMap, AHashSet};

use crate::corpus::{DocumentId, EntityId, MentionLocation};
use crate::proximity::DistanceMetric;
use crate::proximity::interval::IntervalSet;

/// Per-entity tallies produced by a proximity query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    /// Number of the entity's mentions that fell inside a window.
    pub mention_count: u32,

    /// Number of documents contributing at least one such mention.
    pub document_count: u32,
}

/// Stateless co-occurrence computation over a per-document mention index.
///
/// For every document the engine first builds the merged window set: one
/// closed interval `[position - distance, position + distance]` per mention
/// of a query entity, with overlapping and adjacent windows coalesced so a
/// position is counted once no matter how many query mentions cover it. It
/// then re-walks the document's mentions and tests candidates against that
/// set.
#[derive(Debug)]
pub struct ProximityEngine<'a> {
    mentions_by_document: &'a AHashMap<DocumentId, Vec<MentionLocation>>,
}

impl<'a> ProximityEngine<'a> {
    /// Create an engine over a per-document mention index.
    pub fn new(mentions_by_document: &'a AHashMap<DocumentId, Vec<MentionLocation>>) -> Self {
        ProximityEngine {
            mentions_by_document,
        }
    }

    /// The merged windows around query-entity mentions in one document.
    fn windows_for_document(
        &self,
        mentions: &[MentionLocation],
        query_entity_ids: &AHashSet<EntityId>,
        distance: u32,
        metric: DistanceMetric,
    ) -> IntervalSet {
        let distance = distance as i64;
        let mut windows = IntervalSet::new();
        for mention in mentions {
            let Some(entity_id) = mention.entity_id else {
                continue;
            };
            if query_entity_ids.contains(&entity_id) {
                let pos = metric.position(mention);
                windows.insert(pos - distance, pos + distance);
            }
        }
        windows
    }

    /// For each wanted entity, count its mentions falling within `distance`
    /// of a query-entity mention, over the given documents.
    ///
    /// Entities with no qualifying mention are absent from the result, never
    /// present with zero counts. Query and wanted sets may overlap;
    /// self-matches are intentional.
    pub fn entities_near_entities(
        &self,
        query_entity_ids: &[EntityId],
        wanted_entity_ids: &[EntityId],
        doc_ids: &[DocumentId],
        distance: u32,
        metric: DistanceMetric,
    ) -> AHashMap<EntityId, EntityCounts> {
        let query_set: AHashSet<EntityId> = query_entity_ids.iter().copied().collect();
        let wanted_set: AHashSet<EntityId> = wanted_entity_ids.iter().copied().collect();

        let mut counts: AHashMap<EntityId, EntityCounts> = AHashMap::new();

        for &doc_id in doc_ids {
            let Some(mentions) = self.mentions_by_document.get(&doc_id) else {
                continue;
            };
            let windows = self.windows_for_document(mentions, &query_set, distance, metric);
            if windows.is_empty() {
                // No query-entity mention in this document.
                continue;
            }

            // Tally qualifying mentions per entity within this document.
            let mut per_document: AHashMap<EntityId, u32> = AHashMap::new();
            for mention in mentions {
                let Some(entity_id) = mention.entity_id else {
                    continue;
                };
                if wanted_set.contains(&entity_id) && windows.contains(metric.position(mention)) {
                    *per_document.entry(entity_id).or_insert(0) += 1;
                }
            }

            // Fold this document's tallies into the running counts.
            for (entity_id, mention_count) in per_document {
                let entry = counts.entry(entity_id).or_default();
                entry.mention_count += mention_count;
                entry.document_count += 1;
            }
        }

        counts
    }

    /// The documents in which any mention of `wanted_entity_id` falls within
    /// `distance` of a query-entity mention.
    ///
    /// The scan of each document stops at its first qualifying mention.
    pub fn documents_for_entities_near_entity(
        &self,
        query_entity_ids: &[EntityId],
        wanted_entity_id: EntityId,
        doc_ids: &[DocumentId],
        distance: u32,
        metric: DistanceMetric,
    ) -> AHashSet<DocumentId> {
        let query_set: AHashSet<EntityId> = query_entity_ids.iter().copied().collect();

        let mut matching: AHashSet<DocumentId> = AHashSet::new();

        for &doc_id in doc_ids {
            let Some(mentions) = self.mentions_by_document.get(&doc_id) else {
                continue;
            };
            let windows = self.windows_for_document(mentions, &query_set, distance, metric);
            if windows.is_empty() {
                continue;
            }

            for mention in mentions {
                if mention.entity_id == Some(wanted_entity_id)
                    && windows.contains(metric.position(mention))
                {
                    matching.insert(doc_id);
                    // Once is enough. Skip to the next document.
                    break;
                }
            }
        }

        matching
    }
}
