//! Windowed co-occurrence query scenarios.

use kopis::cache::CorpusCache;
use kopis::corpus::{Document, Entity, EntityKind, EntityRecord};
use kopis::proximity::{DistanceMetric, EntityCounts};
use kopis::store::{MemoryBackingStore, MentionRow};
use tempfile::tempdir;

const DOC1: i32 = 1;
const DOC2: i32 = 2;
const ALICE: i32 = 100;
const BOB: i32 = 101;
const LEXINGTON: i32 = 102;

fn entity(kind: EntityKind, id: i32, text: &str) -> Entity {
    Entity::new(
        kind,
        EntityRecord {
            id,
            text: text.to_string(),
            num_mentions: 0,
            num_documents: 0,
            created_by: "pipeline1".to_string(),
        },
    )
}

fn mention(doc: i32, entity: i32, index: u32, start: i64) -> MentionRow {
    MentionRow {
        document_id: doc,
        entity_id: Some(entity),
        index,
        text_start: start,
        text_stop: start + 5,
        mention_type: "PERSON".to_string(),
    }
}

/// doc1: Alice at index 0, Bob at 1 and 3, Lexington at 4.
/// doc2: Alice at 0, Bob at 1.
/// Text offsets are index * 10.
fn fixture_cache() -> CorpusCache {
    let mut store = MemoryBackingStore::new();

    store.add_document(Document::new(DOC1, "doc1", "dir1/doc1"));
    store.add_document(Document::new(DOC2, "doc2", "dir1/doc2"));

    store.add_entity(entity(EntityKind::Person, ALICE, "Alice Ailey"));
    store.add_entity(entity(EntityKind::Person, BOB, "Bob"));
    store.add_entity(entity(EntityKind::Location, LEXINGTON, "Lexington"));

    store.add_mention(mention(DOC1, ALICE, 0, 0));
    store.add_mention(mention(DOC1, BOB, 1, 10));
    store.add_mention(mention(DOC1, BOB, 3, 30));
    store.add_mention(mention(DOC1, LEXINGTON, 4, 40));
    store.add_mention(mention(DOC2, ALICE, 0, 0));
    store.add_mention(mention(DOC2, BOB, 1, 10));

    store.add_association(DOC1, ALICE, 1);
    store.add_association(DOC1, BOB, 2);
    store.add_association(DOC1, LEXINGTON, 1);
    store.add_association(DOC2, ALICE, 1);
    store.add_association(DOC2, BOB, 1);

    let dir = tempdir().unwrap();
    CorpusCache::open(Box::new(store), dir.path()).unwrap()
}

#[test]
fn test_concrete_scenario_by_index() {
    let cache = fixture_cache();

    // Bob at index 1 is within [-1, 1] of Alice at 0; Bob at 3 and
    // Lexington at 4 are not.
    let counts = cache.entities_near_entities(
        &[ALICE],
        &[BOB, LEXINGTON],
        &[DOC1],
        1,
        DistanceMetric::MentionIndex,
    );
    assert_eq!(counts.len(), 1);
    assert_eq!(
        counts[&BOB],
        EntityCounts {
            mention_count: 1,
            document_count: 1
        }
    );
    // Zero-count entities are omitted, never present with zero.
    assert!(!counts.contains_key(&LEXINGTON));
}

#[test]
fn test_counts_accumulate_across_documents() {
    let cache = fixture_cache();

    let counts = cache.entities_near_entities(
        &[ALICE],
        &[BOB, LEXINGTON],
        &[DOC1, DOC2],
        1,
        DistanceMetric::MentionIndex,
    );
    assert_eq!(
        counts[&BOB],
        EntityCounts {
            mention_count: 2,
            document_count: 2
        }
    );
}

#[test]
fn test_widening_the_window_reaches_lexington() {
    let cache = fixture_cache();

    let counts = cache.entities_near_entities(
        &[ALICE],
        &[BOB, LEXINGTON],
        &[DOC1],
        4,
        DistanceMetric::MentionIndex,
    );
    assert_eq!(
        counts[&BOB],
        EntityCounts {
            mention_count: 2,
            document_count: 1
        }
    );
    assert_eq!(
        counts[&LEXINGTON],
        EntityCounts {
            mention_count: 1,
            document_count: 1
        }
    );
}

#[test]
fn test_query_mention_windows_merge() {
    let cache = fixture_cache();

    // Bob mentions at indices 1 and 3 produce windows [0, 2] and [2, 4]
    // which merge; Lexington at 4 is counted exactly once.
    let counts = cache.entities_near_entities(
        &[BOB],
        &[ALICE, LEXINGTON],
        &[DOC1],
        1,
        DistanceMetric::MentionIndex,
    );
    assert_eq!(
        counts[&ALICE],
        EntityCounts {
            mention_count: 1,
            document_count: 1
        }
    );
    assert_eq!(
        counts[&LEXINGTON],
        EntityCounts {
            mention_count: 1,
            document_count: 1
        }
    );
}

#[test]
fn test_distance_zero_matches_exact_position_only() {
    let cache = fixture_cache();

    let counts = cache.entities_near_entities(
        &[ALICE],
        &[BOB, LEXINGTON],
        &[DOC1, DOC2],
        0,
        DistanceMetric::MentionIndex,
    );
    assert!(counts.is_empty());

    // A query entity is trivially near its own mentions.
    let counts =
        cache.entities_near_entities(&[ALICE], &[ALICE], &[DOC1], 0, DistanceMetric::MentionIndex);
    assert_eq!(
        counts[&ALICE],
        EntityCounts {
            mention_count: 1,
            document_count: 1
        }
    );
}

#[test]
fn test_text_offset_metric() {
    let cache = fixture_cache();

    // Offsets: Alice 0, Bob 10 and 30, Lexington 40.
    let counts = cache.entities_near_entities(
        &[ALICE],
        &[BOB, LEXINGTON],
        &[DOC1],
        10,
        DistanceMetric::TextStart,
    );
    assert_eq!(counts.len(), 1);
    assert_eq!(
        counts[&BOB],
        EntityCounts {
            mention_count: 1,
            document_count: 1
        }
    );

    let counts = cache.entities_near_entities(
        &[ALICE],
        &[BOB, LEXINGTON],
        &[DOC1],
        9,
        DistanceMetric::TextStart,
    );
    assert!(counts.is_empty());
}

#[test]
fn test_documents_for_entities_near_entity() {
    let cache = fixture_cache();

    let docs = cache.documents_for_entities_near_entity(
        &[ALICE],
        BOB,
        &[DOC1, DOC2],
        1,
        DistanceMetric::MentionIndex,
    );
    assert_eq!(docs.len(), 2);

    let docs = cache.documents_for_entities_near_entity(
        &[ALICE],
        LEXINGTON,
        &[DOC1, DOC2],
        1,
        DistanceMetric::MentionIndex,
    );
    assert!(docs.is_empty());

    let docs = cache.documents_for_entities_near_entity(
        &[ALICE],
        LEXINGTON,
        &[DOC1, DOC2],
        4,
        DistanceMetric::MentionIndex,
    );
    assert_eq!(docs.len(), 1);
    assert!(docs.contains(&DOC1));
}

#[test]
fn test_many_qualifying_mentions_still_one_document_entry() {
    let mut store = MemoryBackingStore::new();
    store.add_document(Document::new(DOC1, "doc1", "dir1/doc1"));
    store.add_entity(entity(EntityKind::Person, ALICE, "Alice Ailey"));
    store.add_entity(entity(EntityKind::Person, BOB, "Bob"));

    store.add_mention(mention(DOC1, ALICE, 0, 0));
    for i in 1..=10 {
        store.add_mention(mention(DOC1, BOB, i, (i as i64) * 10));
    }
    store.add_association(DOC1, ALICE, 1);
    store.add_association(DOC1, BOB, 10);

    let dir = tempdir().unwrap();
    let cache = CorpusCache::open(Box::new(store), dir.path()).unwrap();

    let docs = cache.documents_for_entities_near_entity(
        &[ALICE],
        BOB,
        &[DOC1],
        20,
        DistanceMetric::MentionIndex,
    );
    assert_eq!(docs.len(), 1);
}

#[test]
fn test_document_without_query_mentions_yields_nothing() {
    let cache = fixture_cache();

    let counts = cache.entities_near_entities(
        &[LEXINGTON],
        &[ALICE, BOB],
        &[DOC2],
        100,
        DistanceMetric::MentionIndex,
    );
    assert!(counts.is_empty());
}
