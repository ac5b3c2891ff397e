//! Windowed co-occurrence queries over the mention index.
//!
//! Given a small set of query entities and a distance threshold, a proximity
//! query finds every other entity (or document) whose mentions fall within
//! that distance of a query-entity mention. The distance is measured on one
//! of two [`MentionLocation`](crate::corpus::MentionLocation) fields,
//! selected by [`DistanceMetric`]: the mention's sequence index within its
//! document, or its character start offset.
//!
//! The engine is stateless: it borrows the per-document mention index owned
//! by the cache and walks it twice per document, once to build the merged
//! window set and once to test candidate mentions against it.

pub mod engine;
pub mod interval;

pub use engine::{EntityCounts, ProximityEngine};
pub use interval::IntervalSet;

use crate::corpus::MentionLocation;

/// Which mention field supplies "position" for distance computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    /// The 0-based mention sequence index within the document.
    MentionIndex,
    /// The character offset of the mention's start.
    TextStart,
}

impl DistanceMetric {
    /// The position of a mention under this metric.
    pub fn position(&self, mention: &MentionLocation) -> i64 {
        match self {
            DistanceMetric::MentionIndex => mention.index as i64,
            DistanceMetric::TextStart => mention.text_start as i64,
        }
    }
}
