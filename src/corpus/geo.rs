//! Geographic points for location entities.

use serde::{Deserialize, Serialize};

use crate::corpus::EntityId;

/// A geocoded coordinate for a location entity.
///
/// Only the rank-0 point per entity, the highest-confidence candidate among
/// possibly several, is ever cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,

    /// Longitude in decimal degrees.
    pub longitude: f64,

    /// The location entity this point geocodes.
    pub location_entity_id: EntityId,
}

impl GeoPoint {
    /// Create a new geo point.
    pub fn new(latitude: f64, longitude: f64, location_entity_id: EntityId) -> Self {
        GeoPoint {
            latitude,
            longitude,
            location_entity_id,
        }
    }
}
