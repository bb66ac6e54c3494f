use serde::{Deserialize, Serialize};

use crate::geo::{self, GeoPoint};

/// A monitored marine area or buoy location.
///
/// Zones are read-only snapshots fetched from the server; the collection is
/// always refreshed wholesale, never patched. The optional `geometry` field
/// holds point-geometry text (`POINT(<lon> <lat>)`); the server has emitted
/// it under several spellings over time, so deserialization accepts
/// `geometry`, `wkt`, and `geom`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct MonitoringZone {
    pub id: i64,
    pub name: String,
    pub zone_type: String,
    #[serde(default, alias = "wkt", alias = "geom")]
    pub geometry: Option<String>,
}

impl MonitoringZone {
    /// Parsed map coordinate for this zone, if the geometry text is present
    /// and well-formed. Zones without a usable location are simply not
    /// plottable; that is a data-quality state, not an error.
    pub fn location(&self) -> Option<GeoPoint> {
        geo::parse_point_text(self.geometry.as_deref()?)
    }
}
