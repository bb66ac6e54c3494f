use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Water temperature above this value (strictly greater) flips the dashboard
/// into its warning state. 25.0 itself is normal.
pub const TEMPERATURE_WARN_C: f64 = 25.0;

/// Jellyfish density above this value (strictly greater) is highlighted as
/// dangerous on the dashboard stat tiles.
pub const DENSITY_WARN_PER_M3: f64 = 5.0;

/// A single sensor snapshot for one zone.
///
/// The realtime endpoint returns the most recent reading per zone across all
/// zones; the history endpoint returns readings for one zone ordered
/// newest-first.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(default)]
    pub id: Option<i64>,
    pub zone_id: i64,
    pub record_time: NaiveDateTime,
    pub temperature: f64,
    pub salinity: f64,
    pub current_speed: f64,
    pub chlorophyll: f64,
    pub dissolved_oxygen: f64,
    pub jellyfish_density: f64,
}

impl SensorReading {
    /// True when the temperature exceeds [`TEMPERATURE_WARN_C`].
    /// Recomputed on every refresh, never cached across zones.
    pub fn temperature_alert(&self) -> bool {
        self.temperature > TEMPERATURE_WARN_C
    }

    /// True when jellyfish density exceeds [`DENSITY_WARN_PER_M3`].
    pub fn density_alert(&self) -> bool {
        self.jellyfish_density > DENSITY_WARN_PER_M3
    }
}

/// Select, from a realtime batch covering all zones, the single reading for
/// `zone_id`. `None` means the batch had no reading for that zone; the
/// display state is then "unknown", not an error.
pub fn latest_for_zone(readings: &[SensorReading], zone_id: i64) -> Option<&SensorReading> {
    readings.iter().find(|r| r.zone_id == zone_id)
}

/// Sort a history sequence oldest-first in place.
///
/// The server returns history newest-first; trend charts want time running
/// left to right.
pub fn sort_chronological(readings: &mut [SensorReading]) {
    readings.sort_by_key(|r| r.record_time);
}
