//! Published state of the synchronization engine.

use jw_model::{MonitoringZone, SensorReading};

/// Engine lifecycle: idle, or polling exactly one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Running {
        zone_id: i64,
    },
}

/// Point-in-time view of everything the dashboard renders.
///
/// Snapshots are whole-value publications over a watch channel. Consumers
/// clone what they need; only the driver task mutates state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardSnapshot {
    pub phase: SyncPhase,
    pub zones: Vec<MonitoringZone>,
    /// Latest reading for the selected zone, or `None` when the last realtime
    /// batch carried no reading for it.
    pub latest: Option<SensorReading>,
    /// History for the selected zone, newest first as the server returns it.
    pub history: Vec<SensorReading>,
    /// A refresh cycle is in flight.
    pub loading: bool,
    /// Count of cycles whose results were actually applied.
    pub cycles_applied: u64,
}

impl DashboardSnapshot {
    pub fn selected_zone_id(&self) -> Option<i64> {
        match self.phase {
            SyncPhase::Running { zone_id } => Some(zone_id),
            SyncPhase::Idle => None,
        }
    }

    pub fn selected_zone(&self) -> Option<&MonitoringZone> {
        let id = self.selected_zone_id()?;
        self.zones.iter().find(|z| z.id == id)
    }

    /// Warning banner predicate, recomputed from the latest reading on every
    /// refresh. No reading means no warning.
    pub fn temperature_alert(&self) -> bool {
        self.latest.as_ref().is_some_and(SensorReading::temperature_alert)
    }
}

/// Initial selection policy: the preferred id when present among the fetched
/// zones, else the first zone, else nothing.
pub fn choose_zone(zones: &[MonitoringZone], preferred: Option<i64>) -> Option<i64> {
    if let Some(id) = preferred {
        if zones.iter().any(|z| z.id == id) {
            return Some(id);
        }
    }
    zones.first().map(|z| z.id)
}
