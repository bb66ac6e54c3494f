//! Data-source abstraction consumed by the synchronization engine.

use std::future::Future;
use std::sync::Arc;

use jw_model::{MonitoringZone, SensorReading};

/// Read side of the monitoring API as the engine sees it.
///
/// The engine never builds requests itself; it asks the source for the zone
/// list, the latest readings across all zones, and the history of one zone.
/// `jw-client` implements this over HTTP; tests implement it in memory.
///
/// Futures are `Send` because refresh cycles run as spawned subtasks.
pub trait MonitorSource: Send + Sync + 'static {
    fn fetch_zones(&self) -> impl Future<Output = anyhow::Result<Vec<MonitoringZone>>> + Send;

    fn fetch_realtime(&self) -> impl Future<Output = anyhow::Result<Vec<SensorReading>>> + Send;

    fn fetch_history(
        &self,
        zone_id: i64,
    ) -> impl Future<Output = anyhow::Result<Vec<SensorReading>>> + Send;
}

impl<S: MonitorSource> MonitorSource for Arc<S> {
    fn fetch_zones(&self) -> impl Future<Output = anyhow::Result<Vec<MonitoringZone>>> + Send {
        (**self).fetch_zones()
    }

    fn fetch_realtime(&self) -> impl Future<Output = anyhow::Result<Vec<SensorReading>>> + Send {
        (**self).fetch_realtime()
    }

    fn fetch_history(
        &self,
        zone_id: i64,
    ) -> impl Future<Output = anyhow::Result<Vec<SensorReading>>> + Send {
        (**self).fetch_history(zone_id)
    }
}
