//! Zone-scoped data synchronization for the monitoring dashboard.
//!
//! The dashboard shows one selected monitoring zone at a time: its latest
//! sensor reading, its recent history, and a temperature warning banner. This
//! crate owns the refresh contract for that view:
//!
//! - the zone list is fetched once per activation and the initial zone picked
//!   by a fixed policy (preferred id if present, else the first zone),
//! - realtime readings for all zones and history for the selected zone are
//!   fetched concurrently on a fixed interval,
//! - switching zones cancels the pending timer, refreshes immediately, then
//!   re-arms; at most one timer exists per engine,
//! - late results from a superseded cycle are never applied,
//! - a failed cycle leaves previously displayed data untouched.
//!
//! The engine runs as a single driver task behind [`ZoneSyncHandle`] and
//! publishes [`DashboardSnapshot`]s over a watch channel.

pub mod engine;
pub mod snapshot;
pub mod source;

pub use engine::{SyncConfig, ZoneSyncHandle, DEFAULT_ZONE_ID, REFRESH_INTERVAL};
pub use snapshot::{choose_zone, DashboardSnapshot, SyncPhase};
pub use source::MonitorSource;
