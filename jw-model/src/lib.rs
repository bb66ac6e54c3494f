//! Core domain types and wire formats for the JellyWatch monitoring client.
//!
//! Everything the server sends or the views display passes through the types
//! in this crate: monitoring zones, sensor readings, the knowledge-graph
//! node/edge set, analysis warning results, the login exchange, and the
//! common `{code, message, data}` response envelope. The crate also carries
//! the two pieces of pure domain logic every consumer shares: point-geometry
//! text parsing and the temperature/density alert predicates.

pub mod auth;
pub mod envelope;
pub mod geo;
pub mod graph;
pub mod reading;
pub mod warning;
pub mod zone;

pub use auth::{LoginRequest, LoginResponse};
pub use envelope::Envelope;
pub use geo::GeoPoint;
pub use graph::{GraphData, GraphEdge, GraphNode};
pub use reading::{sort_chronological, SensorReading, DENSITY_WARN_PER_M3, TEMPERATURE_WARN_C};
pub use warning::{WarningLevel, WarningResult};
pub use zone::MonitoringZone;
