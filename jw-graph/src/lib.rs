//! Layout and presentation geometry for the ecological knowledge graph.
//!
//! The server hands us a directed labeled multigraph of species, environment
//! factors, and consequences. This crate turns it into something drawable:
//!
//! - a force-directed layout (pairwise repulsion, spring attraction along
//!   edges, a weak centering pull) with a deterministic circular seed,
//! - node category classification and the fixed category palette,
//! - edge-label placement at the geometric midpoint, rotated to stay upright,
//! - a focus camera for the click-to-zoom interaction.
//!
//! Everything here is pure geometry; rendering belongs to the caller.

pub mod camera;
pub mod category;
pub mod label;
pub mod layout;

pub use camera::{Camera, FOCUS_ZOOM};
pub use category::NodeCategory;
pub use label::{label_placement, LabelPlacement};
pub use layout::{ForceLayout, Point};
