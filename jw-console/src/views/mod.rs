pub mod analysis;
pub mod dashboard;
pub mod graph;
pub mod login;
pub mod map;
