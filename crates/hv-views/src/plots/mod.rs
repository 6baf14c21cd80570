//! Graph and map projections

pub mod geo;
pub mod network;

pub use geo::select_markers;
pub use network::build_graph;
