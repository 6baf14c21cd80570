//! Core data model for the host dashboard
//!
//! This crate provides the host record, the mutable view state and the
//! projection shapes shared by the data and view crates.

pub mod events;
pub mod host;
pub mod projection;
pub mod state;

// Re-export commonly used types
pub use events::{EventBus, Event, EventHandler, handler_from_fn};
pub use host::{Host, Liveness};
pub use projection::{GraphEdge, GraphNode, HostGraph, Marker, ROOT_NODE_ID};
pub use state::{ActiveView, SortDirection, SortKey, SortValue, StateParseError, ViewState};
