//! Shapes handed to the graph and map renderers

use serde::{Deserialize, Serialize};

/// Id of the synthetic root every host hangs off
pub const ROOT_NODE_ID: usize = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: usize,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: usize,
    pub to: usize,
}

/// Star topology: one root node plus one node and one edge per visible host
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HostGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl HostGraph {
    /// Number of host nodes, excluding the root
    pub fn host_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

/// A host pinned on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Position of the host in the full collection the marker was built from
    pub id: usize,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
}
