//! Network graph projection: a switch with every visible host attached

use hv_core::{GraphEdge, GraphNode, Host, HostGraph, ROOT_NODE_ID};
use hv_data::GraphStyle;

/// Build the star graph for `hosts`.
///
/// Node `i` (1-based) is the host at position `i - 1`; node order follows the
/// input order, which fixes the rendered layout for a given list.
pub fn build_graph(hosts: &[Host], style: &GraphStyle) -> HostGraph {
    let mut nodes = Vec::with_capacity(hosts.len() + 1);
    let mut edges = Vec::with_capacity(hosts.len());

    nodes.push(GraphNode {
        id: ROOT_NODE_ID,
        label: style.root_label.clone(),
        color: style.root_color.clone(),
    });

    for (id, host) in (1..).zip(hosts) {
        nodes.push(GraphNode {
            id,
            label: host.name.clone(),
            color: style.color_for(host.liveness()).to_string(),
        });
        edges.push(GraphEdge { from: ROOT_NODE_ID, to: id });
    }

    HostGraph { nodes, edges }
}
