use tracing::debug;

use super::error::{LayoutError, Result};
use super::graph::SankeyGraph;

/// Column assignment computed ahead of any write to the graph.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Breadths {
    pub layers: Vec<usize>,
    pub max_layer: usize,
}

impl Breadths {
    pub fn apply(&self, graph: &mut SankeyGraph, width: f64, node_width: f64) {
        let kx = if self.max_layer == 0 {
            0.0
        } else {
            (width - node_width) / self.max_layer as f64
        };
        for (node, &layer) in graph.nodes.iter_mut().zip(&self.layers) {
            node.layer = layer;
            node.x = layer as f64 * kx;
            node.dx = node_width;
        }
    }
}

/// Forward frontier sweep: every node starts on the frontier, each pass stamps
/// the pass index onto the frontier and moves on to the frontier's targets, so
/// a node ends up one column right of its deepest predecessor. Sinks are then
/// pulled into the last column.
pub(super) fn assign_layers(graph: &SankeyGraph) -> Result<Breadths> {
    let node_count = graph.nodes.len();
    let mut layers = vec![0usize; node_count];
    let mut queued_on = vec![usize::MAX; node_count];
    let mut frontier: Vec<usize> = (0..node_count).collect();
    let mut pass = 0usize;

    while !frontier.is_empty() {
        // An acyclic graph has no path longer than node_count - 1 links.
        if pass >= node_count {
            return Err(LayoutError::CyclicGraph { node: frontier[0] });
        }
        let mut next = Vec::new();
        for &node_idx in &frontier {
            layers[node_idx] = pass;
            for &link_idx in &graph.nodes[node_idx].source_links {
                let target = graph.links[link_idx].target;
                if queued_on[target] != pass {
                    queued_on[target] = pass;
                    next.push(target);
                }
            }
        }
        frontier = next;
        pass += 1;
    }

    let max_layer = pass.saturating_sub(1);
    for (node_idx, node) in graph.nodes.iter().enumerate() {
        if node.source_links.is_empty() {
            layers[node_idx] = max_layer;
        }
    }
    debug!(nodes = node_count, max_layer, "assigned node breadths");
    Ok(Breadths { layers, max_layer })
}
