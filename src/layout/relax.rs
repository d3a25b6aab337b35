use tracing::{debug, trace};

use super::collision::resolve_collisions;
use super::graph::SankeyGraph;
use crate::config::SankeyConfig;

const ALPHA_DECAY: f64 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    /// Pull toward the centers of outgoing-link targets.
    TowardTargets,
    /// Pull toward the centers of incoming-link sources.
    TowardSources,
}

/// Resolves collisions once, then runs `config.iterations` barycentric passes.
/// Each pass relaxes right-to-left on outgoing links, then left-to-right on
/// incoming links, resolving collisions after each sweep.
pub(super) fn relax(graph: &mut SankeyGraph, columns: &mut [Vec<usize>], config: &SankeyConfig) {
    resolve_all(graph, columns, config);

    let mut alpha = 1.0;
    for iteration in 0..config.iterations {
        alpha *= ALPHA_DECAY;
        for column in columns.iter().rev() {
            for &node_idx in column {
                relax_node(graph, node_idx, alpha, Sweep::TowardTargets);
            }
        }
        resolve_all(graph, columns, config);
        for column in columns.iter() {
            for &node_idx in column {
                relax_node(graph, node_idx, alpha, Sweep::TowardSources);
            }
        }
        resolve_all(graph, columns, config);
        trace!(iteration, alpha, "relaxation pass");
    }
    debug!(iterations = config.iterations, "relaxed node depths");
}

fn resolve_all(graph: &mut SankeyGraph, columns: &mut [Vec<usize>], config: &SankeyConfig) {
    for column in columns.iter_mut() {
        resolve_collisions(&mut graph.nodes, column, config.size[1], config.node_padding);
    }
}

fn relax_node(graph: &mut SankeyGraph, node_idx: usize, alpha: f64, sweep: Sweep) {
    let node = &graph.nodes[node_idx];
    let links = match sweep {
        Sweep::TowardTargets => &node.source_links,
        Sweep::TowardSources => &node.target_links,
    };
    let mut weighted = 0.0;
    let mut total = 0.0;
    for &link_idx in links {
        let link = &graph.links[link_idx];
        let other = match sweep {
            Sweep::TowardTargets => link.target,
            Sweep::TowardSources => link.source,
        };
        weighted += graph.nodes[other].center() * link.value;
        total += link.value;
    }
    if total <= 0.0 {
        return;
    }
    let shift = (weighted / total - node.center()) * alpha;
    graph.nodes[node_idx].y += shift;
}

/// Re-sorts every node's link lists by the position of the node at the other
/// end and restacks `sy`/`ty`. Touches nothing else.
pub(super) fn relayout(graph: &mut SankeyGraph) {
    let SankeyGraph { nodes, links } = graph;
    let ys: Vec<f64> = nodes.iter().map(|node| node.y).collect();
    for node in nodes.iter_mut() {
        node.source_links
            .sort_by(|&a, &b| ys[links[a].target].total_cmp(&ys[links[b].target]));
        node.target_links
            .sort_by(|&a, &b| ys[links[a].source].total_cmp(&ys[links[b].source]));

        let mut sy = 0.0;
        for &link_idx in &node.source_links {
            links[link_idx].sy = sy;
            sy += links[link_idx].dy;
        }
        let mut ty = 0.0;
        for &link_idx in &node.target_links {
            links[link_idx].ty = ty;
            ty += links[link_idx].dy;
        }
    }
}
