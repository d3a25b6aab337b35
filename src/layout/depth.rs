use tracing::debug;

use super::error::{LayoutError, Result};
use super::graph::SankeyGraph;
use crate::config::SankeyConfig;

/// Node indices per column, columns in ascending breadth, input order within
/// a column. Columns emptied by the sink pull stay in place as empty lists.
pub(super) fn group_by_layer(layers: &[usize], max_layer: usize) -> Vec<Vec<usize>> {
    let mut columns = vec![Vec::new(); max_layer + 1];
    for (node_idx, &layer) in layers.iter().enumerate() {
        columns[layer].push(node_idx);
    }
    columns
}

/// Value-to-pixel factor of the tightest column, so that no column overflows
/// the canvas once padding is accounted for. A column whose gaps alone exceed
/// the canvas height is rejected.
pub(super) fn scale_factor(
    graph: &SankeyGraph,
    columns: &[Vec<usize>],
    config: &SankeyConfig,
) -> Result<f64> {
    let height = config.size[1];
    let mut ky = f64::INFINITY;
    for (layer, column) in columns.iter().enumerate() {
        if column.is_empty() {
            continue;
        }
        let total: f64 = column.iter().map(|&idx| graph.nodes[idx].value).sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(LayoutError::DegenerateLayer { layer });
        }
        let available = height - config.node_padding * (column.len() - 1) as f64;
        if available < 0.0 {
            return Err(LayoutError::InvalidConfig {
                field: "nodePadding",
                reason: format!(
                    "{} gaps of {} in layer {layer} exceed the canvas height {height}",
                    column.len() - 1,
                    config.node_padding
                ),
            });
        }
        ky = ky.min(available / total);
    }
    if !ky.is_finite() {
        return Err(LayoutError::DegenerateLayer { layer: 0 });
    }
    debug!(ky, "computed depth scale");
    Ok(ky)
}

/// Stacks each column by rank and sizes nodes and links by `ky`.
pub(super) fn initialize_depths(graph: &mut SankeyGraph, columns: &[Vec<usize>], ky: f64) {
    for column in columns {
        for (rank, &node_idx) in column.iter().enumerate() {
            let node = &mut graph.nodes[node_idx];
            node.y = rank as f64;
            node.dy = node.value * ky;
        }
    }
    for link in &mut graph.links {
        link.dy = link.value * ky;
    }
}
