//! Sankey layout: breadth layering, proportional depth sizing, barycentric
//! relaxation with collision resolution, and per-link stacking offsets.
//!
//! The engine keeps nothing but its [`SankeyConfig`]. Geometry is written
//! straight onto the caller's [`SankeyGraph`], and only once every validation
//! step has passed, so a failed call leaves the graph as it was.

mod breadth;
mod collision;
mod depth;
mod error;
mod graph;
mod link_path;
mod relax;

use tracing::{debug, debug_span};

use crate::config::SankeyConfig;

pub use collision::resolve_collisions;
pub use error::{LayoutError, Result};
pub use graph::{Link, LinkSpec, Node, NodeRef, NodeSpec, SankeyGraph};
pub use link_path::{CubicPath, DEFAULT_CURVATURE, LinkPath};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SankeyLayout {
    config: SankeyConfig,
}

impl SankeyLayout {
    pub fn new(config: SankeyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SankeyConfig {
        &self.config
    }

    /// Full layout: breadths, depths, relaxation, then link stacking.
    ///
    /// A graph without nodes or without links is left untouched.
    pub fn layout(&self, graph: &mut SankeyGraph) -> Result<()> {
        let _span = debug_span!(
            "sankey_layout",
            nodes = graph.nodes.len(),
            links = graph.links.len()
        )
        .entered();
        if graph.is_empty() {
            debug!("nothing to lay out");
            return Ok(());
        }

        let breadths = breadth::assign_layers(graph)?;
        let mut columns = depth::group_by_layer(&breadths.layers, breadths.max_layer);
        let ky = depth::scale_factor(graph, &columns, &self.config)?;

        breadths.apply(graph, self.config.size[0], self.config.node_width);
        depth::initialize_depths(graph, &columns, ky);
        relax::relax(graph, &mut columns, &self.config);
        relax::relayout(graph);
        Ok(())
    }

    /// Recomputes `sy`/`ty` after node positions changed. Idempotent.
    pub fn relayout(&self, graph: &mut SankeyGraph) {
        relax::relayout(graph);
    }

    /// Moves one node vertically, clamped to the canvas, and restacks links.
    pub fn set_node_position(&self, graph: &mut SankeyGraph, node: usize, y: f64) -> Result<()> {
        let height = self.config.size[1];
        let target = graph
            .nodes
            .get_mut(node)
            .ok_or(LayoutError::UnknownNode { node })?;
        let max_y = (height - target.dy).max(0.0);
        target.y = y.clamp(0.0, max_y);
        relax::relayout(graph);
        Ok(())
    }

    pub fn link_path(&self) -> LinkPath {
        LinkPath::new(self.config.curvature)
    }
}

/// One-shot convenience over [`SankeyLayout`].
pub fn compute_sankey_layout(graph: &mut SankeyGraph, config: &SankeyConfig) -> Result<()> {
    SankeyLayout::new(config.clone())?.layout(graph)
}
