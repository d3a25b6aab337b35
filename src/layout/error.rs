use super::graph::NodeRef;

/// Failures surfaced before any geometry is written to the graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("link {link} references a node that does not exist: {reference}")]
    InvalidReference { link: usize, reference: NodeRef },
    #[error("link {link} has an invalid flow value: {value}")]
    InvalidLinkValue { link: usize, value: f64 },
    #[error("layer {layer} has a total flow value of zero")]
    DegenerateLayer { layer: usize },
    #[error("graph contains a cycle reachable from node {node}")]
    CyclicGraph { node: usize },
    #[error("node index {node} is out of range")]
    UnknownNode { node: usize },
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, LayoutError>;
