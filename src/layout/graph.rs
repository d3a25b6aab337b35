use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{LayoutError, Result};

/// How a link names one of its endpoints before the graph is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeRef {
    Index(usize),
    Name(String),
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Index(idx) => write!(f, "#{idx}"),
            NodeRef::Name(name) => write!(f, "\"{name}\""),
        }
    }
}

impl From<usize> for NodeRef {
    fn from(idx: usize) -> Self {
        NodeRef::Index(idx)
    }
}

impl From<&str> for NodeRef {
    fn from(name: &str) -> Self {
        NodeRef::Name(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub source: NodeRef,
    pub target: NodeRef,
    pub value: f64,
}

impl LinkSpec {
    pub fn new(source: impl Into<NodeRef>, target: impl Into<NodeRef>, value: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
        }
    }
}

/// A node record. Geometry fields are zero until a layout has run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub name: String,
    /// Discrete column index.
    pub layer: usize,
    pub x: f64,
    pub dx: f64,
    pub y: f64,
    pub dy: f64,
    pub value: f64,
    /// Outgoing link indices.
    pub source_links: Vec<usize>,
    /// Incoming link indices.
    pub target_links: Vec<usize>,
}

impl Node {
    pub fn center(&self) -> f64 {
        self.y + self.dy / 2.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub value: f64,
    pub dy: f64,
    /// Offset of this link within the source node's outgoing stack.
    pub sy: f64,
    /// Offset of this link within the target node's incoming stack.
    pub ty: f64,
}

/// Arena of nodes and links. Links address nodes by index and nodes address
/// their links by index, so nothing in the graph owns anything else.
///
/// Topology is fixed once built: adjacency and node values are derived in
/// [`SankeyGraph::new`], so callers only get read access.
#[derive(Debug, Clone, Default)]
pub struct SankeyGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) links: Vec<Link>,
}

impl SankeyGraph {
    /// Resolves link endpoints, builds adjacency in input order and computes
    /// node values. Nothing is returned unless every link validates.
    pub fn new(nodes: Vec<NodeSpec>, links: Vec<LinkSpec>) -> Result<Self> {
        let mut by_name: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
        for (idx, node) in nodes.iter().enumerate() {
            by_name.entry(node.name.as_str()).or_insert(idx);
        }
        let resolve = |link_idx: usize, reference: &NodeRef| -> Result<usize> {
            let resolved = match reference {
                NodeRef::Index(idx) => (*idx < nodes.len()).then_some(*idx),
                NodeRef::Name(name) => by_name.get(name.as_str()).copied(),
            };
            resolved.ok_or_else(|| LayoutError::InvalidReference {
                link: link_idx,
                reference: reference.clone(),
            })
        };

        let mut resolved_links = Vec::with_capacity(links.len());
        for (link_idx, spec) in links.iter().enumerate() {
            let source = resolve(link_idx, &spec.source)?;
            let target = resolve(link_idx, &spec.target)?;
            if !spec.value.is_finite() || spec.value < 0.0 {
                return Err(LayoutError::InvalidLinkValue {
                    link: link_idx,
                    value: spec.value,
                });
            }
            resolved_links.push(Link {
                source,
                target,
                value: spec.value,
                ..Link::default()
            });
        }

        let mut graph = SankeyGraph {
            nodes: nodes
                .into_iter()
                .map(|spec| Node {
                    name: spec.name,
                    ..Node::default()
                })
                .collect(),
            links: resolved_links,
        };
        graph.rebuild_adjacency();
        Ok(graph)
    }

    /// Builds a graph from node names and `(source, target, value)` index triples.
    pub fn from_indices<I, S, L>(names: I, links: L) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        L: IntoIterator<Item = (usize, usize, f64)>,
    {
        let nodes = names.into_iter().map(NodeSpec::new).collect();
        let links = links
            .into_iter()
            .map(|(source, target, value)| LinkSpec::new(source, target, value))
            .collect();
        Self::new(nodes, links)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// True when there is nothing to lay out.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() || self.links.is_empty()
    }

    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.name == name)
    }

    fn rebuild_adjacency(&mut self) {
        for node in &mut self.nodes {
            node.source_links.clear();
            node.target_links.clear();
        }
        for (link_idx, link) in self.links.iter().enumerate() {
            self.nodes[link.source].source_links.push(link_idx);
            self.nodes[link.target].target_links.push(link_idx);
        }
        let links = &self.links;
        for node in &mut self.nodes {
            let outgoing: f64 = node.source_links.iter().map(|&l| links[l].value).sum();
            let incoming: f64 = node.target_links.iter().map(|&l| links[l].value).sum();
            node.value = outgoing.max(incoming);
        }
    }
}
