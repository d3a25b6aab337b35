use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::layout::{LayoutError, LinkSpec, NodeSpec, SankeyGraph};

/// One `left, right, weight` record from tabular input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub left: String,
    pub right: String,
    pub value: f64,
}

impl Row {
    pub fn new(left: impl Into<String>, right: impl Into<String>, value: f64) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            value,
        }
    }
}

/// How rows become nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum GraphMode {
    /// Left and right labels are separate nodes: a two-column chart.
    Rows,
    /// A label is one node wherever it appears, allowing multi-stage flows.
    #[default]
    Flow,
}

/// Caller-facing graph description, also the JSON input format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<NodeSpec>,
    pub links: Vec<LinkSpec>,
}

impl GraphData {
    pub fn from_rows(rows: &[Row], mode: GraphMode) -> Self {
        match mode {
            GraphMode::Rows => convert_rows(rows),
            GraphMode::Flow => link_rows(rows),
        }
    }

    pub fn into_graph(self) -> Result<SankeyGraph, LayoutError> {
        SankeyGraph::new(self.nodes, self.links)
    }
}

/// Sums weights of repeated `(left, right)` pairs, keeping first-seen order.
fn aggregate_pairs(rows: &[Row]) -> Vec<(&str, &str, f64)> {
    let mut pairs: Vec<(&str, &str, f64)> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    for row in rows {
        let key = (row.left.as_str(), row.right.as_str());
        match index.get(&key) {
            Some(&idx) => pairs[idx].2 += row.value,
            None => {
                index.insert(key, pairs.len());
                pairs.push((key.0, key.1, row.value));
            }
        }
    }
    pairs
}

#[derive(Debug, Default)]
struct NodeTable {
    nodes: Vec<NodeSpec>,
    index: HashMap<(u8, String), usize>,
}

impl NodeTable {
    fn index_of(&mut self, side: u8, label: &str) -> usize {
        if let Some(&idx) = self.index.get(&(side, label.to_string())) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(NodeSpec::new(label));
        self.index.insert((side, label.to_string()), idx);
        idx
    }
}

/// Two-column aggregation: duplicate pairs are merged and their weights
/// summed; left and right labels are distinct nodes even when the text
/// matches. Node indices follow first appearance.
pub fn convert_rows(rows: &[Row]) -> GraphData {
    let mut table = NodeTable::default();
    let mut links = Vec::new();
    for (left, right, value) in aggregate_pairs(rows) {
        let source = table.index_of(1, left);
        let target = table.index_of(2, right);
        links.push(LinkSpec::new(source, target, value));
    }
    GraphData {
        nodes: table.nodes,
        links,
    }
}

/// Same aggregation, but a label names a single node on either side.
pub fn link_rows(rows: &[Row]) -> GraphData {
    let mut table = NodeTable::default();
    let mut links = Vec::new();
    for (left, right, value) in aggregate_pairs(rows) {
        let source = table.index_of(0, left);
        let target = table.index_of(0, right);
        links.push(LinkSpec::new(source, target, value));
    }
    GraphData {
        nodes: table.nodes,
        links,
    }
}
