use crate::layout::{CubicPath, LinkPath, SankeyGraph};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub name: String,
    pub layer: usize,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub source: usize,
    pub target: usize,
    pub value: f64,
    pub dy: f64,
    pub sy: f64,
    pub ty: f64,
    pub curve: CubicPath,
    pub path: String,
}

impl LayoutDump {
    pub fn from_graph(graph: &SankeyGraph, link_path: &LinkPath, size: [f64; 2]) -> Self {
        let nodes = graph
            .nodes
            .iter()
            .map(|node| NodeDump {
                name: node.name.clone(),
                layer: node.layer,
                x: node.x,
                y: node.y,
                dx: node.dx,
                dy: node.dy,
                value: node.value,
            })
            .collect();

        let links = graph
            .links
            .iter()
            .zip(link_path.paths(graph))
            .map(|(link, curve)| LinkDump {
                source: link.source,
                target: link.target,
                value: link.value,
                dy: link.dy,
                sy: link.sy,
                ty: link.ty,
                path: curve.to_svg_path(),
                curve,
            })
            .collect();

        LayoutDump {
            width: size[0],
            height: size[1],
            nodes,
            links,
        }
    }
}

pub fn write_layout_dump(path: &Path, dump: &LayoutDump) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, dump)?;
    Ok(())
}
