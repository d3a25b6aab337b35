use serde::Serialize;

use super::graph::{Link, SankeyGraph};

pub const DEFAULT_CURVATURE: f64 = 0.5;

/// A cubic Bézier segment. Both control points share the y of the endpoint
/// they are closest to, which gives the usual horizontal S-shaped ribbon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CubicPath {
    pub start: (f64, f64),
    pub control1: (f64, f64),
    pub control2: (f64, f64),
    pub end: (f64, f64),
}

impl CubicPath {
    pub fn to_svg_path(&self) -> String {
        format!(
            "M{:.2},{:.2}C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
            self.start.0,
            self.start.1,
            self.control1.0,
            self.control1.1,
            self.control2.0,
            self.control2.1,
            self.end.0,
            self.end.1,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkPath {
    curvature: f64,
}

impl Default for LinkPath {
    fn default() -> Self {
        Self {
            curvature: DEFAULT_CURVATURE,
        }
    }
}

impl LinkPath {
    pub fn new(curvature: f64) -> Self {
        Self { curvature }
    }

    pub fn curvature(&self) -> f64 {
        self.curvature
    }

    /// Curve from the middle of the link's slot on the source's right edge to
    /// the middle of its slot on the target's left edge.
    pub fn path(&self, graph: &SankeyGraph, link: &Link) -> CubicPath {
        let source = &graph.nodes[link.source];
        let target = &graph.nodes[link.target];
        let x0 = source.x + source.dx;
        let x1 = target.x;
        let y0 = source.y + link.sy + link.dy / 2.0;
        let y1 = target.y + link.ty + link.dy / 2.0;
        let x2 = interpolate(x0, x1, self.curvature);
        let x3 = interpolate(x0, x1, 1.0 - self.curvature);
        CubicPath {
            start: (x0, y0),
            control1: (x2, y0),
            control2: (x3, y1),
            end: (x1, y1),
        }
    }

    pub fn paths(&self, graph: &SankeyGraph) -> Vec<CubicPath> {
        graph.links.iter().map(|link| self.path(graph, link)).collect()
    }
}

fn interpolate(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
