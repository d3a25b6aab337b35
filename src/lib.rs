#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{ChartConfig, Config, Margin, SankeyConfig};
pub use ir::{GraphData, GraphMode, Row, convert_rows, link_rows};
pub use layout::{
    CubicPath, LayoutError, Link, LinkPath, LinkSpec, Node, NodeRef, NodeSpec, SankeyGraph,
    SankeyLayout, compute_sankey_layout,
};
pub use layout_dump::LayoutDump;
pub use parser::{parse_graph_json, parse_sankey};
pub use render::render_svg;
pub use theme::Theme;

/// Everything needed to go from source text to an SVG in one call.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub chart: ChartConfig,
    pub mode: GraphMode,
}

impl RenderOptions {
    pub fn mermaid_default() -> Self {
        Self {
            theme: Theme::mermaid_default(),
            chart: ChartConfig::default(),
            mode: GraphMode::default(),
        }
    }

    pub fn modern() -> Self {
        Self {
            theme: Theme::modern(),
            ..Self::mermaid_default()
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::mermaid_default()
    }
}

/// Parses rows, lays them out and returns the graph with the engine used.
pub fn layout_with_options(
    input: &str,
    options: &RenderOptions,
) -> anyhow::Result<(SankeyGraph, SankeyLayout)> {
    let parsed = parse_sankey(input)?;
    let graph = GraphData::from_rows(&parsed.rows, options.mode).into_graph()?;
    layout_graph(graph, &options.chart)
}

/// Lays out an already-built graph with the engine derived from `chart`.
pub fn layout_graph(
    mut graph: SankeyGraph,
    chart: &ChartConfig,
) -> anyhow::Result<(SankeyGraph, SankeyLayout)> {
    let engine = SankeyLayout::new(chart.sankey_config())?;
    engine.layout(&mut graph)?;
    Ok((graph, engine))
}

pub fn render_with_options(input: &str, options: RenderOptions) -> anyhow::Result<String> {
    let (graph, engine) = layout_with_options(input, &options)?;
    Ok(render_svg(
        &graph,
        &engine.link_path(),
        &options.theme,
        &options.chart,
    ))
}
