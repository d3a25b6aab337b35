use crate::config::ChartConfig;
#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::layout::{LinkPath, SankeyGraph};
use crate::theme::{ColorScale, Theme, darker};
use anyhow::Result;
use std::path::Path;

/// Renders a laid-out graph. Links go first, thickest at the bottom of the
/// paint order, then node rects and labels.
pub fn render_svg(
    graph: &SankeyGraph,
    link_path: &LinkPath,
    theme: &Theme,
    chart: &ChartConfig,
) -> String {
    let mut svg = String::new();
    let width = chart.width;
    let height = chart.height;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str(&format!(
        "<g transform=\"translate({},{})\">",
        chart.margin.left, chart.margin.top
    ));

    let paths = link_path.paths(graph);
    let mut link_order: Vec<usize> = (0..graph.links.len()).collect();
    link_order.sort_by(|&a, &b| graph.links[b].dy.total_cmp(&graph.links[a].dy));

    svg.push_str("<g class=\"links\">");
    for link_idx in link_order {
        let link = &graph.links[link_idx];
        let source = &graph.nodes[link.source];
        let target = &graph.nodes[link.target];
        let d = paths[link_idx].to_svg_path();
        let share = if source.value > 0.0 {
            link.value / source.value
        } else {
            0.0
        };
        svg.push_str(&format!(
            "<path class=\"link\" d=\"{d}\" fill=\"none\" stroke=\"{}\" stroke-opacity=\"{}\" stroke-width=\"{:.2}\">",
            theme.link_color,
            theme.link_opacity,
            link.dy.max(1.0)
        ));
        svg.push_str(&format!(
            "<title>{}</title></path>",
            escape_xml(&format!(
                "\"{}\" → \"{}\"\n{}{} ({})",
                source.name,
                target.name,
                format_value(link.value),
                chart.value_suffix,
                format_percent(share)
            ))
        ));
    }
    svg.push_str("</g>");

    let mut colors = ColorScale::new(&theme.palette);
    let frame_mid = chart.frame_width() / 2.0;
    svg.push_str("<g class=\"nodes\">");
    for node in &graph.nodes {
        let fill = colors.color(color_key(&node.name));
        let stroke = darker(fill, 2.0);
        svg.push_str(&format!(
            "<g class=\"node\" transform=\"translate({:.2},{:.2})\">",
            node.x, node.y
        ));
        svg.push_str(&format!(
            "<rect height=\"{:.2}\" width=\"{:.2}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{}\">",
            node.dy, node.dx, theme.node_stroke_width
        ));
        svg.push_str(&format!(
            "<title>{}</title></rect>",
            escape_xml(&format!(
                "\"{}\"\n{}{}",
                node.name,
                format_value(node.value),
                chart.value_suffix
            ))
        ));
        let (label_x, anchor) = if node.x < frame_mid {
            (6.0 + node.dx, "start")
        } else {
            (-6.0, "end")
        };
        svg.push_str(&format!(
            "<text x=\"{label_x:.2}\" y=\"{:.2}\" dy=\".35em\" text-anchor=\"{anchor}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            node.dy / 2.0,
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.text_color,
            escape_xml(&node.name)
        ));
        svg.push_str("</g>");
    }
    svg.push_str("</g>");

    svg.push_str("</g></svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

/// Nodes sharing a first word share a color.
fn color_key(name: &str) -> &str {
    name.split(' ').next().unwrap_or(name)
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
