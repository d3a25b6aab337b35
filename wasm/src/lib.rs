use sankey_rs::{GraphMode, LayoutDump, RenderOptions, layout_with_options, render_svg};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SankeyRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    width: Option<f64>,
    height: Option<f64>,
    iterations: Option<usize>,
    mode: Option<GraphMode>,
}

fn build_render_options(options: SankeyRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::mermaid_default()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if let Some(width) = options.width {
        render_options.chart.width = width;
    }
    if let Some(height) = options.height {
        render_options.chart.height = height;
    }
    if let Some(iterations) = options.iterations {
        render_options.chart.iterations = iterations;
    }
    if let Some(mode) = options.mode {
        render_options.mode = mode;
    }

    render_options
}

fn parse_options(options_json: Option<String>) -> Result<RenderOptions, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<SankeyRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        SankeyRenderOptions::default()
    };
    Ok(build_render_options(options))
}

#[wasm_bindgen]
pub fn render_sankey_svg(code: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    let (graph, engine) =
        layout_with_options(code, &options).map_err(|error| JsValue::from_str(&error.to_string()))?;
    Ok(render_svg(
        &graph,
        &engine.link_path(),
        &options.theme,
        &options.chart,
    ))
}

/// Returns the computed node and link geometry as JSON.
#[wasm_bindgen]
pub fn layout_sankey_json(code: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    let (graph, engine) =
        layout_with_options(code, &options).map_err(|error| JsValue::from_str(&error.to_string()))?;
    let dump = LayoutDump::from_graph(&graph, &engine.link_path(), engine.config().size);
    serde_json::to_string(&dump).map_err(|error| JsValue::from_str(&error.to_string()))
}
