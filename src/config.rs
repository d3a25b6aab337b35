use crate::layout::{DEFAULT_CURVATURE, LayoutError};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration, fixed before a layout runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SankeyConfig {
    pub node_width: f64,
    pub node_padding: f64,
    /// Canvas `[width, height]`.
    pub size: [f64; 2],
    pub iterations: usize,
    pub curvature: f64,
}

impl Default for SankeyConfig {
    fn default() -> Self {
        Self {
            node_width: 24.0,
            node_padding: 8.0,
            size: [960.0, 500.0],
            iterations: 32,
            curvature: DEFAULT_CURVATURE,
        }
    }
}

impl SankeyConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        let invalid = |field: &'static str, reason: String| LayoutError::InvalidConfig {
            field,
            reason,
        };
        if !self.node_width.is_finite() || self.node_width < 0.0 {
            return Err(invalid(
                "nodeWidth",
                format!("expected a non-negative number, got {}", self.node_width),
            ));
        }
        if !self.node_padding.is_finite() || self.node_padding < 0.0 {
            return Err(invalid(
                "nodePadding",
                format!("expected a non-negative number, got {}", self.node_padding),
            ));
        }
        let [width, height] = self.size;
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(invalid(
                "size",
                format!("expected a positive canvas, got {width}x{height}"),
            ));
        }
        if width <= self.node_width {
            return Err(invalid(
                "size",
                format!(
                    "canvas width {width} must exceed the node width {}",
                    self.node_width
                ),
            ));
        }
        if !(self.curvature > 0.0 && self.curvature < 1.0) {
            return Err(invalid(
                "curvature",
                format!("expected a value in (0, 1), got {}", self.curvature),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 6.0,
            right: 1.0,
            bottom: 6.0,
            left: 1.0,
        }
    }
}

/// Chart-level settings: the outer canvas plus the engine knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub node_width: f64,
    pub node_padding: f64,
    pub iterations: usize,
    pub curvature: f64,
    /// Appended to values in hover titles, e.g. `" answers"`.
    pub value_suffix: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 940.0,
            height: 500.0,
            margin: Margin::default(),
            node_width: 15.0,
            node_padding: 8.0,
            iterations: 1,
            curvature: DEFAULT_CURVATURE,
            value_suffix: String::new(),
        }
    }
}

impl ChartConfig {
    pub fn frame_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    pub fn frame_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }

    /// Engine configuration for the frame inside the margins.
    pub fn sankey_config(&self) -> SankeyConfig {
        SankeyConfig {
            node_width: self.node_width,
            node_padding: self.node_padding,
            size: [self.frame_width(), self.frame_height()],
            iterations: self.iterations,
            curvature: self.curvature,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 940.0,
            height: 500.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub chart: ChartConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::mermaid_default();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            chart: ChartConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    primary_text_color: Option<String>,
    line_color: Option<String>,
    background: Option<String>,
    link_opacity: Option<f32>,
    node_stroke_width: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SankeyConfigFile {
    width: Option<f64>,
    height: Option<f64>,
    margin: Option<Margin>,
    node_width: Option<f64>,
    node_padding: Option<f64>,
    iterations: Option<usize>,
    curvature: Option<f64>,
    value_suffix: Option<String>,
    palette: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    sankey: Option<SankeyConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = match serde_json::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(&contents)?,
    };
    apply_config_file(&mut config, parsed);
    Ok(config)
}

/// Applies a `%%{init: ...}%%` directive with the same rules as a config file.
pub fn merge_init_config(mut config: Config, init: serde_json::Value) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_value(init)?;
    apply_config_file(&mut config, parsed);
    Ok(config)
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) {
    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "base" || theme_name == "default" || theme_name == "mermaid" {
            config.theme = Theme::mermaid_default();
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color.or(vars.primary_text_color) {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.link_color = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
        if let Some(v) = vars.link_opacity {
            config.theme.link_opacity = v;
        }
        if let Some(v) = vars.node_stroke_width {
            config.theme.node_stroke_width = v;
        }
    }

    if let Some(sankey) = parsed.sankey {
        let chart = &mut config.chart;
        if let Some(v) = sankey.width {
            chart.width = v;
        }
        if let Some(v) = sankey.height {
            chart.height = v;
        }
        if let Some(v) = sankey.margin {
            chart.margin = v;
        }
        if let Some(v) = sankey.node_width {
            chart.node_width = v;
        }
        if let Some(v) = sankey.node_padding {
            chart.node_padding = v;
        }
        if let Some(v) = sankey.iterations {
            chart.iterations = v;
        }
        if let Some(v) = sankey.curvature {
            chart.curvature = v;
        }
        if let Some(v) = sankey.value_suffix {
            chart.value_suffix = v;
        }
        if let Some(v) = sankey.palette.filter(|palette| !palette.is_empty()) {
            config.theme.palette = v;
        }
        config.render.width = chart.width as f32;
        config.render.height = chart.height as f32;
    }
}
