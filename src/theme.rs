use serde::{Deserialize, Serialize};

const CATEGORY20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

const TABLEAU10: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub link_color: String,
    pub link_opacity: f32,
    pub node_stroke_width: f32,
    pub background: String,
    pub palette: Vec<String>,
}

impl Theme {
    pub fn mermaid_default() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 12.0,
            text_color: "#333333".to_string(),
            link_color: "#000000".to_string(),
            link_opacity: 0.2,
            node_stroke_width: 1.0,
            background: "#FFFFFF".to_string(),
            palette: CATEGORY20.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            text_color: "#1C2430".to_string(),
            link_color: "#7A8AA6".to_string(),
            link_opacity: 0.35,
            node_stroke_width: 0.0,
            background: "#FFFFFF".to_string(),
            palette: TABLEAU10.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Ordinal color scale: keys take palette entries in first-seen order and
/// wrap around once the palette is exhausted.
#[derive(Debug, Clone)]
pub struct ColorScale<'a> {
    palette: &'a [String],
    seen: Vec<String>,
}

impl<'a> ColorScale<'a> {
    pub fn new(palette: &'a [String]) -> Self {
        Self {
            palette,
            seen: Vec::new(),
        }
    }

    pub fn color(&mut self, key: &str) -> &'a str {
        let idx = match self.seen.iter().position(|k| k == key) {
            Some(idx) => idx,
            None => {
                self.seen.push(key.to_string());
                self.seen.len() - 1
            }
        };
        let palette = self.palette;
        if palette.is_empty() {
            return "#000000";
        }
        &palette[idx % palette.len()]
    }
}

/// Darkens a `#rrggbb` (or `#rgb`) color by `0.7^k`. Unparsable input is
/// returned unchanged.
pub fn darker(color: &str, k: f64) -> String {
    let Some((r, g, b)) = parse_hex(color) else {
        return color.to_string();
    };
    let factor = 0.7f64.powf(k);
    let scale = |channel: u8| (channel as f64 * factor).floor().clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", scale(r), scale(g), scale(b))
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#').filter(|hex| hex.is_ascii())?;
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let mut channels = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some((channels.next()??, channels.next()??, channels.next()??))
        }
        _ => None,
    }
}
