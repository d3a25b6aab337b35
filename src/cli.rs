use crate::config::{Config, load_config, merge_init_config};
use crate::ir::{GraphData, GraphMode};
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::parser::{parse_graph_json, parse_sankey};
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::{render_svg, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sankey", version, about = "Sankey diagram layout and renderer")]
pub struct Args {
    /// Input file (.csv, .mmd, .md or .json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (themeVariables and sankey sections)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Chart width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Chart height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Relaxation passes
    #[arg(long = "iterations")]
    pub iterations: Option<usize>,

    /// How rows become nodes
    #[arg(long = "mode", value_enum, default_value = "flow")]
    pub mode: GraphMode,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Json => "json",
        }
    }
}

enum InputKind {
    Rows,
    Markdown,
    Json,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut base_config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        base_config.chart.width = width;
        base_config.render.width = width as f32;
    }
    if let Some(height) = args.height {
        base_config.chart.height = height;
        base_config.render.height = height as f32;
    }
    if let Some(iterations) = args.iterations {
        base_config.chart.iterations = iterations;
    }

    let (input, kind) = read_input(args.input.as_deref())?;
    let diagrams = match kind {
        InputKind::Markdown => extract_sankey_blocks(&input),
        InputKind::Rows | InputKind::Json => vec![input],
    };

    if diagrams.is_empty() {
        return Err(anyhow::anyhow!("No sankey diagrams found in input"));
    }

    let outputs = if diagrams.len() == 1 {
        vec![args.output.clone()]
    } else {
        resolve_multi_outputs(args.output.as_deref(), args.output_format, diagrams.len())?
            .into_iter()
            .map(Some)
            .collect()
    };

    for (diagram, output) in diagrams.iter().zip(outputs) {
        let (data, config) = match kind {
            InputKind::Json => (parse_graph_json(diagram)?, base_config.clone()),
            InputKind::Rows | InputKind::Markdown => {
                let parsed = parse_sankey(diagram)?;
                let mut config = base_config.clone();
                if let Some(init_cfg) = parsed.init_config {
                    config = merge_init_config(config, init_cfg)?;
                }
                (GraphData::from_rows(&parsed.rows, args.mode), config)
            }
        };
        debug!(
            nodes = data.nodes.len(),
            links = data.links.len(),
            "parsed diagram"
        );
        emit(data, &config, args.output_format, output.as_deref())?;
    }

    Ok(())
}

fn emit(
    data: GraphData,
    config: &Config,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let (graph, engine) = crate::layout_graph(data.into_graph()?, &config.chart)?;
    match format {
        OutputFormat::Svg => {
            let svg = render_svg(&graph, &engine.link_path(), &config.theme, &config.chart);
            write_output_svg(&svg, output)?;
        }
        OutputFormat::Png => {
            let output = ensure_output(output, "png")?;
            let svg = render_svg(&graph, &engine.link_path(), &config.theme, &config.chart);
            write_png(&svg, output, config)?;
        }
        OutputFormat::Json => {
            let dump = LayoutDump::from_graph(&graph, &engine.link_path(), engine.config().size);
            match output {
                Some(path) => write_layout_dump(path, &dump)?,
                None => println!("{}", serde_json::to_string_pretty(&dump)?),
            }
        }
    }
    if let Some(path) = output {
        info!(path = %path.display(), "wrote output");
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    write_output_png(svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the `png` feature"
    ))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<(String, InputKind)> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        let content = std::fs::read_to_string(path)?;
        let kind = match path.extension().and_then(|e| e.to_str()) {
            Some("md" | "markdown") => InputKind::Markdown,
            Some("json" | "json5") => InputKind::Json,
            _ => InputKind::Rows,
        };
        return Ok((content, kind));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok((buf, InputKind::Rows))
}

fn ensure_output<'a>(output: Option<&'a Path>, ext: &str) -> Result<&'a Path> {
    output.ok_or_else(|| anyhow::anyhow!("Output path required for {} output", ext))
}

/// Mermaid fenced blocks whose first line declares a sankey diagram.
fn extract_sankey_blocks(input: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut in_block = false;
    let mut current: Vec<&str> = Vec::new();
    let mut fence = String::new();

    for line in input.lines() {
        let trimmed = line.trim();
        if !in_block {
            if let Some(start_fence) = detect_mermaid_fence(trimmed) {
                in_block = true;
                fence = start_fence;
            }
            continue;
        }
        if is_fence_end(trimmed, &fence) {
            in_block = false;
            let is_sankey = current
                .iter()
                .map(|l| l.trim())
                .find(|l| !l.is_empty() && !l.starts_with("%%"))
                .is_some_and(|l| l.to_ascii_lowercase().starts_with("sankey"));
            if is_sankey {
                blocks.push(current.join("\n"));
            }
            current.clear();
            continue;
        }
        current.push(line);
    }

    blocks
}

fn detect_mermaid_fence(line: &str) -> Option<String> {
    for fence in ["```", "~~~", ":::"] {
        if let Some(rest) = line.strip_prefix(fence) {
            let marker = fence.chars().next().unwrap_or('`');
            if rest.trim_start_matches(marker).trim().starts_with("mermaid") {
                return Some(fence.to_string());
            }
        }
    }
    None
}

fn is_fence_end(line: &str, fence: &str) -> bool {
    if !line.starts_with(fence) {
        return false;
    }
    line[fence.len()..].trim().is_empty()
}

fn resolve_multi_outputs(
    output: Option<&Path>,
    format: OutputFormat,
    count: usize,
) -> Result<Vec<PathBuf>> {
    let ext = format.extension();
    let base = output.ok_or_else(|| anyhow::anyhow!("Output path required for markdown input"))?;
    if base.is_dir() {
        let mut outputs = Vec::new();
        for idx in 0..count {
            outputs.push(base.join(format!("sankey-{}.{}", idx + 1, ext)));
        }
        return Ok(outputs);
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("sankey");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    let mut outputs = Vec::new();
    for idx in 0..count {
        outputs.push(parent.join(format!("{}-{}.{}", stem, idx + 1, ext)));
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_only_sankey_blocks() {
        let input = r#"
text
``` mermaid
sankey-beta
  A,B,1
```
more
~~~mermaid
flowchart TD
  X --> Y
~~~
::: mermaid
%% energy
sankey
  C,D,2
:::
"#;
        let blocks = extract_sankey_blocks(input);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("A,B,1"));
        assert!(blocks[1].contains("C,D,2"));
    }

    #[test]
    fn multi_outputs_are_numbered() {
        let outputs =
            resolve_multi_outputs(Some(Path::new("out/chart.svg")), OutputFormat::Svg, 2).unwrap();
        assert_eq!(
            outputs,
            vec![
                PathBuf::from("out/chart-1.svg"),
                PathBuf::from("out/chart-2.svg")
            ]
        );
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from([
            "sankey",
            "-i",
            "flows.csv",
            "-e",
            "json",
            "--mode",
            "rows",
            "--iterations",
            "8",
        ])
        .unwrap();
        assert!(matches!(args.output_format, OutputFormat::Json));
        assert_eq!(args.mode, GraphMode::Rows);
        assert_eq!(args.iterations, Some(8));
    }
}
