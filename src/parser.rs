use crate::ir::{GraphData, Row};
use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;

static INIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%%\{\s*init\s*:\s*(\{.*\})\s*\}%%").unwrap());
static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^sankey(-beta)?\s*$").unwrap());

#[derive(Debug, Default)]
pub struct ParseOutput {
    pub rows: Vec<Row>,
    pub init_config: Option<serde_json::Value>,
}

/// Parses `source,target,value` rows, optionally under a `sankey-beta` header.
pub fn parse_sankey(input: &str) -> Result<ParseOutput> {
    let (lines, init_config) = preprocess_input(input);
    let mut rows = Vec::new();

    for (line_no, line) in lines {
        if HEADER_RE.is_match(&line) {
            continue;
        }
        let parts = split_args(&line);
        if parts.len() != 3 {
            bail!(
                "line {line_no}: expected `source,target,value`, found {} field(s)",
                parts.len()
            );
        }
        let left = strip_quotes(&parts[0]);
        let right = strip_quotes(&parts[1]);
        if left.is_empty() || right.is_empty() {
            bail!("line {line_no}: source and target must not be empty");
        }
        let raw_value = strip_quotes(&parts[2]);
        let Ok(value) = raw_value.parse::<f64>() else {
            bail!("line {line_no}: `{raw_value}` is not a number");
        };
        rows.push(Row { left, right, value });
    }

    Ok(ParseOutput { rows, init_config })
}

/// Parses the JSON graph form `{"nodes": [...], "links": [...]}`; JSON5 is
/// accepted as a fallback.
pub fn parse_graph_json(input: &str) -> Result<GraphData> {
    match serde_json::from_str::<GraphData>(input) {
        Ok(data) => Ok(data),
        Err(json_err) => json5::from_str::<GraphData>(input)
            .map_err(|_| anyhow::anyhow!("invalid graph JSON: {json_err}")),
    }
}

fn preprocess_input(input: &str) -> (Vec<(usize, String)>, Option<serde_json::Value>) {
    let mut init_config: Option<serde_json::Value> = None;
    let mut lines = Vec::new();

    for (idx, raw_line) in input.lines().enumerate() {
        let trimmed_line = raw_line.trim();
        if trimmed_line.is_empty() {
            continue;
        }
        if let Some(caps) = INIT_RE.captures(trimmed_line) {
            if let Some(json_str) = caps.get(1).map(|m| m.as_str()) {
                if let Ok(value) = serde_json::from_str::<serde_json::Value>(json_str) {
                    init_config = Some(value);
                } else if let Ok(value) = json5::from_str::<serde_json::Value>(json_str) {
                    init_config = Some(value);
                }
            }
            continue;
        }
        if trimmed_line.starts_with("%%") {
            continue;
        }
        let without_comment = strip_trailing_comment(trimmed_line);
        if without_comment.is_empty() {
            continue;
        }
        lines.push((idx + 1, without_comment));
    }

    (lines, init_config)
}

fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in input.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            current.push(ch);
            continue;
        }
        if ch == ',' && !in_quotes {
            args.push(current.trim().to_string());
            current.clear();
            continue;
        }
        current.push(ch);
    }
    args.push(current.trim().to_string());
    args
}

fn strip_trailing_comment(line: &str) -> String {
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    let mut out = String::new();
    while let Some(ch) = chars.next() {
        if ch == '"' {
            in_quotes = !in_quotes;
            out.push(ch);
            continue;
        }
        if !in_quotes
            && ch == '%'
            && let Some('%') = chars.peek().copied()
        {
            break;
        }
        out.push(ch);
    }
    out.trim().to_string()
}

/// Removes surrounding double quotes; `""` inside a quoted field is a literal quote.
fn strip_quotes(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].replace("\"\"", "\"")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::NodeRef;

    #[test]
    fn parse_sankey_basic() {
        let input = "sankey-beta\n  A, B, 10\n  B, C, 5";
        let parsed = parse_sankey(input).unwrap();
        assert_eq!(
            parsed.rows,
            vec![Row::new("A", "B", 10.0), Row::new("B", "C", 5.0)]
        );
    }

    #[test]
    fn header_is_optional() {
        let parsed = parse_sankey("A,B,1.5\n").unwrap();
        assert_eq!(parsed.rows, vec![Row::new("A", "B", 1.5)]);
    }

    #[test]
    fn quoted_fields_keep_commas_and_quotes() {
        let input = "sankey\n\"Bio-conversion, solid\",\"Say \"\"hi\"\"\",4";
        let parsed = parse_sankey(input).unwrap();
        assert_eq!(parsed.rows[0].left, "Bio-conversion, solid");
        assert_eq!(parsed.rows[0].right, "Say \"hi\"");
    }

    #[test]
    fn comments_and_init_directive() {
        let input = "%%{init: {\"sankey\": {\"width\": 300}}}%%\nsankey-beta\n%% a comment\nA,B,2 %% trailing\n";
        let parsed = parse_sankey(input).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        let init = parsed.init_config.unwrap();
        assert_eq!(init["sankey"]["width"], 300);
    }

    #[test]
    fn init_directive_accepts_json5() {
        let parsed = parse_sankey("%%{init: {theme: 'modern'}}%%\nA,B,1").unwrap();
        assert_eq!(parsed.init_config.unwrap()["theme"], "modern");
    }

    #[test]
    fn bad_value_reports_line() {
        let err = parse_sankey("sankey-beta\nA,B,1\nA,C,lots").unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn wrong_field_count_is_an_error() {
        assert!(parse_sankey("A,B").is_err());
        assert!(parse_sankey("A,B,1,2").is_err());
    }

    #[test]
    fn graph_json_with_names_and_indices() {
        let input = r#"{"nodes":[{"name":"a"},{"name":"b"}],"links":[{"source":0,"target":"b","value":3}]}"#;
        let data = parse_graph_json(input).unwrap();
        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.links[0].target, NodeRef::Name("b".to_string()));
    }

    #[test]
    fn graph_json5_fallback() {
        let input = "{nodes: [{name: 'a'}, {name: 'b'}], links: [{source: 'a', target: 'b', value: 1,}]}";
        let data = parse_graph_json(input).unwrap();
        assert_eq!(data.links.len(), 1);
    }
}
