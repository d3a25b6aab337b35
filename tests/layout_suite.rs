use std::path::Path;

use sankey_rs::config::{Config, merge_init_config};
use sankey_rs::{
    GraphData, GraphMode, LayoutDump, LayoutError, SankeyConfig, SankeyGraph, SankeyLayout,
    compute_sankey_layout, layout_graph, parse_graph_json, parse_sankey, render_svg,
};

const EPS: f64 = 1e-6;

fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> (GraphData, Config) {
    let input = std::fs::read_to_string(fixture_path(name)).expect("fixture read failed");
    if name.ends_with(".json") {
        return (parse_graph_json(&input).expect("parse failed"), Config::default());
    }
    let parsed = parse_sankey(&input).expect("parse failed");
    let mut config = Config::default();
    if let Some(init) = parsed.init_config {
        config = merge_init_config(config, init).expect("init directive failed");
    }
    (GraphData::from_rows(&parsed.rows, GraphMode::Flow), config)
}

fn assert_layout_invariants(graph: &SankeyGraph, config: &SankeyConfig, fixture: &str) {
    let [width, height] = config.size;

    for (idx, link) in graph.links().iter().enumerate() {
        let (source, target) = (&graph.nodes()[link.source], &graph.nodes()[link.target]);
        assert!(
            source.x < target.x,
            "{fixture}: link {idx} does not flow rightwards"
        );
    }

    for node in graph.nodes() {
        let incoming: f64 = node.target_links.iter().map(|&l| graph.links()[l].value).sum();
        let outgoing: f64 = node.source_links.iter().map(|&l| graph.links()[l].value).sum();
        assert!(
            (node.value - incoming.max(outgoing)).abs() < EPS,
            "{fixture}: {} value is not conserved",
            node.name
        );
        assert!(node.x >= -EPS && node.x + node.dx <= width + EPS);
        assert!(
            node.y >= -EPS && node.y + node.dy <= height + EPS,
            "{fixture}: {} leaves the canvas (y={}, dy={})",
            node.name,
            node.y,
            node.dy
        );

        let mut expected_sy = 0.0;
        for &l in &node.source_links {
            assert!((graph.links()[l].sy - expected_sy).abs() < EPS);
            expected_sy += graph.links()[l].dy;
        }
        let mut expected_ty = 0.0;
        for &l in &node.target_links {
            assert!((graph.links()[l].ty - expected_ty).abs() < EPS);
            expected_ty += graph.links()[l].dy;
        }
        assert!(expected_sy <= node.dy + EPS && expected_ty <= node.dy + EPS);

        // Where inflow and outflow values balance, so do the stacked extents.
        let balanced = !node.source_links.is_empty()
            && !node.target_links.is_empty()
            && (incoming - outgoing).abs() <= 1e-9 * incoming.max(outgoing);
        if balanced {
            let scale = expected_ty.max(expected_sy).max(1.0);
            assert!(
                (expected_ty - expected_sy).abs() <= EPS * scale,
                "{fixture}: {} takes in {expected_ty} but sends out {expected_sy}",
                node.name
            );
        }
    }

    let max_layer = graph.nodes().iter().map(|n| n.layer).max().unwrap_or(0);
    for layer in 0..=max_layer {
        let mut column: Vec<_> = graph.nodes().iter().filter(|n| n.layer == layer).collect();
        column.sort_by(|a, b| a.y.total_cmp(&b.y));
        for pair in column.windows(2) {
            assert!(
                pair[0].y + pair[0].dy + config.node_padding <= pair[1].y + EPS,
                "{fixture}: {} overlaps {}",
                pair[0].name,
                pair[1].name
            );
        }
    }
}

#[test]
fn layout_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let fixtures = ["energy.csv", "quoted.csv", "budget.json"];

    for fixture in fixtures {
        let (data, config) = load_fixture(fixture);
        let graph = data.into_graph().expect("graph build failed");
        let (graph, engine) = layout_graph(graph, &config.chart).expect("layout failed");
        assert_layout_invariants(&graph, engine.config(), fixture);

        let svg = render_svg(&graph, &engine.link_path(), &config.theme, &config.chart);
        assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
        assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
        assert_eq!(
            svg.matches("class=\"link\"").count(),
            graph.links().len(),
            "{fixture}: link count"
        );
    }
}

#[test]
fn energy_flows_layers() {
    let (data, config) = load_fixture("energy.csv");
    let (graph, _) = layout_graph(data.into_graph().unwrap(), &config.chart).unwrap();
    let layer_of = |name: &str| graph.nodes()[graph.node_index(name).unwrap()].layer;

    assert_eq!(layer_of("Agricultural waste"), 0);
    assert_eq!(layer_of("Bio-conversion"), 1);
    assert_eq!(layer_of("Solid"), 2);
    assert_eq!(layer_of("Thermal generation"), 3);
    assert_eq!(layer_of("Electricity grid"), 4);
    // Sinks are pulled to the last column.
    let last = graph.nodes().iter().map(|n| n.layer).max().unwrap();
    assert_eq!(layer_of("Losses"), last);
    assert_eq!(layer_of("Transport"), last);
}

#[test]
fn init_directive_shapes_the_chart() {
    let (data, config) = load_fixture("quoted.csv");
    assert_eq!(config.chart.width, 600.0);
    assert_eq!(config.chart.value_suffix, " TWh");
    assert!(data.nodes.iter().any(|n| n.name == "Industry, heavy"));

    let (graph, engine) = layout_graph(data.into_graph().unwrap(), &config.chart).unwrap();
    let right = graph.nodes().iter().map(|n| n.x + n.dx).fold(0.0, f64::max);
    assert!((right - engine.config().size[0]).abs() < EPS);
    let svg = render_svg(&graph, &engine.link_path(), &config.theme, &config.chart);
    assert!(svg.contains(" TWh"));
}

#[test]
fn aggregation_scenario() {
    let parsed = parse_sankey("sankey-beta\nA,B,3\nA,B,2\nA,C,5").unwrap();
    let graph = GraphData::from_rows(&parsed.rows, GraphMode::Flow)
        .into_graph()
        .unwrap();
    let names: Vec<_> = graph.nodes().iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, ["A", "B", "C"]);
    assert_eq!(graph.links().len(), 2);
    assert_eq!((graph.links()[0].target, graph.links()[0].value), (1, 5.0));
    assert_eq!((graph.links()[1].target, graph.links()[1].value), (2, 5.0));
}

#[test]
fn two_layer_scenario() {
    let mut graph = SankeyGraph::from_indices(["A", "B"], [(0, 1, 10.0)]).unwrap();
    let config = SankeyConfig {
        size: [200.0, 100.0],
        node_padding: 8.0,
        ..SankeyConfig::default()
    };
    compute_sankey_layout(&mut graph, &config).unwrap();
    let (a, b) = (&graph.nodes()[0], &graph.nodes()[1]);
    assert_eq!(a.x, 0.0);
    assert!(b.x > a.x);
    assert!((a.dy - b.dy).abs() < EPS);
    assert!((a.dy - graph.links()[0].dy).abs() < EPS);
    assert_layout_invariants(&graph, &config, "two-layer");
}

#[test]
fn trivial_scenario() {
    let mut graph = SankeyGraph::from_indices(["only"], Vec::new()).unwrap();
    compute_sankey_layout(&mut graph, &SankeyConfig::default()).unwrap();
    assert_eq!(graph.nodes()[0].value, 0.0);
    assert_eq!(graph.nodes()[0].x, 0.0);
    assert!(graph.links().is_empty());
}

#[test]
fn degenerate_scenario() {
    let mut graph = SankeyGraph::from_indices(["a", "b"], [(0, 1, 0.0)]).unwrap();
    let before = graph.clone();
    let err = compute_sankey_layout(&mut graph, &SankeyConfig::default()).unwrap_err();
    assert!(matches!(err, LayoutError::DegenerateLayer { layer: 0 }));
    assert_eq!(graph.nodes(), before.nodes());
}

#[test]
fn cycle_is_rejected() {
    let parsed = parse_sankey("A,B,1\nB,C,1\nC,A,1").unwrap();
    let mut graph = GraphData::from_rows(&parsed.rows, GraphMode::Flow)
        .into_graph()
        .unwrap();
    let err = compute_sankey_layout(&mut graph, &SankeyConfig::default()).unwrap_err();
    assert!(matches!(err, LayoutError::CyclicGraph { .. }));
}

#[test]
fn rows_mode_breaks_cycles() {
    let parsed = parse_sankey("A,B,1\nB,A,1").unwrap();
    let graph = GraphData::from_rows(&parsed.rows, GraphMode::Rows)
        .into_graph()
        .unwrap();
    let (graph, engine) = layout_graph(graph, &Config::default().chart).unwrap();
    assert_eq!(graph.nodes().len(), 4);
    assert_layout_invariants(&graph, engine.config(), "rows");
}

#[test]
fn relayout_and_drag_keep_invariants() {
    let (data, config) = load_fixture("energy.csv");
    let (mut graph, engine) = layout_graph(data.into_graph().unwrap(), &config.chart).unwrap();

    let snapshot = graph.clone();
    engine.relayout(&mut graph);
    assert_eq!(graph.links(), snapshot.links());
    assert_eq!(graph.nodes(), snapshot.nodes());

    let solar = graph.node_index("Solar").unwrap();
    engine.set_node_position(&mut graph, solar, -50.0).unwrap();
    assert_eq!(graph.nodes()[solar].y, 0.0);
    engine.set_node_position(&mut graph, solar, 1e9).unwrap();
    let height = engine.config().size[1];
    assert!((graph.nodes()[solar].y + graph.nodes()[solar].dy - height).abs() < EPS);

    let missing = graph.nodes().len();
    let err = engine
        .set_node_position(&mut graph, missing, 0.0)
        .unwrap_err();
    assert!(matches!(err, LayoutError::UnknownNode { .. }));
}

#[test]
fn layout_dump_matches_graph() {
    let (data, config) = load_fixture("budget.json");
    let (graph, engine) = layout_graph(data.into_graph().unwrap(), &config.chart).unwrap();
    let dump = LayoutDump::from_graph(&graph, &engine.link_path(), engine.config().size);
    assert_eq!(dump.nodes.len(), 6);
    assert_eq!(dump.links.len(), 5);
    let in_dy: f64 = dump.links.iter().filter(|l| l.target == 2).map(|l| l.dy).sum();
    let out_dy: f64 = dump.links.iter().filter(|l| l.source == 2).map(|l| l.dy).sum();
    assert!(in_dy > 0.0);
    assert!((in_dy - out_dy).abs() <= EPS * in_dy);

    let budget = &dump.nodes[2];
    assert_eq!(budget.name, "Budget");
    assert_eq!(budget.value, 4600.0);
    assert_eq!(budget.layer, 1);

    let json = serde_json::to_string(&dump).unwrap();
    let back: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(back["links"][0]["path"], dump.links[0].path.as_str());
}

#[test]
fn engine_rejects_bad_config() {
    let err = SankeyLayout::new(SankeyConfig {
        size: [10.0, 100.0],
        node_width: 24.0,
        ..SankeyConfig::default()
    })
    .unwrap_err();
    assert!(matches!(err, LayoutError::InvalidConfig { .. }));
}
