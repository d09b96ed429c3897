//! End-to-end balancing: project text -> recipes -> graph -> solve -> chart.

use std::collections::{HashMap, HashSet};

use approx::assert_relative_eq;
use gtflow_core::graph::{EdgeKey, NodeId};
use gtflow_core::recipe::IoDirection;
use gtflow_core::render::to_dot;
use gtflow_core::{balance, build_graph, dsl, FlowConfig, FlowError, FlowGraph, GameData, Summary};

fn load(project: &str, config: &FlowConfig) -> FlowGraph {
    let data = GameData::builtin().unwrap();
    let recipes = dsl::load_project(project, config).unwrap();
    build_graph(recipes, config, &data).unwrap()
}

fn solve(project: &str, config: &FlowConfig) -> (FlowGraph, Summary) {
    let data = GameData::builtin().unwrap();
    let mut graph = load(project, config);
    let summary = balance(&mut graph, config, &data).unwrap();
    (graph, summary)
}

/// Edges as (from machine or pseudo-node, to, ingredient).
fn edge_names(graph: &FlowGraph) -> HashSet<(String, String, String)> {
    let name = |node: NodeId| match graph.recipe(node) {
        Some(recipe) => recipe.machine.clone(),
        None => node.to_string(),
    };
    graph
        .edges()
        .iter()
        .map(|e| (name(e.key.from), name(e.key.to), e.key.ingredient.clone()))
        .collect()
}

fn expected(edges: &[(&str, &str, &str)]) -> HashSet<(String, String, String)> {
    edges
        .iter()
        .map(|(a, b, c)| (a.to_string(), b.to_string(), c.to_string()))
        .collect()
}

fn flow(graph: &FlowGraph, from: NodeId, to: NodeId, ingredient: &str) -> f64 {
    graph
        .edge(&EdgeKey::new(from, to, ingredient))
        .map(|e| e.quantity)
        .unwrap()
}

/// Total solved flow of an ingredient on one side of a machine.
fn side_total(graph: &FlowGraph, node: NodeId, dir: IoDirection, ingredient: &str) -> f64 {
    let adjacency = graph.adjacency();
    adjacency
        .edges(node, dir)
        .iter()
        .filter(|k| k.ingredient == ingredient)
        .map(|k| graph.quantity(k))
        .sum()
}

fn is_acyclic(graph: &FlowGraph) -> bool {
    let mut successors: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for edge in graph.edges() {
        successors.entry(edge.key.from).or_default().push(edge.key.to);
    }
    // Kahn's algorithm over the node set touched by edges
    let mut indegree: HashMap<NodeId, usize> = HashMap::new();
    for edge in graph.edges() {
        indegree.entry(edge.key.from).or_default();
        *indegree.entry(edge.key.to).or_default() += 1;
    }
    let mut ready: Vec<NodeId> = indegree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(n, _)| *n)
        .collect();
    let mut visited = 0;
    while let Some(node) = ready.pop() {
        visited += 1;
        for next in successors.get(&node).into_iter().flatten() {
            if let Some(d) = indegree.get_mut(next) {
                *d -= 1;
                if *d == 0 {
                    ready.push(*next);
                }
            }
        }
    }
    visited == indegree.len()
}

const SUGAR: &str = r#"
.recipe extractor tier=lv eut=2 dur=100 number=2
in "sugar beet" 8
out sugar 32

.recipe electrolyzer tier=lv eut=2 dur=640
in sugar 32
out "carbon dust" 2
out oxygen 5000
out water 5000
"#;

const SULFURIC: &str = r#"
.recipe lcr tier=lv eut=30 dur=160 number=1
in "acetic acid" 1000
in "sulfuric acid" 1000
out ethenone 1000
out "diluted sulfuric acid" 1000

.recipe "distillation tower" tier=lv eut=30 dur=400
in "diluted sulfuric acid" 1000
out "sulfuric acid" 500
out water 500
"#;

#[test]
fn test_simple_project_edges() {
    let graph = load(SUGAR, &FlowConfig::default());
    assert_eq!(
        edge_names(&graph),
        expected(&[
            ("source", "extractor", "sugar beet"),
            ("extractor", "electrolyzer", "sugar"),
            ("electrolyzer", "sink", "carbon dust"),
            ("electrolyzer", "sink", "oxygen"),
            ("electrolyzer", "sink", "water"),
        ])
    );
}

#[test]
fn test_cycle_is_broken() {
    let graph = load(SULFURIC, &FlowConfig::default());
    assert_eq!(
        edge_names(&graph),
        expected(&[
            ("source", "large chemical reactor", "acetic acid"),
            ("source", "large chemical reactor", "sulfuric acid"),
            ("large chemical reactor", "distillation tower", "diluted sulfuric acid"),
            ("large chemical reactor", "sink", "ethenone"),
            ("distillation tower", "sink", "sulfuric acid"),
            ("distillation tower", "sink", "water"),
        ])
    );
    assert!(is_acyclic(&graph));
}

#[test]
fn test_cycle_project_balances() {
    let (graph, _) = solve(SULFURIC, &FlowConfig::default());
    let (lcr, tower) = (NodeId::Recipe(0), NodeId::Recipe(1));
    // one reactor makes 1000 L every 8 s
    assert_relative_eq!(flow(&graph, lcr, tower, "diluted sulfuric acid"), 125.0, max_relative = 1e-9);
    assert_relative_eq!(flow(&graph, tower, NodeId::Sink, "sulfuric acid"), 62.5, max_relative = 1e-9);
    assert_relative_eq!(graph.recipe(tower).unwrap().multiplier().unwrap(), 2.5, max_relative = 1e-9);
}

#[test]
fn test_anchor_and_ratios() {
    let (graph, summary) = solve(SUGAR, &FlowConfig::default());
    let (extractor, electrolyzer) = (NodeId::Recipe(0), NodeId::Recipe(1));

    // number anchor is met exactly
    assert_relative_eq!(graph.recipe(extractor).unwrap().multiplier().unwrap(), 2.0, max_relative = 1e-9);
    assert_relative_eq!(graph.recipe(electrolyzer).unwrap().multiplier().unwrap(), 12.8, max_relative = 1e-9);

    // solved flows keep the declared ratios of every recipe
    let oxygen = flow(&graph, electrolyzer, NodeId::Sink, "oxygen");
    let carbon = flow(&graph, electrolyzer, NodeId::Sink, "carbon dust");
    let sugar = flow(&graph, extractor, electrolyzer, "sugar");
    assert_relative_eq!(oxygen / carbon, 2500.0, max_relative = 1e-9);
    assert_relative_eq!(sugar / oxygen, 32.0 / 5000.0, max_relative = 1e-9);

    // 2 EU/t * 2 extractors + 2 EU/t * 12.8 electrolyzers
    assert_relative_eq!(summary.input_eut, -30.0);
    assert_relative_eq!(summary.machine_count, 14.8, max_relative = 1e-9);
    let consumed: Vec<&str> = summary.rows.iter().filter(|r| r.quantity < 0.0).map(|r| r.id.as_str()).collect();
    assert_eq!(consumed, vec!["sugar_beet"]);
}

#[test]
fn test_target_anchor() {
    let project = r#"
.recipe mixer tier=lv eut=2 dur=20
in a 1
out b 2

.recipe centrifuge tier=lv eut=2 dur=20
in b 4
out c 1
target c 5
"#;
    let (graph, _) = solve(project, &FlowConfig::default());
    assert_relative_eq!(flow(&graph, NodeId::Recipe(1), NodeId::Sink, "c"), 5.0, max_relative = 1e-9);
    assert_relative_eq!(graph.recipe(NodeId::Recipe(0)).unwrap().multiplier().unwrap(), 10.0, max_relative = 1e-9);
}

#[test]
fn test_split_and_merge_conserve_flow() {
    let project = r#"
.recipe mixer tier=lv eut=2 dur=20
in a 1
out b 1

.recipe centrifuge tier=lv eut=2 dur=20 number=1
in b 1
out c 1

.recipe macerator tier=lv eut=2 dur=20 number=1
in b 2
out c 1

.recipe compressor tier=lv eut=2 dur=20
in c 1
out d 1
"#;
    let (graph, _) = solve(project, &FlowConfig::default());
    let producers_b = side_total(&graph, NodeId::Recipe(0), IoDirection::Output, "b");
    let consumers_b = side_total(&graph, NodeId::Recipe(1), IoDirection::Input, "b")
        + side_total(&graph, NodeId::Recipe(2), IoDirection::Input, "b");
    assert_relative_eq!(producers_b, consumers_b, max_relative = 1e-9);
    assert_relative_eq!(producers_b, 3.0, max_relative = 1e-9);

    let producers_c = side_total(&graph, NodeId::Recipe(1), IoDirection::Output, "c")
        + side_total(&graph, NodeId::Recipe(2), IoDirection::Output, "c");
    let consumers_c = side_total(&graph, NodeId::Recipe(3), IoDirection::Input, "c");
    assert_relative_eq!(producers_c, consumers_c, max_relative = 1e-9);
}

#[test]
fn test_inconsistent_project_renders_debug_chart() {
    let project = r#"
.recipe mixer tier=lv eut=2 dur=20 number=1
in a 1
out b 1

.recipe centrifuge tier=lv eut=2 dur=20 number=2
in b 1
out c 1
"#;
    let config = FlowConfig::default();
    let data = GameData::builtin().unwrap();
    let mut graph = load(project, &config);
    let err = balance(&mut graph, &config, &data).unwrap_err();
    assert!(matches!(err, FlowError::Inconsistent { ref ingredient, .. } if ingredient == "b"));

    let dot = to_dot(&graph, None, &config, "debug");
    assert!(dot.contains("[id:1] centrifuge"));
    assert!(dot.contains("\\nv"));
}

#[test]
fn test_shared_producer_conflict_renders_debug_chart() {
    let project = r#"
.recipe mixer tier=lv eut=2 dur=20 number=1
in a 1
out b 1

.recipe centrifuge tier=lv eut=2 dur=20 number=1
in b 1
out c 1

.recipe macerator tier=lv eut=2 dur=20 number=1
in b 1
out d 1
"#;
    let config = FlowConfig::default();
    let data = GameData::builtin().unwrap();
    let mut graph = load(project, &config);
    let err = balance(&mut graph, &config, &data).unwrap_err();
    assert!(matches!(err, FlowError::UnsupportedConflict { .. }));

    let dot = to_dot(&graph, None, &config, "debug");
    assert!(dot.contains("[id:0] mixer"));
    assert!(dot.contains("\\nv"));
}

#[test]
fn test_missing_anchor() {
    let project = ".recipe mixer tier=lv eut=2 dur=20\nin a 1\nout b 1\n";
    let config = FlowConfig::default();
    let data = GameData::builtin().unwrap();
    let mut graph = load(project, &config);
    assert!(matches!(
        balance(&mut graph, &config, &data),
        Err(FlowError::MissingAnchor)
    ));
}

#[test]
fn test_negative_overclock_is_rejected() {
    let project = ".recipe mixer tier=ev eut=30720 dur=20 number=1\nin a 1\nout b 1\n";
    let config = FlowConfig::default();
    let data = GameData::builtin().unwrap();
    let recipes = dsl::load_project(project, &config).unwrap();
    assert!(matches!(
        build_graph(recipes, &config, &data),
        Err(FlowError::NegativeOverclock { .. })
    ));
}

#[test]
fn test_power_line_burns_leftover_fuel() {
    let project = r#"
.recipe distillery tier=lv eut=16 dur=20 number=1
in biomass 20
out methane 20
"#;
    let config = FlowConfig {
        power_line: true,
        ..FlowConfig::default()
    };
    let (graph, summary) = solve(project, &config);

    let turbine = NodeId::Recipe(1);
    assert_eq!(graph.recipe(turbine).unwrap().machine, "gas turbine");
    assert!(!graph.has_edge(NodeId::Recipe(0), NodeId::Sink, "methane"));

    // 32 EU/t output plus 2^(tier + 1) EU/t lost per amp, LV is tier 0
    let loss = 2f64.powi(0 + 1);
    let fuel_per_tick = (32.0 + loss) / (104_000.0 / 1000.0 * 0.95);
    let produced = 20.0 / fuel_per_tick * 32.0;
    assert_relative_eq!(flow(&graph, turbine, NodeId::Sink, "EU"), produced, max_relative = 1e-9);
    assert_relative_eq!(
        graph.recipe(turbine).unwrap().multiplier().unwrap(),
        20.0 / (fuel_per_tick * 20.0),
        max_relative = 1e-9
    );
    assert_eq!(summary.output_eut, Some((produced / 20.0).floor()));
    assert_relative_eq!(summary.input_eut, -16.0);

    let dot = to_dot(&graph, Some(&summary), &config, "power");
    assert!(dot.contains("Gas Turbine"));
    assert!(dot.contains("Output EU/t:"));
    assert!(dot.contains("\"total_io_node\""));
}

#[test]
fn test_combined_outputs_keep_totals() {
    let project = r#"
.recipe mixer tier=lv eut=2 dur=20 number=2
in a 1
out b 1

.recipe centrifuge tier=lv eut=2 dur=20 number=1
in b 1
out c 1

.recipe macerator tier=lv eut=2 dur=20
in b 1
out d 1
"#;
    let config = FlowConfig {
        combine_outputs: true,
        ..FlowConfig::default()
    };
    let (graph, _) = solve(project, &config);
    let joint = NodeId::Joint {
        direction: IoDirection::Output,
        index: 0,
    };
    assert_relative_eq!(flow(&graph, NodeId::Recipe(0), joint, "b"), 2.0, max_relative = 1e-9);
    assert_relative_eq!(flow(&graph, joint, NodeId::Recipe(1), "b"), 1.0, max_relative = 1e-9);
    assert_relative_eq!(flow(&graph, joint, NodeId::Recipe(2), "b"), 1.0, max_relative = 1e-9);
}
