//! Machine node labels and colours.

use super::summary::PowerUnit;
use crate::config::FlowConfig;
use crate::data::GameData;
use crate::error::Result;
use crate::graph::{FlowGraph, NodeId};
use crate::recipe::Recipe;
use crate::render::format::{attribute_lines, capitalize_machine, decimal, round2};

/// Machines that produce power without drawing any.
const BASIC_GENERATORS: &[&str] = &[
    "gas turbine",
    "combustion gen",
    "semifluid gen",
    "steam turbine",
    "rocket engine",
    "large naquadah reactor",
    "large gas turbine",
    "large steam turbine",
    "large combustion engine",
    "extreme combustion engine",
    "xl turbo gas turbine",
    "xl turbo steam turbine",
    "air intake hatch",
];

/// Label lines of a multiplied recipe.
pub fn machine_label(recipe: &Recipe, unit: &PowerUnit) -> Vec<String> {
    let multiplier = recipe.multiplier().unwrap_or_default();
    let mut lines = vec![
        format!(
            "{}x {} {}",
            decimal(round2(multiplier)),
            recipe.user_voltage.to_uppercase(),
            capitalize_machine(&recipe.machine)
        ),
        format!("Cycle: {}s", decimal(recipe.cycle_seconds())),
    ];
    if !BASIC_GENERATORS.contains(&recipe.machine.as_str()) {
        lines.push(format!("Amoritized: {}", unit.label(recipe.eut.round())));
        lines.push(format!("Per Machine: {}", unit.label(recipe.base_eut.round())));
    }
    lines.extend(attribute_lines(recipe));
    lines
}

/// Replace every machine node's label with its solved description.
pub fn add_machine_labels(graph: &mut FlowGraph, config: &FlowConfig, data: &GameData) -> Result<()> {
    let mut labels = Vec::new();
    for node in graph.machine_nodes() {
        let Some(recipe) = graph.recipe(node) else { continue };
        let tier = data.voltage.index(&recipe.user_voltage)?;
        let unit = PowerUnit::resolve(config, data, tier)?;
        let mut lines = machine_label(recipe, &unit);
        if config.show_machine_indices {
            lines[0] = format!("({}) {}", node, lines[0]);
        }
        labels.push((node, lines.join("\n")));
    }

    for (node, label) in labels {
        if let Some(style) = graph.node_mut(node) {
            style.label = label;
        }
    }
    Ok(())
}

/// Fill anchored machines with the locked node colour.
pub fn color_locked_nodes(graph: &mut FlowGraph, config: &FlowConfig) {
    let locked: Vec<NodeId> = graph
        .machine_nodes()
        .filter(|&node| graph.recipe(node).is_some_and(Recipe::is_anchored))
        .collect();
    for node in locked {
        if let Some(style) = graph.node_mut(node) {
            style.fillcolor = Some(config.locked_node_color.clone());
        }
    }
}
