//! Bottleneck report: the machines needed in the largest numbers.

use log::info;

use crate::graph::FlowGraph;
use crate::recipe::Recipe;
use crate::render::format::{decimal, round2, title_case};

/// Recipes with the largest multipliers, at least `minimum` of them and at
/// least a tenth of the chart.
pub fn bottlenecks(graph: &FlowGraph, minimum: usize) -> Vec<&Recipe> {
    let mut recipes: Vec<&Recipe> = graph.recipes().iter().collect();
    recipes.sort_by(|a, b| {
        let (a, b) = (a.multiplier().unwrap_or_default(), b.multiplier().unwrap_or_default());
        b.total_cmp(&a)
    });
    let count = (recipes.len() / 10).max(minimum);
    recipes.truncate(count);
    recipes
}

pub fn log_bottlenecks(graph: &FlowGraph, minimum: usize) {
    for recipe in bottlenecks(graph, minimum) {
        info!(
            "{}x {} {}",
            decimal(round2(recipe.multiplier().unwrap_or_default())),
            recipe.user_voltage,
            recipe.machine
        );
        for out in &recipe.outputs {
            info!("    {} ({})", title_case(&out.name), decimal(round2(out.quantity)));
        }
    }
}
