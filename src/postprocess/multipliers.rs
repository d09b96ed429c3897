//! Machine counts from solved flows.

use log::{debug, warn};

use crate::error::{FlowError, Result};
use crate::graph::{FlowGraph, NodeId};
use crate::recipe::IoDirection;
use crate::solver::{is_close, EDGE_TOLERANCE};

/// Machine count implied by each of a recipe's ingredients: solved flow
/// over the flow of a single machine.
pub fn multiplier_candidates(graph: &FlowGraph, node: NodeId) -> Vec<f64> {
    let Some(recipe) = graph.recipe(node) else {
        return Vec::new();
    };
    let adjacency = graph.adjacency();
    let cycle = recipe.cycle_seconds();

    let mut candidates = Vec::new();
    for dir in IoDirection::BOTH {
        for (name, quantity) in recipe.io(dir).totals() {
            if quantity == 0.0 {
                continue;
            }
            let solved: f64 = adjacency
                .edges(node, dir)
                .iter()
                .filter(|key| key.ingredient == name)
                .map(|key| graph.quantity(key))
                .sum();
            candidates.push(solved / (quantity / cycle));
        }
    }
    candidates
}

/// Set every recipe's multiplier to the largest of its candidates.
///
/// Candidates that disagree point at solver slack; the largest is the
/// conservative machine count.
pub fn add_recipe_multipliers(graph: &mut FlowGraph) -> Result<()> {
    let mut chosen = Vec::new();
    for node in graph.machine_nodes() {
        let candidates = multiplier_candidates(graph, node);
        let Some(best) = candidates.iter().copied().reduce(f64::max) else {
            let machine = graph.recipe(node).map(|r| r.machine.clone()).unwrap_or_default();
            return Err(FlowError::NoIo {
                node: node.to_string(),
                machine,
            });
        };
        if candidates.iter().any(|&c| !is_close(c, best, EDGE_TOLERANCE)) {
            warn!("Machine {} has disagreeing multipliers {:?}, using {}", node, candidates, best);
        }
        chosen.push((node, best));
    }

    for (node, multiplier) in chosen {
        if let Some(recipe) = graph.recipe_mut(node) {
            debug!("{}x {}", multiplier, recipe.machine);
            recipe.apply_multiplier(multiplier)?;
        }
    }
    Ok(())
}
