//! Localizing the conflict in an inconsistent system.
//!
//! Equations are solved one at a time by substitution, in queue order. The
//! first equation whose every variable is already known but which does not
//! hold is a conflict. Only conflicts between exactly two flows of the same
//! ingredient can be explained to the user.

use std::collections::{HashMap, VecDeque};

use log::{info, warn};

use super::system::LinearSystem;
use super::CONFLICT_TOLERANCE;
use crate::error::{FlowError, Result};
use crate::graph::{FlowGraph, NodeId};
use crate::recipe::IoDirection;
use crate::render::format::capitalize_machine;

/// An equation that reduced to a nonzero constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    /// Variables of the equation, in term order
    pub variables: Vec<usize>,
    /// Left-hand side minus right-hand side after substitution
    pub difference: f64,
}

/// Substitute equations one by one and collect every failing one.
pub fn find_conflicts(system: &LinearSystem) -> Vec<Conflict> {
    let equations = &system.equations;
    let mut queue: VecDeque<usize> = (0..equations.len()).collect();
    let max_iter = equations.len() * equations.len() + 1;
    let mut solved: HashMap<usize, f64> = HashMap::new();
    let mut conflicts = Vec::new();
    let mut iterations = 0;

    while iterations < max_iter {
        let Some(idx) = queue.pop_front() else { break };
        iterations += 1;
        let eq = &equations[idx];

        let unsolved: Vec<usize> = eq
            .variables()
            .into_iter()
            .filter(|v| !solved.contains_key(v))
            .collect();
        if unsolved.len() > 1 {
            queue.push_back(idx);
            continue;
        }

        // sum of known terms minus the constant
        let mut residual = -eq.constant;
        let mut coefficient = 0.0;
        for &(var, coef) in &eq.terms {
            match solved.get(&var) {
                Some(value) => residual += coef * value,
                None => coefficient += coef,
            }
        }

        match unsolved.first() {
            Some(&var) if coefficient.abs() > f64::EPSILON => {
                solved.insert(var, -residual / coefficient);
            }
            _ => {
                if residual.abs() > CONFLICT_TOLERANCE {
                    conflicts.push(Conflict {
                        variables: eq.variables(),
                        difference: residual,
                    });
                }
            }
        }
    }

    conflicts
}

fn var_name(idx: usize) -> String {
    format!("v{}", idx)
}

fn var_list(vars: &[usize]) -> String {
    let names: Vec<String> = vars.iter().map(|&v| var_name(v)).collect();
    format!("[{}]", names.join(", "))
}

/// Write variable names onto edges and ids onto machine labels for the
/// debug diagram.
pub fn annotate_graph(graph: &mut FlowGraph, system: &LinearSystem) {
    let mut perspectives: Vec<_> = system.perspectives.iter().collect();
    perspectives.sort_by_key(|entry| *entry.1);

    for ((key, node), &idx) in perspectives {
        let Some(edge) = graph.edge_mut(key) else { continue };
        let slot = if *node == key.to {
            &mut edge.debug_head
        } else {
            &mut edge.debug_tail
        };
        slot.get_or_insert_with(String::new).push_str(&var_name(idx));
    }

    let labels: Vec<(NodeId, String)> = graph
        .machine_nodes()
        .filter_map(|node| graph.recipe(node).map(|r| (node, format!("[id:{}] {}", node, r.machine))))
        .collect();
    for (node, label) in labels {
        if let Some(style) = graph.node_mut(node) {
            style.label = label;
        }
    }
}

/// Explain why the system has no solution.
///
/// Always returns an error: [`FlowError::Inconsistent`] for a reportable
/// two-flow conflict (after logging both remediations), otherwise
/// [`FlowError::UnsupportedConflict`] or [`FlowError::Infeasible`]. The graph
/// is annotated for the debug diagram whenever a conflict was found.
pub fn diagnose(graph: &mut FlowGraph, system: &LinearSystem) -> Result<()> {
    info!("Searching for inconsistency in system of equations...");
    let conflicts = find_conflicts(system);
    if conflicts.is_empty() {
        return Err(FlowError::Infeasible);
    }

    for conflict in &conflicts {
        let &[parent, child] = conflict.variables.as_slice() else {
            annotate_graph(graph, system);
            return Err(FlowError::UnsupportedConflict {
                variables: var_list(&conflict.variables),
            });
        };
        let parent_key = &system.variables[parent];
        let child_key = &system.variables[child];
        if parent_key.ingredient != child_key.ingredient {
            continue;
        }
        let product = parent_key.ingredient.clone();

        let producer = graph.recipe(parent_key.node);
        let consumer = graph.recipe(child_key.node);
        warn!("Major inconsistency: {}", var_list(&conflict.variables));
        if let (Some(producer), Some(consumer)) = (producer, consumer) {
            warn!("Between output={}", producer.outputs);
            warn!("    and  input={}", consumer.inputs);
        }

        info!("Please fix by either:");
        info!("1. Sending excess {} {} to sink", var_name(parent), product);

        let adjacency = graph.adjacency();
        let others: Vec<String> = adjacency
            .edges(child_key.node, child_key.direction)
            .iter()
            .filter(|e| e.ingredient != product)
            .filter_map(|e| {
                system
                    .perspective(e, child_key.node)
                    .map(|v| format!("('{}', '{}')", e.ingredient, var_name(v)))
            })
            .collect();
        info!("2. Pulling more [{}] from source", others.join(", "));

        let describe = |node: NodeId| {
            graph
                .recipe(node)
                .map(|r| format!("{} [id:{}]", capitalize_machine(&r.machine), node))
                .unwrap_or_else(|| node.to_string())
        };
        let (producer_name, consumer_name) = match parent_key.direction {
            IoDirection::Output => (describe(parent_key.node), describe(child_key.node)),
            IoDirection::Input => (describe(child_key.node), describe(parent_key.node)),
        };
        let error = FlowError::Inconsistent {
            ingredient: product,
            producer: producer_name,
            consumer: consumer_name,
            difference: conflict.difference,
        };

        annotate_graph(graph, system);
        return Err(error);
    }

    let all: Vec<usize> = conflicts.iter().flat_map(|c| c.variables.iter().copied()).collect();
    annotate_graph(graph, system);
    Err(FlowError::UnsupportedConflict {
        variables: var_list(&all),
    })
}
