//! Linear flow solver.
//!
//! The connected, acyclic graph is turned into a linear system over
//! per-machine ingredient flows (units per second):
//!
//! ```text
//! anchors       v_rep = quantity * number / cycle_seconds    (number)
//!               v_ing = target                                (target)
//! ratios        v_rep - (q_rep / q_ing) * v_ing = 0
//! splits        v_total - (v_aux1 + v_aux2 + ...) = 0
//! edges         v_producer_side - v_consumer_side = 0
//! ```
//!
//! The system is reduced with Gauss-Jordan elimination. A unique solution is
//! written back onto the edges; an empty solution set is diagnosed down to
//! the conflicting pair of flows; several solutions are rejected.

pub mod diagnose;
pub mod matrix;
pub mod system;

pub use diagnose::{annotate_graph, diagnose, find_conflicts, Conflict};
pub use matrix::{AugmentedMatrix, Outcome};
pub use system::{Equation, LinearSystem, SystemBuilder, VarKey};

use log::{info, warn};

use crate::error::{FlowError, Result};
use crate::graph::FlowGraph;

/// Absolute residual above which an equation is a real conflict.
pub const CONFLICT_TOLERANCE: f64 = 1e-8;

/// Relative tolerance between the two solved ends of a machine edge.
pub const EDGE_TOLERANCE: f64 = 0.05;

/// `math.isclose` with only a relative tolerance.
pub(crate) fn is_close(a: f64, b: f64, rel_tol: f64) -> bool {
    a == b || (a - b).abs() <= rel_tol * a.abs().max(b.abs())
}

/// Build the linear system for a connected graph.
pub fn build_system(graph: &FlowGraph) -> Result<LinearSystem> {
    Ok(SystemBuilder::new(graph)
        .allocate_variables()
        .add_anchors()?
        .lock_ratios()?
        .index_perspectives()
        .conserve_flows()
        .build())
}

/// Solve the graph's flows and write them onto its edges.
///
/// On an inconsistent system the graph is annotated with solver variable
/// names so the caller can render it for debugging.
pub fn solve(graph: &mut FlowGraph) -> Result<()> {
    info!("Running linear solver...");
    let system = build_system(graph)?;

    match matrix::solve(&system.equations, system.num_variables()) {
        Outcome::Unique(values) => write_quantities(graph, &system, &values),
        Outcome::Inconsistent => diagnose(graph, &system),
        Outcome::Underdetermined { free } => Err(FlowError::Underdetermined { free }),
    }
}

/// Copy solved values onto edges touching at least one machine.
pub fn write_quantities(graph: &mut FlowGraph, system: &LinearSystem, values: &[f64]) -> Result<()> {
    for edge in graph.edges_mut() {
        let key = &edge.key;
        let from = system.perspective(key, key.from).map(|v| values[v]);
        let to = system.perspective(key, key.to).map(|v| values[v]);

        let quantity = match (key.from.is_machine(), key.to.is_machine(), from, to) {
            (true, true, Some(a), Some(b)) => {
                if !is_close(a, b, EDGE_TOLERANCE) {
                    return Err(FlowError::EdgeMismatch {
                        edge: key.to_string(),
                        from_side: a,
                        to_side: b,
                    });
                }
                a
            }
            (true, _, Some(a), _) => a,
            (_, true, _, Some(b)) => b,
            _ => continue,
        };

        if quantity < 0.0 {
            warn!("Solved a negative flow of {} on {}", quantity, key);
        }
        edge.quantity = quantity;
    }
    Ok(())
}
