//! # GT Flow Core
//!
//! A steady-state throughput balancer for GregTech processing lines.
//!
//! This library provides:
//! - A small DSL for describing a processing line as a list of recipes
//! - Machine-specific overclock models driven by static game data tables
//! - A flow graph linking every producer to every consumer of an ingredient
//! - An exact linear solver for the machine counts that balance the line
//! - Post-processing (power line, labels, summary) and Graphviz output
//!
//! ## Architecture
//!
//! - [`dsl`] - Parser for the project description language
//! - [`recipe`] - Ingredients and machine recipes
//! - [`data`] - Voltage, coil, turbine and generator tables
//! - [`overclock`] - Per-machine overclock physics
//! - [`graph`] - Flow graph construction and cycle removal
//! - [`solver`] - Linear system assembly, solving and conflict diagnosis
//! - [`postprocess`] - Multipliers, power line, labels and summary
//! - [`render`] - Number formatting and DOT output
//!
//! ## Usage
//!
//! ```bash
//! gtflow projects/steel.gtf --config flow.toml --output output/
//! dot -Tpng output/steel.dot -o steel.png
//! ```
//!
//! ## Balancing Method
//!
//! Every machine contributes one unknown flow per distinct ingredient. The
//! recipe's declared quantities fix the ratios between a machine's own flows,
//! user anchors (`number`, `target`) fix the scale, and every producer to
//! consumer link adds a conservation equation. The resulting linear system is
//! solved exactly; machine counts are the solved flows divided by the flow of
//! a single machine.

pub mod config;
pub mod data;
pub mod dsl;
pub mod error;
pub mod graph;
pub mod overclock;
pub mod postprocess;
pub mod recipe;
pub mod render;
pub mod solver;

// Re-export main types for convenience
pub use config::FlowConfig;
pub use data::GameData;
pub use error::{FlowError, Result};
pub use graph::FlowGraph;
pub use postprocess::Summary;
pub use recipe::Recipe;

/// Game ticks per second
pub const TICKS_PER_SECOND: f64 = 20.0;

/// Overclock recipes and build the connected, acyclic flow graph.
pub fn build_graph(recipes: Vec<Recipe>, config: &FlowConfig, data: &GameData) -> Result<FlowGraph> {
    let recipes = overclock::overclock_recipes(recipes, data)?;
    let mut graph = FlowGraph::new(recipes);
    graph::connect(&mut graph, config);
    graph::remove_back_edges(&mut graph);
    Ok(graph)
}

/// Solve a built graph and post-process it for display.
///
/// When the flows are inconsistent the graph is left annotated with solver
/// variable names so it can still be rendered for debugging.
pub fn balance(graph: &mut FlowGraph, config: &FlowConfig, data: &GameData) -> Result<Summary> {
    solver::solve(graph)?;
    postprocess::postprocess(graph, config, data)
}
