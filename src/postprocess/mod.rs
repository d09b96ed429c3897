//! Post-processing of a solved graph.
//!
//! Runs after the solver has written every edge quantity, in this order:
//!
//! 1. power line generators for leftover fuels (when enabled)
//! 2. machine multipliers from the solved flows
//! 3. machine labels
//! 4. the summary node
//! 5. locked node colours
//! 6. joint nodes for fan-in, then fan-out (when enabled)
//! 7. the bottleneck report (when enabled)

mod bottlenecks;
mod labels;
mod multipliers;
mod powerline;
mod summary;

pub use bottlenecks::{bottlenecks, log_bottlenecks};
pub use labels::{add_machine_labels, color_locked_nodes, machine_label};
pub use multipliers::{add_recipe_multipliers, multiplier_candidates};
pub use powerline::{add_power_line, generator_tier, known_burnables};
pub use summary::{add_summary_node, summarize, PowerUnit, Summary, SummaryRow};

use crate::config::FlowConfig;
use crate::data::GameData;
use crate::error::Result;
use crate::graph::{combine_inputs, combine_outputs, FlowGraph};

/// Apply every post-processing step to a solved graph.
pub fn postprocess(graph: &mut FlowGraph, config: &FlowConfig, data: &GameData) -> Result<Summary> {
    if config.power_line {
        add_power_line(graph, config, data)?;
    }
    add_recipe_multipliers(graph)?;
    add_machine_labels(graph, config, data)?;
    let summary = add_summary_node(graph, config, data)?;
    color_locked_nodes(graph, config);

    if config.combine_inputs {
        combine_inputs(graph);
    }
    if config.combine_outputs {
        combine_outputs(graph);
    }
    if config.print_bottlenecks {
        log_bottlenecks(graph, config.max_bottlenecks);
    }
    Ok(summary)
}
