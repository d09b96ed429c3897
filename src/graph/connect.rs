//! Link producers to consumers by ingredient name.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::{EdgeKey, FlowGraph, NodeId, NodeStyle, UNSOLVED};
use crate::config::FlowConfig;
use crate::recipe::IoDirection;
use crate::render::format::{attribute_lines, title_case};

/// Add source, sink and recipe nodes and connect matching ingredients.
///
/// Every recipe input is linked to every recipe producing it, or to the
/// source when nothing does; outputs likewise go to every consumer or to the
/// sink. A pair of nodes sharing an ingredient is linked once. New edges
/// carry the [`UNSOLVED`] quantity.
pub fn connect(graph: &mut FlowGraph, config: &FlowConfig) {
    graph.add_node(
        NodeId::Source,
        NodeStyle::labelled("source").with_fill(&config.sourcesink_color),
    );
    graph.add_node(
        NodeId::Sink,
        NodeStyle::labelled("sink").with_fill(&config.sourcesink_color),
    );

    // ingredient -> direction -> recipes using it that way
    let mut involved: HashMap<(String, IoDirection), Vec<NodeId>> = HashMap::new();
    for node in graph.machine_nodes().collect::<Vec<_>>() {
        let Some(recipe) = graph.recipe(node) else { continue };
        for dir in IoDirection::BOTH {
            for ing in recipe.io(dir) {
                involved.entry((ing.name.clone(), dir)).or_default().push(node);
            }
        }
    }

    let nodes: Vec<NodeId> = graph.machine_nodes().collect();
    for &node in &nodes {
        let Some(recipe) = graph.recipe(node) else { continue };
        let mut label = if config.show_machine_indices {
            vec![format!("({}) {}", node, title_case(&recipe.machine))]
        } else {
            vec![title_case(&recipe.machine)]
        };
        label.extend(attribute_lines(recipe));
        let style = NodeStyle::labelled(label.join("\n")).with_fill(&config.nonlocked_node_color);
        graph.add_node(node, style);
    }

    let mut added: HashSet<EdgeKey> = HashSet::new();
    let mut pending: Vec<EdgeKey> = Vec::new();
    for &node in &nodes {
        let Some(recipe) = graph.recipe(node) else { continue };
        for dir in IoDirection::BOTH {
            for ing in recipe.io(dir) {
                let linked = match involved.get(&(ing.name.clone(), dir.swap())) {
                    Some(linked) if !linked.is_empty() => linked.clone(),
                    _ => match dir {
                        IoDirection::Input => vec![NodeId::Source],
                        IoDirection::Output => vec![NodeId::Sink],
                    },
                };

                for link in linked {
                    let forward = EdgeKey::new(link, node, ing.name.clone());
                    let backward = EdgeKey::new(node, link, ing.name.clone());
                    if added.contains(&forward) || added.contains(&backward) {
                        continue;
                    }
                    let key = match dir {
                        IoDirection::Input => forward,
                        IoDirection::Output => backward,
                    };
                    added.insert(key.clone());
                    pending.push(key);
                }
            }
        }
    }

    for key in pending {
        debug!("Linking {}", key);
        graph.add_edge(key.from, key.to, key.ingredient, UNSOLVED);
    }
}
