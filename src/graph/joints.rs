//! Joint nodes that merge fan-in and fan-out edges for drawing.

use super::{Edge, EdgeKey, FlowGraph, NodeId, NodeStyle};
use crate::recipe::IoDirection;

/// Group edge endpoints by `(anchor, ingredient)`, keeping first-seen order.
fn groups(graph: &FlowGraph, direction: IoDirection) -> Vec<(NodeId, String, Vec<NodeId>)> {
    let mut out: Vec<(NodeId, String, Vec<NodeId>)> = Vec::new();
    for edge in graph.edges() {
        let (anchor, other) = match direction {
            IoDirection::Output => (edge.key.from, edge.key.to),
            IoDirection::Input => (edge.key.to, edge.key.from),
        };
        match out
            .iter_mut()
            .find(|(a, ing, _)| *a == anchor && *ing == edge.key.ingredient)
        {
            Some((_, _, others)) => others.push(other),
            None => out.push((anchor, edge.key.ingredient.clone(), vec![other])),
        }
    }
    out.retain(|(_, _, others)| others.len() > 1);
    out
}

fn combine(graph: &mut FlowGraph, direction: IoDirection) {
    for (index, (anchor, ingredient, others)) in groups(graph, direction).into_iter().enumerate() {
        let joint = NodeId::Joint { direction, index };
        graph.add_node(joint, NodeStyle::default().with_shape("point"));

        let mut total = 0.0;
        for other in others {
            let (old, new) = match direction {
                IoDirection::Output => (
                    EdgeKey::new(anchor, other, ingredient.clone()),
                    EdgeKey::new(joint, other, ingredient.clone()),
                ),
                IoDirection::Input => (
                    EdgeKey::new(other, anchor, ingredient.clone()),
                    EdgeKey::new(other, joint, ingredient.clone()),
                ),
            };
            let Some(edge) = graph.remove_edge(&old) else { continue };
            total += edge.quantity;
            graph.insert_edge(Edge { key: new, ..edge });
        }

        match direction {
            IoDirection::Output => graph.add_edge(anchor, joint, ingredient, total),
            IoDirection::Input => graph.add_edge(joint, anchor, ingredient, total),
        }
    }
}

/// Route every one-to-many flow of an ingredient through a `joint_o_N` node.
pub fn combine_outputs(graph: &mut FlowGraph) {
    combine(graph, IoDirection::Output);
}

/// Route every many-to-one flow of an ingredient through a `joint_i_N` node.
pub fn combine_inputs(graph: &mut FlowGraph) {
    combine(graph, IoDirection::Input);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fan_out() -> FlowGraph {
        let mut graph = FlowGraph::new(Vec::new());
        graph.add_edge(NodeId::Source, NodeId::Recipe(0), "ore", 4.0);
        graph.add_edge(NodeId::Recipe(0), NodeId::Recipe(1), "dust", 1.5);
        graph.add_edge(NodeId::Recipe(0), NodeId::Recipe(2), "dust", 2.5);
        graph.add_edge(NodeId::Recipe(1), NodeId::Sink, "ingot", 1.0);
        graph.add_edge(NodeId::Recipe(2), NodeId::Sink, "ingot", 1.0);
        graph
    }

    #[test]
    fn test_combine_outputs() {
        let mut graph = fan_out();
        combine_outputs(&mut graph);

        let joint = NodeId::Joint {
            direction: IoDirection::Output,
            index: 0,
        };
        assert!(graph.has_node(joint));
        assert!(!graph.has_edge(NodeId::Recipe(0), NodeId::Recipe(1), "dust"));
        let trunk = graph.edge(&EdgeKey::new(NodeId::Recipe(0), joint, "dust")).unwrap();
        assert_relative_eq!(trunk.quantity, 4.0);
        assert_relative_eq!(graph.quantity(&EdgeKey::new(joint, NodeId::Recipe(2), "dust")), 2.5);
    }

    #[test]
    fn test_combine_inputs() {
        let mut graph = fan_out();
        combine_inputs(&mut graph);

        let joint = NodeId::Joint {
            direction: IoDirection::Input,
            index: 0,
        };
        assert_eq!(joint.to_string(), "joint_i_0");
        assert_relative_eq!(graph.quantity(&EdgeKey::new(joint, NodeId::Sink, "ingot")), 2.0);
        assert!(graph.has_edge(NodeId::Recipe(1), joint, "ingot"));
        assert!(graph.has_edge(NodeId::Recipe(2), joint, "ingot"));
        // single edges stay untouched
        assert!(graph.has_edge(NodeId::Source, NodeId::Recipe(0), "ore"));
    }
}
