//! Cycle removal by back-edge redirection.
//!
//! A directed graph is acyclic iff a depth-first search finds no back edge,
//! i.e. no edge into a node still on the DFS stack. Each back edge found is
//! cut: its flow is dumped to the sink and pulled fresh from the source, so
//! the solver sees a DAG while the net I/O still balances.

use std::collections::{HashMap, HashSet};

use log::info;

use super::{Edge, EdgeKey, FlowGraph, NodeId};
use crate::render::format::title_case;

/// Find every back edge as `(from, to)` node pairs, in discovery order.
///
/// Roots are visited in order of first appearance as an edge source and
/// successors in edge insertion order, so the result is deterministic.
pub fn find_back_edges(edges: &[Edge]) -> Vec<(NodeId, NodeId)> {
    let mut order: Vec<NodeId> = Vec::new();
    let mut successors: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for edge in edges {
        let from = edge.key.from;
        if !successors.contains_key(&from) {
            order.push(from);
        }
        successors.entry(from).or_default().push(edge.key.to);
    }

    let mut discovered: HashSet<NodeId> = HashSet::new();
    let mut finished: HashSet<NodeId> = HashSet::new();
    let mut back_edges: Vec<(NodeId, NodeId)> = Vec::new();
    let none: Vec<NodeId> = Vec::new();

    for root in order {
        if discovered.contains(&root) || finished.contains(&root) {
            continue;
        }
        discovered.insert(root);
        let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];

        while let Some(top) = stack.last_mut() {
            let (u, next) = *top;
            let children = successors.get(&u).unwrap_or(&none);
            if next < children.len() {
                top.1 += 1;
                let v = children[next];
                if discovered.contains(&v) {
                    if !back_edges.contains(&(u, v)) {
                        back_edges.push((u, v));
                    }
                } else if !finished.contains(&v) {
                    discovered.insert(v);
                    stack.push((v, 0));
                }
            } else {
                stack.pop();
                discovered.remove(&u);
                finished.insert(u);
            }
        }
    }

    back_edges
}

/// Break every cycle in the graph.
///
/// For each back edge `(u, v)`, every ingredient edge `u -> v` is replaced by
/// `u -> sink` and `source -> v` with the same quantity.
pub fn remove_back_edges(graph: &mut FlowGraph) {
    for (from, to) in find_back_edges(graph.edges()) {
        let relevant: Vec<EdgeKey> = graph
            .edges()
            .iter()
            .filter(|e| e.key.from == from && e.key.to == to)
            .map(|e| e.key.clone())
            .collect();

        for key in relevant {
            let Some(edge) = graph.remove_edge(&key) else { continue };
            info!(
                "Fixing factory cycle by redirecting \"{}\" to sink",
                title_case(&key.ingredient)
            );
            graph.add_edge(from, NodeId::Sink, key.ingredient.clone(), edge.quantity);
            graph.add_edge(NodeId::Source, to, key.ingredient, edge.quantity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlowConfig;
    use crate::graph::connect;
    use crate::graph::connect::tests::{edge_set, recipe, triple};

    /// Forward reachability from every node never returns to the start.
    fn is_acyclic(graph: &FlowGraph) -> bool {
        find_back_edges(graph.edges()).is_empty()
    }

    #[test]
    fn test_sulfuric_acid_loop_is_broken() {
        let recipes = vec![
            recipe(
                "large chemical reactor",
                &[("acetic acid", 1000.0), ("sulfuric acid", 1000.0)],
                &[("ethenone", 1000.0), ("diluted sulfuric acid", 1000.0)],
            ),
            recipe(
                "distillation tower",
                &[("diluted sulfuric acid", 3000.0)],
                &[("sulfuric acid", 2000.0), ("water", 1000.0)],
            ),
        ];
        let mut graph = FlowGraph::new(recipes);
        connect(&mut graph, &FlowConfig::default());
        assert!(!is_acyclic(&graph));

        remove_back_edges(&mut graph);

        let expected: HashSet<_> = [
            triple("source", "0", "acetic acid"),
            triple("source", "0", "sulfuric acid"),
            triple("0", "1", "diluted sulfuric acid"),
            triple("0", "sink", "ethenone"),
            triple("1", "sink", "sulfuric acid"),
            triple("1", "sink", "water"),
        ]
        .into_iter()
        .collect();
        assert_eq!(edge_set(&graph), expected);
        assert_eq!(graph.edges().len(), 6);
        assert!(is_acyclic(&graph));
    }

    #[test]
    fn test_three_node_ring() {
        let recipes = vec![
            recipe("a", &[("z", 1.0), ("feed", 1.0)], &[("x", 1.0)]),
            recipe("b", &[("x", 1.0)], &[("y", 1.0)]),
            recipe("c", &[("y", 1.0)], &[("z", 1.0), ("product", 1.0)]),
        ];
        let mut graph = FlowGraph::new(recipes);
        connect(&mut graph, &FlowConfig::default());
        remove_back_edges(&mut graph);

        // DFS starts at "c" (first edge source) and closes the ring on b -> c
        assert!(is_acyclic(&graph));
        assert!(graph.has_edge(NodeId::Recipe(2), NodeId::Recipe(0), "z"));
        assert!(!graph.has_edge(NodeId::Recipe(1), NodeId::Recipe(2), "y"));
        assert!(graph.has_edge(NodeId::Recipe(1), NodeId::Sink, "y"));
        assert!(graph.has_edge(NodeId::Source, NodeId::Recipe(2), "y"));
    }

    #[test]
    fn test_self_loop() {
        let recipes = vec![recipe("reactor", &[("catalyst", 1.0), ("ore", 1.0)], &[("catalyst", 1.0)])];
        let mut graph = FlowGraph::new(recipes);
        connect(&mut graph, &FlowConfig::default());
        assert_eq!(find_back_edges(graph.edges()), vec![(NodeId::Recipe(0), NodeId::Recipe(0))]);

        remove_back_edges(&mut graph);
        assert!(is_acyclic(&graph));
        assert!(graph.has_edge(NodeId::Source, NodeId::Recipe(0), "catalyst"));
        assert!(graph.has_edge(NodeId::Recipe(0), NodeId::Sink, "catalyst"));
    }
}
