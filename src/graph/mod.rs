//! Flow graph: recipes as nodes, ingredient flows as edges.
//!
//! A graph is built once per project and mutated in place by a fixed
//! pipeline: [`connect`] links producers to consumers, [`remove_back_edges`]
//! breaks cycles, the solver writes edge quantities, and post-processing adds
//! labels, power generators, joints and the summary node.
//!
//! Edges live in insertion order and are unique per `(from, to, ingredient)`.
//! The per-node adjacency view is not kept in sync with edge mutations;
//! callers build a fresh [`Adjacency`] after changing edges.

mod connect;
mod cycles;
mod joints;
mod types;

pub use connect::connect;
pub use cycles::remove_back_edges;
pub use joints::{combine_inputs, combine_outputs};
pub use types::*;

use std::collections::HashMap;

use crate::recipe::{IoDirection, Recipe};

/// A flow graph under construction or solved.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    recipes: Vec<Recipe>,
    nodes: Vec<(NodeId, NodeStyle)>,
    edges: Vec<Edge>,
}

impl FlowGraph {
    /// Create an unconnected graph owning the given recipes.
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self {
            recipes,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    // ---- recipes ----

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn recipes_mut(&mut self) -> &mut [Recipe] {
        &mut self.recipes
    }

    /// Recipe behind a machine node.
    pub fn recipe(&self, node: NodeId) -> Option<&Recipe> {
        node.recipe_index().and_then(|i| self.recipes.get(i))
    }

    pub fn recipe_mut(&mut self, node: NodeId) -> Option<&mut Recipe> {
        let idx = node.recipe_index()?;
        self.recipes.get_mut(idx)
    }

    /// Append a recipe and return its node id. The node itself is not added.
    pub fn push_recipe(&mut self, recipe: Recipe) -> NodeId {
        self.recipes.push(recipe);
        NodeId::Recipe(self.recipes.len() - 1)
    }

    /// Machine node ids in recipe order.
    pub fn machine_nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.recipes.len()).map(NodeId::Recipe)
    }

    // ---- nodes ----

    /// Add a node, or replace the style of an existing one.
    pub fn add_node(&mut self, id: NodeId, style: NodeStyle) {
        match self.nodes.iter_mut().find(|(n, _)| *n == id) {
            Some((_, existing)) => *existing = style,
            None => self.nodes.push((id, style)),
        }
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|(n, _)| *n == id)
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeStyle> {
        self.nodes.iter().find(|(n, _)| *n == id).map(|(_, s)| s)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeStyle> {
        self.nodes.iter_mut().find(|(n, _)| *n == id).map(|(_, s)| s)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeStyle)> {
        self.nodes.iter().map(|(n, s)| (*n, s))
    }

    // ---- edges ----

    /// Add an edge. An existing edge with the same key keeps its position
    /// and takes the new quantity.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, ingredient: impl Into<String>, quantity: f64) {
        let key = EdgeKey::new(from, to, ingredient);
        match self.edges.iter_mut().find(|e| e.key == key) {
            Some(edge) => edge.quantity = quantity,
            None => self.edges.push(Edge::new(key, quantity)),
        }
    }

    /// Insert a fully built edge, replacing any edge with the same key.
    pub fn insert_edge(&mut self, edge: Edge) {
        match self.edges.iter_mut().find(|e| e.key == edge.key) {
            Some(existing) => *existing = edge,
            None => self.edges.push(edge),
        }
    }

    pub fn remove_edge(&mut self, key: &EdgeKey) -> Option<Edge> {
        let pos = self.edges.iter().position(|e| &e.key == key)?;
        Some(self.edges.remove(pos))
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.key == key)
    }

    pub fn edge_mut(&mut self, key: &EdgeKey) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| &e.key == key)
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId, ingredient: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.key.from == from && e.key.to == to && e.key.ingredient == ingredient)
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    /// Quantity of an edge, or 0 if it does not exist.
    pub fn quantity(&self, key: &EdgeKey) -> f64 {
        self.edge(key).map(|e| e.quantity).unwrap_or(0.0)
    }

    /// Build the per-node view of the current edges.
    pub fn adjacency(&self) -> Adjacency {
        let mut map: HashMap<NodeId, [Vec<EdgeKey>; 2]> = HashMap::new();
        for edge in &self.edges {
            map.entry(edge.key.from).or_default()[1].push(edge.key.clone());
            map.entry(edge.key.to).or_default()[0].push(edge.key.clone());
        }
        Adjacency { map }
    }
}

/// Incoming and outgoing edge keys per node, in edge insertion order.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    map: HashMap<NodeId, [Vec<EdgeKey>; 2]>,
}

impl Adjacency {
    /// Edges entering (`Input`) or leaving (`Output`) a node.
    pub fn edges(&self, node: NodeId, direction: IoDirection) -> &[EdgeKey] {
        let idx = match direction {
            IoDirection::Input => 0,
            IoDirection::Output => 1,
        };
        self.map.get(&node).map(|lists| lists[idx].as_slice()).unwrap_or(&[])
    }

    /// Number of edges touching a node.
    pub fn degree(&self, node: NodeId) -> usize {
        self.map.get(&node).map(|[i, o]| i.len() + o.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_unique_per_key() {
        let mut graph = FlowGraph::new(Vec::new());
        graph.add_edge(NodeId::Source, NodeId::Recipe(0), "water", UNSOLVED);
        graph.add_edge(NodeId::Recipe(0), NodeId::Sink, "steam", UNSOLVED);
        graph.add_edge(NodeId::Source, NodeId::Recipe(0), "water", 4.0);

        assert_eq!(graph.edges().len(), 2);
        assert_eq!(graph.edges()[0].quantity, 4.0);
        assert_eq!(graph.edges()[1].key.ingredient, "steam");
    }

    #[test]
    fn test_adjacency_and_removal() {
        let mut graph = FlowGraph::new(Vec::new());
        graph.add_edge(NodeId::Source, NodeId::Recipe(0), "a", 1.0);
        graph.add_edge(NodeId::Recipe(0), NodeId::Recipe(1), "b", 1.0);
        graph.add_edge(NodeId::Recipe(0), NodeId::Sink, "c", 1.0);

        let adj = graph.adjacency();
        assert_eq!(adj.edges(NodeId::Recipe(0), IoDirection::Input).len(), 1);
        assert_eq!(adj.edges(NodeId::Recipe(0), IoDirection::Output).len(), 2);
        assert_eq!(adj.degree(NodeId::Recipe(1)), 1);
        assert!(adj.edges(NodeId::Summary, IoDirection::Input).is_empty());

        let key = EdgeKey::new(NodeId::Recipe(0), NodeId::Recipe(1), "b");
        assert!(graph.remove_edge(&key).is_some());
        assert!(graph.remove_edge(&key).is_none());
        assert_eq!(graph.adjacency().degree(NodeId::Recipe(1)), 0);
    }

    #[test]
    fn test_node_style_replaced_in_place() {
        let mut graph = FlowGraph::new(Vec::new());
        graph.add_node(NodeId::Source, NodeStyle::labelled("source"));
        graph.add_node(NodeId::Sink, NodeStyle::labelled("sink"));
        graph.add_node(NodeId::Source, NodeStyle::labelled("source").with_fill("#fff"));

        let ids: Vec<_> = graph.nodes().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![NodeId::Source, NodeId::Sink]);
        assert_eq!(
            graph.node(NodeId::Source).and_then(|s| s.fillcolor.as_deref()),
            Some("#fff")
        );
    }
}
