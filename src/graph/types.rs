//! Core types for the flow graph.

use std::fmt;

use crate::recipe::IoDirection;

/// A unique identifier for a node in the flow graph.
///
/// Only [`NodeId::Recipe`] nodes are real machines; every other variant is a
/// pseudo-node that exists for balancing or drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    /// Supplies every input nothing in the graph produces
    Source,
    /// Absorbs every output nothing in the graph consumes
    Sink,
    /// Index into the graph's recipe list
    Recipe(usize),
    /// Point node merging same-ingredient edges for drawing
    Joint { direction: IoDirection, index: usize },
    /// Summary table node
    Summary,
}

impl NodeId {
    /// Whether this node is a real machine and not a pseudo-node.
    pub fn is_machine(&self) -> bool {
        matches!(self, NodeId::Recipe(_))
    }

    /// Recipe index of a machine node.
    pub fn recipe_index(&self) -> Option<usize> {
        match self {
            NodeId::Recipe(i) => Some(*i),
            _ => None,
        }
    }

    /// Whether edges attach to this node through named ports.
    pub fn has_ports(&self) -> bool {
        matches!(self, NodeId::Source | NodeId::Sink | NodeId::Recipe(_))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Source => write!(f, "source"),
            NodeId::Sink => write!(f, "sink"),
            NodeId::Recipe(i) => write!(f, "{}", i),
            NodeId::Joint {
                direction: IoDirection::Input,
                index,
            } => write!(f, "joint_i_{}", index),
            NodeId::Joint {
                direction: IoDirection::Output,
                index,
            } => write!(f, "joint_o_{}", index),
            NodeId::Summary => write!(f, "total_io_node"),
        }
    }
}

/// Edges are unique per (from, to, ingredient).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub from: NodeId,
    pub to: NodeId,
    pub ingredient: String,
}

impl EdgeKey {
    pub fn new(from: NodeId, to: NodeId, ingredient: impl Into<String>) -> Self {
        Self {
            from,
            to,
            ingredient: ingredient.into(),
        }
    }

    /// The endpoint on the given side of the edge, seen from a node:
    /// `Output` is the producer, `Input` the consumer.
    pub fn endpoint(&self, side: IoDirection) -> NodeId {
        match side {
            IoDirection::Output => self.from,
            IoDirection::Input => self.to,
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.from, self.to, self.ingredient)
    }
}

/// Quantity not yet solved.
pub const UNSOLVED: f64 = -1.0;

/// A directed ingredient flow between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub key: EdgeKey,
    /// Flow in units per second once solved
    pub quantity: f64,
    /// Solver variable name shown at the consumer end in debug output
    pub debug_head: Option<String>,
    /// Solver variable name shown at the producer end in debug output
    pub debug_tail: Option<String>,
}

impl Edge {
    pub fn new(key: EdgeKey, quantity: f64) -> Self {
        Self {
            key,
            quantity,
            debug_head: None,
            debug_tail: None,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.quantity != UNSOLVED
    }
}

/// Presentation attributes of a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeStyle {
    pub label: String,
    pub fillcolor: Option<String>,
    pub color: Option<String>,
    pub shape: Option<String>,
}

impl NodeStyle {
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_fill(mut self, color: impl Into<String>) -> Self {
        self.fillcolor = Some(color.into());
        self
    }

    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}
