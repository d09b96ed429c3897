//! Translation of a flow graph into a linear system.
//!
//! Every real machine gets one flow variable per distinct input and output
//! ingredient. Equations are added in a fixed order by [`SystemBuilder`]:
//!
//! 1. user anchors (`number` and `target`)
//! 2. internal recipe ratios
//! 3. edge perspectives (which variable an edge means from each end)
//! 4. conservation between machines, with auxiliary per-edge variables when
//!    one side of a flow is split across several edges

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use log::{debug, info};

use crate::error::{FlowError, Result};
use crate::graph::{Adjacency, EdgeKey, FlowGraph, NodeId};
use crate::recipe::{IoDirection, Recipe};
use crate::render::format::title_case;

/// Identity of a flow variable.
///
/// `multi` is 0 for the aggregate flow of an ingredient on one side of a
/// machine and counts up from 1 for per-edge auxiliaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarKey {
    pub node: NodeId,
    pub ingredient: String,
    pub direction: IoDirection,
    pub multi: usize,
}

impl fmt::Display for VarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.node, self.ingredient, self.direction, self.multi
        )
    }
}

/// A sparse linear equation `sum(coefficient * variable) = constant`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub terms: Vec<(usize, f64)>,
    pub constant: f64,
}

impl Equation {
    /// `variable = value`
    pub fn pin(variable: usize, value: f64) -> Self {
        Self {
            terms: vec![(variable, 1.0)],
            constant: value,
        }
    }

    /// `left - factor * right = 0`
    pub fn ratio(left: usize, right: usize, factor: f64) -> Self {
        Self {
            terms: vec![(left, 1.0), (right, -factor)],
            constant: 0.0,
        }
    }

    /// `total - sum(parts) = 0`
    pub fn sum(total: usize, parts: &[usize]) -> Self {
        let mut terms = vec![(total, 1.0)];
        terms.extend(parts.iter().map(|&p| (p, -1.0)));
        Self {
            terms,
            constant: 0.0,
        }
    }

    /// Distinct variables in term order.
    pub fn variables(&self) -> Vec<usize> {
        let mut vars: Vec<usize> = Vec::with_capacity(self.terms.len());
        for &(v, _) in &self.terms {
            if !vars.contains(&v) {
                vars.push(v);
            }
        }
        vars
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (var, coef)) in self.terms.iter().enumerate() {
            if i == 0 {
                write!(f, "{}*v{}", coef, var)?;
            } else if *coef < 0.0 {
                write!(f, " - {}*v{}", -coef, var)?;
            } else {
                write!(f, " + {}*v{}", coef, var)?;
            }
        }
        write!(f, " = {}", self.constant)
    }
}

/// Perspective map key: an edge seen from one of its machine endpoints.
pub type Perspective = (EdgeKey, NodeId);

/// An assembled system ready for elimination.
#[derive(Debug, Clone, Default)]
pub struct LinearSystem {
    /// Variable keys by index
    pub variables: Vec<VarKey>,
    pub equations: Vec<Equation>,
    /// Variable standing for each edge at each machine endpoint
    pub perspectives: HashMap<Perspective, usize>,
}

impl LinearSystem {
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Variable for an edge seen from one endpoint.
    pub fn perspective(&self, edge: &EdgeKey, node: NodeId) -> Option<usize> {
        self.perspectives.get(&(edge.clone(), node)).copied()
    }
}

/// The representative flow of a recipe: first input, else first output.
fn representative(node: NodeId, recipe: &Recipe) -> Result<(String, IoDirection, f64)> {
    for dir in IoDirection::BOTH {
        if let Some(&(name, quantity)) = recipe.io(dir).totals().first() {
            return Ok((name.to_string(), dir, quantity));
        }
    }
    Err(FlowError::NoIo {
        node: node.to_string(),
        machine: recipe.machine.clone(),
    })
}

/// Builds a [`LinearSystem`] from a connected, acyclic graph.
///
/// Phases must run in order:
///
/// ```ignore
/// let system = SystemBuilder::new(&graph)
///     .allocate_variables()
///     .add_anchors()?
///     .lock_ratios()?
///     .index_perspectives()
///     .conserve_flows()
///     .build();
/// ```
pub struct SystemBuilder<'g> {
    graph: &'g FlowGraph,
    adjacency: Adjacency,
    system: LinearSystem,
    lookup: HashMap<VarKey, usize>,
}

impl<'g> SystemBuilder<'g> {
    pub fn new(graph: &'g FlowGraph) -> Self {
        Self {
            graph,
            adjacency: graph.adjacency(),
            system: LinearSystem::default(),
            lookup: HashMap::new(),
        }
    }

    /// Index of a variable, minting a new one for an unseen key.
    fn index(&mut self, node: NodeId, ingredient: &str, direction: IoDirection, multi: usize) -> usize {
        let key = VarKey {
            node,
            ingredient: ingredient.to_string(),
            direction,
            multi,
        };
        if let Some(&idx) = self.lookup.get(&key) {
            return idx;
        }
        let idx = self.system.variables.len();
        self.lookup.insert(key.clone(), idx);
        self.system.variables.push(key);
        idx
    }

    fn push(&mut self, equation: Equation) {
        debug!("Equation {}", equation);
        self.system.equations.push(equation);
    }

    /// One variable per distinct ingredient on each side of every machine.
    pub fn allocate_variables(mut self) -> Self {
        let graph = self.graph;
        for node in graph.machine_nodes() {
            let Some(recipe) = graph.recipe(node) else { continue };
            for dir in IoDirection::BOTH {
                for (name, _) in recipe.io(dir).totals() {
                    self.index(node, name, dir, 0);
                }
            }
        }
        self
    }

    /// Pin the flows fixed by `number` and `target`.
    pub fn add_anchors(mut self) -> Result<Self> {
        let graph = self.graph;
        if !graph.recipes().iter().any(Recipe::is_anchored) {
            return Err(FlowError::MissingAnchor);
        }

        for node in graph.machine_nodes() {
            let Some(recipe) = graph.recipe(node) else { continue };
            let Some(number) = recipe.number else { continue };
            let (name, dir, quantity) = representative(node, recipe)?;
            let per_second = quantity * number / recipe.cycle_seconds();
            let var = self.index(node, &name, dir, 0);
            self.push(Equation::pin(var, per_second));
        }

        for node in graph.machine_nodes() {
            let Some(recipe) = graph.recipe(node) else { continue };
            if recipe.targets.is_empty() {
                continue;
            }
            if recipe.targets.len() > 1 {
                return Err(FlowError::MultipleTargets {
                    node: node.to_string(),
                    machine: recipe.machine.clone(),
                    count: recipe.targets.len(),
                });
            }
            let (name, quantity) = &recipe.targets[0];
            let dir = IoDirection::BOTH
                .into_iter()
                .find(|&dir| recipe.io(dir).contains(name))
                .ok_or_else(|| FlowError::TargetNotInRecipe {
                    node: node.to_string(),
                    machine: recipe.machine.clone(),
                    ingredient: name.clone(),
                })?;
            let var = self.index(node, name, dir, 0);
            self.push(Equation::pin(var, *quantity));
        }

        Ok(self)
    }

    /// Tie every flow of a machine to its representative flow.
    pub fn lock_ratios(mut self) -> Result<Self> {
        let graph = self.graph;
        for node in graph.machine_nodes() {
            let Some(recipe) = graph.recipe(node) else { continue };
            let (rep_name, rep_dir, rep_quantity) = representative(node, recipe)?;
            let rep = self.index(node, &rep_name, rep_dir, 0);

            for dir in IoDirection::BOTH {
                for (name, quantity) in recipe.io(dir).totals() {
                    if name == rep_name && dir == rep_dir {
                        continue;
                    }
                    let var = self.index(node, name, dir, 0);
                    let equation = if quantity != 0.0 {
                        Equation::ratio(rep, var, rep_quantity / quantity)
                    } else {
                        Equation::ratio(var, rep, 0.0)
                    };
                    self.push(equation);
                }
            }
        }
        Ok(self)
    }

    /// Record the aggregate variable of every edge at each machine endpoint.
    pub fn index_perspectives(mut self) -> Self {
        let graph = self.graph;
        for edge in graph.edges() {
            let key = &edge.key;
            if key.from.is_machine() {
                let var = self.index(key.from, &key.ingredient, IoDirection::Output, 0);
                self.system.perspectives.entry((key.clone(), key.from)).or_insert(var);
            }
            if key.to.is_machine() {
                let var = self.index(key.to, &key.ingredient, IoDirection::Input, 0);
                self.system.perspectives.entry((key.clone(), key.to)).or_insert(var);
            }
        }
        self
    }

    /// Same-ingredient machine edges reachable through a shared producer
    /// output or consumer input.
    fn cluster(&self, start: &EdgeKey) -> Vec<EdgeKey> {
        let mut cluster: Vec<EdgeKey> = Vec::new();
        let mut seen: HashSet<EdgeKey> = HashSet::new();
        let mut queue: VecDeque<EdgeKey> = VecDeque::from([start.clone()]);

        while let Some(edge) = queue.pop_front() {
            if !seen.insert(edge.clone()) {
                continue;
            }
            let siblings = self
                .adjacency
                .edges(edge.from, IoDirection::Output)
                .iter()
                .chain(self.adjacency.edges(edge.to, IoDirection::Input));
            for sibling in siblings {
                if sibling.ingredient == edge.ingredient
                    && sibling.from.is_machine()
                    && sibling.to.is_machine()
                    && !seen.contains(sibling)
                {
                    queue.push_back(sibling.clone());
                }
            }
            cluster.push(edge);
        }
        cluster
    }

    /// Split an aggregate flow into one auxiliary variable per cluster edge.
    fn split(&mut self, node: NodeId, direction: IoDirection, ingredient: &str, cluster: &[EdgeKey]) {
        let incident: Vec<EdgeKey> = self
            .adjacency
            .edges(node, direction)
            .iter()
            .filter(|e| e.ingredient == ingredient && cluster.contains(e))
            .cloned()
            .collect();

        let total = self.index(node, ingredient, direction, 0);
        let mut parts = Vec::with_capacity(incident.len());
        for (i, edge) in incident.into_iter().enumerate() {
            let aux = self.index(node, ingredient, direction, i + 1);
            self.system.perspectives.insert((edge, node), aux);
            parts.push(aux);
        }

        let kind = match direction {
            IoDirection::Output => "output",
            IoDirection::Input => "input",
        };
        info!("Solving multi-{} scenario involving {}!", kind, title_case(ingredient));
        self.push(Equation::sum(total, &parts));
    }

    /// Conservation between machines sharing an ingredient.
    pub fn conserve_flows(mut self) -> Self {
        let graph = self.graph;
        let mut done: HashSet<EdgeKey> = HashSet::new();

        for edge in graph.edges() {
            let key = &edge.key;
            if done.contains(key) || !key.from.is_machine() || !key.to.is_machine() {
                continue;
            }
            let cluster = self.cluster(key);

            if cluster.len() > 1 {
                let mut degrees: Vec<((NodeId, IoDirection), usize)> = Vec::new();
                for e in &cluster {
                    for side in [(e.from, IoDirection::Output), (e.to, IoDirection::Input)] {
                        match degrees.iter_mut().find(|(s, _)| *s == side) {
                            Some((_, count)) => *count += 1,
                            None => degrees.push((side, 1)),
                        }
                    }
                }
                // most edges first, so auxiliaries exist before they are referenced
                degrees.sort_by(|a, b| b.1.cmp(&a.1));
                for ((node, dir), count) in degrees {
                    if count > 1 {
                        self.split(node, dir, &key.ingredient, &cluster);
                    }
                }
            }

            for e in &cluster {
                let from = self.system.perspective(e, e.from);
                let to = self.system.perspective(e, e.to);
                if let (Some(from), Some(to)) = (from, to) {
                    self.push(Equation::ratio(from, to, 1.0));
                }
            }
            done.extend(cluster);
        }
        self
    }

    pub fn build(self) -> LinearSystem {
        debug!(
            "Built system with {} variables and {} equations",
            self.system.variables.len(),
            self.system.equations.len()
        );
        self.system
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlowConfig;
    use crate::graph::{connect, remove_back_edges};
    use crate::recipe::{Ingredient, IngredientCollection};

    fn recipe(machine: &str, inputs: &[(&str, f64)], outputs: &[(&str, f64)]) -> Recipe {
        let coll = |items: &[(&str, f64)]| -> IngredientCollection {
            items.iter().map(|(n, q)| Ingredient::new(n, *q)).collect()
        };
        Recipe::new(machine, "lv", coll(inputs), coll(outputs), 2.0, 20.0)
    }

    fn graph(recipes: Vec<Recipe>) -> FlowGraph {
        let mut graph = FlowGraph::new(recipes);
        connect(&mut graph, &FlowConfig::default());
        remove_back_edges(&mut graph);
        graph
    }

    fn build(graph: &FlowGraph) -> Result<LinearSystem> {
        Ok(SystemBuilder::new(graph)
            .allocate_variables()
            .add_anchors()?
            .lock_ratios()?
            .index_perspectives()
            .conserve_flows()
            .build())
    }

    #[test]
    fn test_variables_per_distinct_ingredient() {
        let g = graph(vec![recipe(
            "mixer",
            &[("a", 1.0), ("b", 2.0), ("a", 3.0)],
            &[("c", 1.0)],
        )
        .with_number(1.0)]);
        let system = build(&g).unwrap();
        assert_eq!(system.num_variables(), 3);
        assert_eq!(system.variables[0].ingredient, "a");
        assert_eq!(system.variables[2].direction, IoDirection::Output);
        // anchor + two ratios
        assert_eq!(system.equations.len(), 3);
        // a is summed to 4 per cycle of one second
        assert_eq!(system.equations[0], Equation::pin(0, 4.0));
    }

    #[test]
    fn test_split_mints_auxiliaries() {
        let g = graph(vec![
            recipe("mixer", &[("a", 1.0)], &[("b", 2.0)]).with_number(1.0),
            recipe("centrifuge", &[("b", 1.0)], &[("c", 1.0)]),
            recipe("macerator", &[("b", 1.0)], &[("d", 1.0)]),
        ]);
        let system = build(&g).unwrap();
        let aux: Vec<_> = system.variables.iter().filter(|v| v.multi > 0).collect();
        assert_eq!(aux.len(), 2);
        assert!(aux.iter().all(|v| v.node == NodeId::Recipe(0) && v.ingredient == "b"));

        let edge = EdgeKey::new(NodeId::Recipe(0), NodeId::Recipe(2), "b");
        let from_mixer = system.perspective(&edge, NodeId::Recipe(0)).unwrap();
        assert_eq!(system.variables[from_mixer].multi, 2);
        let from_macerator = system.perspective(&edge, NodeId::Recipe(2)).unwrap();
        assert_eq!(system.variables[from_macerator].multi, 0);
    }

    #[test]
    fn test_anchor_errors() {
        let g = graph(vec![recipe("mixer", &[("a", 1.0)], &[("b", 1.0)])]);
        assert!(matches!(build(&g), Err(FlowError::MissingAnchor)));

        let g = graph(vec![recipe("mixer", &[("a", 1.0)], &[("b", 1.0)])
            .with_target("a", 1.0)
            .with_target("b", 1.0)]);
        assert!(matches!(build(&g), Err(FlowError::MultipleTargets { count: 2, .. })));

        let g = graph(vec![recipe("mixer", &[("a", 1.0)], &[("b", 1.0)]).with_target("z", 1.0)]);
        match build(&g) {
            Err(FlowError::TargetNotInRecipe { ingredient, .. }) => assert_eq!(ingredient, "z"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_recipe_without_io() {
        let g = graph(vec![
            recipe("mixer", &[("a", 1.0)], &[("b", 1.0)]).with_number(1.0),
            recipe("empty", &[], &[]),
        ]);
        assert!(matches!(build(&g), Err(FlowError::NoIo { .. })));
    }
}
