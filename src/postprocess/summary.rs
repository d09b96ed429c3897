//! Net I/O and power totals for the summary node.

use log::debug;

use crate::config::FlowConfig;
use crate::data::GameData;
use crate::error::Result;
use crate::graph::{FlowGraph, NodeId, NodeStyle};
use crate::recipe::IoDirection;
use crate::render::format::{ingredient_id, ingredient_label, round2, round_readable};

/// Net flows smaller than this are floating point noise.
const NEAR_ZERO: f64 = 1e-5;

/// How power figures are shown: raw EU/t or amps of a voltage tier.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerUnit {
    pub divisor: f64,
    /// Upper-case tier name, `None` for EU/t
    pub tier: Option<String>,
}

impl PowerUnit {
    /// Resolve the `power_units` setting; `auto` uses `auto_tier`.
    pub fn resolve(config: &FlowConfig, data: &GameData, auto_tier: usize) -> Result<Self> {
        let tier = match config.power_units.as_str() {
            "eut" => {
                return Ok(Self {
                    divisor: 1.0,
                    tier: None,
                })
            }
            "auto" => auto_tier,
            name => data.voltage.index(name)?,
        };
        Ok(Self {
            divisor: data.voltage.voltage(tier),
            tier: Some(data.voltage.name(tier).to_uppercase()),
        })
    }

    /// Readable value, with the tier appended when showing amps.
    pub fn format(&self, eut: f64) -> String {
        let value = round_readable(eut / self.divisor);
        match &self.tier {
            Some(tier) => format!("{} {}", value, tier),
            None => value,
        }
    }

    /// Like [`PowerUnit::format`] but spelling out `EU/t`.
    pub fn label(&self, eut: f64) -> String {
        match &self.tier {
            Some(_) => self.format(eut),
            None => format!("{} EU/t", self.format(eut)),
        }
    }
}

/// One net ingredient flow of the whole chart; negative is consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub id: String,
    pub label: String,
    pub quantity: f64,
}

/// Chart totals shown in the summary node.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Net flows per second, most consumed first, EU excluded
    pub rows: Vec<SummaryRow>,
    /// Total amortized draw in EU/t, negative
    pub input_eut: f64,
    /// EU/t produced by power line generators
    pub output_eut: Option<f64>,
    /// Machine count with special machine weights applied
    pub machine_count: f64,
    /// Amps of `peak_tier` with every machine running at once
    pub peak_draw: f64,
    pub peak_tier: String,
    pub unit: PowerUnit,
}

impl Summary {
    pub fn net_eut(&self) -> Option<f64> {
        self.output_eut.map(|out| out + self.input_eut)
    }
}

/// Compute the summary of a solved, multiplied graph.
pub fn summarize(graph: &FlowGraph, config: &FlowConfig, data: &GameData) -> Result<Summary> {
    let adjacency = graph.adjacency();

    let mut totals: Vec<SummaryRow> = Vec::new();
    let sides = [
        (NodeId::Source, IoDirection::Output, -1.0),
        (NodeId::Sink, IoDirection::Input, 1.0),
    ];
    for (node, dir, sign) in sides {
        for key in adjacency.edges(node, dir) {
            let id = ingredient_id(&key.ingredient);
            let quantity = sign * graph.quantity(key);
            match totals.iter_mut().find(|row| row.id == id) {
                Some(row) => {
                    row.label = ingredient_label(&key.ingredient);
                    row.quantity += quantity;
                }
                None => totals.push(SummaryRow {
                    id,
                    label: ingredient_label(&key.ingredient),
                    quantity,
                }),
            }
        }
    }

    let output_eut = totals
        .iter()
        .find(|row| row.id == "eu")
        .map(|row| (row.quantity / 20.0).floor());
    let mut rows: Vec<SummaryRow> = totals
        .into_iter()
        .filter(|row| row.id != "eu" && row.quantity.abs() >= NEAR_ZERO)
        .collect();
    rows.sort_by(|a, b| a.quantity.total_cmp(&b.quantity));

    let total_eut: f64 = graph.recipes().iter().map(|r| r.eut).sum();
    let input_eut = -total_eut.ceil();

    let mut max_tier = 0;
    for recipe in graph.recipes() {
        max_tier = max_tier.max(data.voltage.index(&recipe.user_voltage)?);
    }

    let machine_count: f64 = graph
        .recipes()
        .iter()
        .map(|r| {
            let weight = data.special_machine_weights.get(&r.machine).copied().unwrap_or(1.0);
            r.multiplier().unwrap_or_default() * weight
        })
        .sum();

    let max_draw: f64 = graph
        .recipes()
        .iter()
        .map(|r| r.base_eut * r.multiplier().unwrap_or_default().ceil())
        .sum();

    let summary = Summary {
        rows,
        input_eut,
        output_eut,
        machine_count,
        peak_draw: round2(max_draw / data.voltage.voltage(max_tier)),
        peak_tier: data.voltage.name(max_tier).to_uppercase(),
        unit: PowerUnit::resolve(config, data, max_tier)?,
    };
    debug!("{:?}", summary);
    Ok(summary)
}

/// Compute the summary and add its node to the graph.
pub fn add_summary_node(graph: &mut FlowGraph, config: &FlowConfig, data: &GameData) -> Result<Summary> {
    let summary = summarize(graph, config, data)?;
    graph.add_node(
        NodeId::Summary,
        NodeStyle::labelled("Summary")
            .with_color(&config.summary_color)
            .with_fill(&config.background_color)
            .with_shape("box"),
    );
    Ok(summary)
}
