//! Power line: burn leftover fuels in single-block generators.
//!
//! Every fuel flowing into the sink is rerouted through a synthesized
//! generator recipe sized to the exact fuel flow. The generator runs at the
//! highest tier on the chart, or the nearest tier its efficiency table
//! covers, and sends the produced EU to the sink.

use std::collections::{BTreeMap, HashMap};

use log::{debug, info};

use crate::config::FlowConfig;
use crate::data::{GameData, PowerData};
use crate::error::{FlowError, Result};
use crate::graph::{Edge, EdgeKey, FlowGraph, NodeId, NodeStyle};
use crate::recipe::{AttrValue, Ingredient, IngredientCollection, IoDirection, Recipe};
use crate::render::format::{round2, round_readable, title_case};

/// EU per 1000 L of steam in a steam turbine.
const STEAM_EU_PER_CELL: f64 = 500.0;

type Burnables = HashMap<String, (&'static str, f64)>;

fn insert_fuels(burnables: &mut Burnables, generator: &'static str, table: &BTreeMap<String, f64>) {
    for (fuel, eu_per_cell) in table {
        burnables.insert(fuel.clone(), (generator, *eu_per_cell));
    }
}

/// Fuel name -> (generator, EU per 1000 L). Later tables take precedence.
pub fn known_burnables(power: &PowerData) -> Burnables {
    let mut burnables = Burnables::new();
    insert_fuels(&mut burnables, "gas turbine", &power.turbine_fuels);
    insert_fuels(&mut burnables, "combustion gen", &power.combustion_fuels);
    insert_fuels(&mut burnables, "semifluid gen", &power.semifluids);
    burnables.insert("steam".to_string(), ("steam turbine", STEAM_EU_PER_CELL));
    insert_fuels(&mut burnables, "rocket engine", &power.rocket_fuels);
    insert_fuels(&mut burnables, "large naquadah reactor", &power.naqline_fuels);
    burnables
}

/// Tier and efficiency a generator runs at on a chart whose highest tier is
/// `target`: the highest tier it supports at or below `target`, else its
/// lowest tier.
pub fn generator_tier(data: &GameData, generator: &str, target: usize) -> Result<(usize, f64)> {
    let table = data
        .power
        .simple_generator_efficiencies
        .get(generator)
        .ok_or_else(|| FlowError::MissingOverclockData {
            machine: generator.to_string(),
        })?;

    let mut tiers = table
        .iter()
        .map(|(tier, eff)| data.voltage.index(tier).map(|idx| (idx, *eff)))
        .collect::<Result<Vec<_>>>()?;
    tiers.sort_by_key(|(idx, _)| *idx);

    tiers
        .iter()
        .rev()
        .find(|(idx, _)| *idx <= target)
        .or_else(|| tiers.first())
        .copied()
        .ok_or_else(|| FlowError::MissingOverclockData {
            machine: generator.to_string(),
        })
}

/// Reroute burnable sink flows through generator nodes.
pub fn add_power_line(graph: &mut FlowGraph, config: &FlowConfig, data: &GameData) -> Result<()> {
    let burnables = known_burnables(&data.power);

    let mut highest = 0;
    for recipe in graph.recipes() {
        highest = highest.max(data.voltage.index(&recipe.user_voltage)?);
    }

    let sink_inputs: Vec<EdgeKey> = graph
        .adjacency()
        .edges(NodeId::Sink, IoDirection::Input)
        .to_vec();

    for key in sink_inputs {
        let Some(&(generator, eu_per_cell)) = burnables.get(&key.ingredient) else {
            continue;
        };
        if config.is_unburnable(&key.ingredient) {
            continue;
        }
        info!("Detected burnable: {}! Adding to chart.", title_case(&key.ingredient));

        let (tier, efficiency) = generator_tier(data, generator, highest)?;
        let output_eut = data.voltage.voltage(tier);
        let loss = 2f64.powi(tier as i32 + 1);
        let fuel_per_tick = (output_eut + loss) / (eu_per_cell / 1000.0 * efficiency);

        let Some(old) = graph.remove_edge(&key) else { continue };
        let produced = old.quantity / fuel_per_tick * output_eut;
        debug!(
            "Added {} generator burning {} {} for {}EU/t at {}EU/t each.",
            data.voltage.name(tier),
            old.quantity,
            key.ingredient,
            round_readable(produced / 20.0),
            output_eut
        );

        let recipe = Recipe::new(
            generator,
            data.voltage.name(tier),
            IngredientCollection::new(vec![Ingredient::new(&key.ingredient, fuel_per_tick)]),
            IngredientCollection::new(vec![Ingredient::new("EU", output_eut)]),
            0.0,
            1.0,
        )
        .with_attr("efficiency", AttrValue::Text(format!("{}%", round2(efficiency * 100.0))))
        .with_attr("wasted_fuel", AttrValue::Text(format!("{}EU/t/amp", round_readable(loss))));

        let node = graph.push_recipe(recipe);
        graph.add_node(
            node,
            NodeStyle::labelled(title_case(generator))
                .with_fill(&config.nonlocked_node_color)
                .with_shape("box"),
        );
        graph.insert_edge(Edge {
            key: EdgeKey::new(key.from, node, key.ingredient.clone()),
            ..old
        });
        graph.add_edge(node, NodeId::Sink, "EU", produced);
    }
    Ok(())
}
