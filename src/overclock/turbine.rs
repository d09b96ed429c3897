//! Large turbines: optimal fuel flow and EU output.

use super::{Overclocker, TurbineFuel};
use crate::error::{FlowError, Result};
use crate::recipe::{AttrValue, Ingredient, IngredientCollection, Recipe};

impl<'a> Overclocker<'a> {
    /// Replace the recipe with the turbine's steady-state burn.
    ///
    /// Energy and duration become `0` and `1`; outputs are the produced EU
    /// (and recycled distilled water for steam).
    pub(super) fn turbine(&self, mut recipe: Recipe, fuel_type: TurbineFuel, xl: bool) -> Result<Recipe> {
        let material = recipe
            .require_text("material", "calculating power output (eg \"infinity\")")?
            .to_lowercase();
        let size = recipe
            .require_text("size", "calculating power output (eg \"large\")")?
            .to_lowercase();
        if recipe.attrs.contains_key("flow") {
            return Err(FlowError::UnsupportedOverclock {
                machine: recipe.machine.clone(),
                message: "specifying \"flow\" is not implemented".to_string(),
            });
        }

        let turbine = &self.data.turbine;
        let fuel = recipe
            .inputs
            .first()
            .map(|ing| ing.name.clone())
            .ok_or_else(|| FlowError::UnsupportedOverclock {
                machine: recipe.machine.clone(),
                message: "turbine needs its fuel as the first input".to_string(),
            })?;
        let fuels = turbine.fuels.get(fuel_type.table_key()).ok_or_else(|| {
            FlowError::config(format!("game data has no turbine fuel table \"{}\"", fuel_type.table_key()))
        })?;
        let burn_value = *fuels
            .get(&fuel)
            .ok_or_else(|| FlowError::unknown_value(&recipe.machine, "fuel", &fuel, fuels.keys()))?;
        let mat = turbine.materials.get(&material).ok_or_else(|| {
            FlowError::unknown_value(&recipe.machine, "material", &material, turbine.materials.keys())
        })?;
        let rotor = turbine.rotor_size.get(&size).ok_or_else(|| {
            FlowError::unknown_value(&recipe.machine, "size", &size, turbine.rotor_size.keys())
        })?;

        let optimal_eut = mat.mining_speed * rotor.multiplier * 50.0;
        let efficiency = mat.tier as i64 * 10 + 100 + rotor.efficiency as i64;
        let flow = (optimal_eut / burn_value).floor();
        let output_eut = (flow * burn_value * efficiency as f64 / 100.0).floor();

        let mut outputs = vec![Ingredient::new("EU", output_eut)];
        if fuel_type == TurbineFuel::Steam {
            outputs.push(Ingredient::new("(recycle) distilled water", (flow / 160.0).floor()));
        }

        recipe.eut = 0.0;
        recipe.dur = 1.0;
        if let Some(first) = recipe.inputs.first_mut() {
            first.quantity = flow;
        }
        recipe.outputs = IngredientCollection::new(outputs);
        recipe
            .attrs
            .insert("efficiency".to_string(), AttrValue::Text(format!("{}%", efficiency)));

        if xl {
            recipe.scale_io(16.0);
        }
        Ok(recipe)
    }
}
