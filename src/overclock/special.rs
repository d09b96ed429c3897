//! Machines with their own scaling rules.

use super::Overclocker;
use crate::error::{FlowError, Result};
use crate::recipe::{Ingredient, IngredientCollection, Recipe};

const FUSION_REASON: &str =
    "overclocking fusion. mk = actual mark run at, start = base mk. (eg mk=3, start=2)";

const SAW_MULTIPLIERS: &[(&str, f64)] = &[("saw", 1.0), ("buzzsaw", 2.0), ("chainsaw", 4.0)];

impl<'a> Overclocker<'a> {
    /// Fusion ignores the tier and overclocks by reactor mark.
    pub(super) fn fusion(&self, mut recipe: Recipe) -> Result<Recipe> {
        let mk = recipe.require_int("mk", FUSION_REASON)?;
        let start = recipe.require_int("start", FUSION_REASON)?;
        let oc = mk - start;
        if oc < 0 {
            return Err(FlowError::NegativeOverclock {
                machine: recipe.machine.clone(),
                base: format!("MK{}", start),
                requested: format!("MK{}", mk),
            });
        }

        let bonus = if mk == 4 && oc > 0 { 2.0 } else { 1.0 };
        let factor = 2f64.powi(oc as i32) * bonus;
        recipe.eut *= factor;
        recipe.dur /= factor;
        recipe.user_voltage = self
            .data
            .voltage
            .name(self.data.voltage.tier_for_eut(recipe.eut))
            .to_string();
        recipe.machine = format!("MK{} {}", mk, recipe.machine);
        Ok(recipe)
    }

    pub(super) fn zhuhai(&self, recipe: Recipe) -> Result<Recipe> {
        let mut recipe = self.standard(recipe)?;
        let parallels = (self.user_tier(&recipe)? + 2) * 2;
        recipe.outputs.scale(parallels as f64);
        Ok(recipe)
    }

    /// Output is recomputed from the tier, not scaled from the declared output.
    pub(super) fn tree_growth_simulator(&self, mut recipe: Recipe) -> Result<Recipe> {
        let saw = recipe.require_text(
            "saw_type",
            "calculating throughput of TGS (eg \"saw\", \"buzzsaw\")",
        )?;
        let saw_multiplier = SAW_MULTIPLIERS
            .iter()
            .find(|(name, _)| *name == saw)
            .map(|(_, m)| *m)
            .ok_or_else(|| {
                FlowError::unknown_value(
                    &recipe.machine,
                    "saw_type",
                    saw,
                    SAW_MULTIPLIERS.iter().map(|(name, _)| *name),
                )
            })?;
        if recipe.outputs.len() > 1 {
            return Err(FlowError::UnsupportedOverclock {
                machine: recipe.machine.clone(),
                message: "automatic TGS overclocking only supports a single output".to_string(),
            });
        }

        let tier = self.user_tier(&recipe)?;
        let t = (tier + 1) as f64;
        let base_output = (2.0 * t * t - 2.0 * t + 5.0) * 5.0;
        let wood = recipe
            .outputs
            .first()
            .map(|ing| ing.name.clone())
            .unwrap_or_else(|| "wood".to_string());

        recipe.outputs = IngredientCollection::new(vec![Ingredient::new(wood, base_output * saw_multiplier)]);
        recipe.eut = self.data.voltage.voltage(tier);
        recipe.dur = (100.0 / 2f64.powi(tier as i32)).max(1.0);
        Ok(recipe)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{data, recipe};
    use super::*;
    use crate::recipe::AttrValue;
    use approx::assert_relative_eq;

    #[test]
    fn test_fusion_mark_overclock() {
        let data = data();
        let rec = recipe("fusion reactor", "luv", 30000.0, 64.0)
            .with_attr("mk", AttrValue::Int(3))
            .with_attr("start", AttrValue::Int(2));
        let rec = Overclocker::new(&data).overclock(rec).unwrap();
        assert_relative_eq!(rec.eut, 60000.0);
        assert_relative_eq!(rec.dur, 32.0);
        assert_eq!(rec.machine, "MK3 fusion reactor");
        assert_eq!(rec.user_voltage, "zpm");
    }

    #[test]
    fn test_fusion_mk4_bonus() {
        let data = data();
        let rec = recipe("fusion reactor", "zpm", 10000.0, 64.0)
            .with_attr("mk", AttrValue::Int(4))
            .with_attr("start", AttrValue::Int(3));
        let rec = Overclocker::new(&data).overclock(rec).unwrap();
        assert_relative_eq!(rec.eut, 40000.0);
        assert_relative_eq!(rec.dur, 16.0);
    }

    #[test]
    fn test_fusion_below_start_mark() {
        let data = data();
        let rec = recipe("fusion reactor", "zpm", 10000.0, 64.0)
            .with_attr("mk", AttrValue::Int(1))
            .with_attr("start", AttrValue::Int(2));
        assert!(matches!(
            Overclocker::new(&data).overclock(rec),
            Err(FlowError::NegativeOverclock { .. })
        ));
    }

    #[test]
    fn test_tgs_replaces_output() {
        let data = data();
        let rec = recipe("tree growth simulator", "hv", 0.0, 1.0)
            .with_attr("saw_type", AttrValue::Text("buzzsaw".into()));
        let rec = Overclocker::new(&data).overclock(rec).unwrap();
        // t = 3: (18 - 6 + 5) * 5 = 85, buzzsaw doubles it
        assert_eq!(rec.outputs.quantities("output"), vec![170.0]);
        assert_relative_eq!(rec.eut, 512.0);
        assert_relative_eq!(rec.dur, 25.0);
    }

    #[test]
    fn test_tgs_unknown_saw() {
        let data = data();
        let rec = recipe("tree growth simulator", "hv", 0.0, 1.0)
            .with_attr("saw_type", AttrValue::Text("axe".into()));
        assert!(matches!(
            Overclocker::new(&data).overclock(rec),
            Err(FlowError::UnknownValue { .. })
        ));
    }

    #[test]
    fn test_zhuhai_output_parallels() {
        let data = data();
        let rec = Overclocker::new(&data)
            .overclock(recipe("zhuhai", "lv", 8.0, 100.0))
            .unwrap();
        assert_relative_eq!(rec.outputs.quantities("output")[0], 4.0);
        assert_relative_eq!(rec.inputs.quantities("input")[0], 2.0);
    }
}
