//! Coil-based machines: blast furnace, pyrolyse oven, multi smelter,
//! chemical plant and industrial dehydrator.

use super::Overclocker;
use crate::error::{FlowError, Result};
use crate::recipe::Recipe;

const COILS_HEAT_REASON: &str = "calculating heat and perfect OCs for recipes (eg \"nichrome\")";
const HEAT_REASON: &str = "calculating perfect OCs and heat requirement (eg \"4300\")";

/// Heat bonus overclocks: EU discount factor and number of perfect overclocks.
struct HeatBonus {
    eut_factor: f64,
    perfect_ocs: i32,
}

impl HeatBonus {
    fn new(recipe: &Recipe, available_heat: i64, required_heat: i64) -> Result<Self> {
        let excess = available_heat - required_heat;
        if excess < 0 {
            return Err(FlowError::UnsupportedOverclock {
                machine: recipe.machine.clone(),
                message: format!(
                    "coil heat {}K is below the recipe heat {}K",
                    available_heat, required_heat
                ),
            });
        }
        Ok(Self {
            eut_factor: 0.95f64.powi((excess / 900) as i32),
            perfect_ocs: (excess / 1800) as i32,
        })
    }

    /// Duration divisor for `oc_count` overclocks.
    fn speedup(&self, oc_count: i32) -> f64 {
        2f64.powi(oc_count) * 2f64.powi(self.perfect_ocs.min(oc_count))
    }
}

impl<'a> Overclocker<'a> {
    pub(super) fn blast_furnace(&self, mut recipe: Recipe) -> Result<Recipe> {
        let (_, coil) = self.coil(&recipe, COILS_HEAT_REASON)?;
        let heat = recipe.require_int("heat", HEAT_REASON)?;
        let k = self.overclock_count(&recipe, recipe.eut)?;

        // +100K per voltage tier above MV
        let user = self.user_tier(&recipe)? as i64;
        let bonus = HeatBonus::new(&recipe, coil.heat + 100 * (user - 1).max(0), heat)?;

        recipe.eut *= 4f64.powi(k) * bonus.eut_factor;
        recipe.dur /= bonus.speedup(k);
        Ok(recipe)
    }

    pub(super) fn pyrolyse_oven(&self, mut recipe: Recipe) -> Result<Recipe> {
        let (_, coil) = self.coil(&recipe, "calculating recipe time (eg \"nichrome\")")?;
        let k = self.overclock_count(&recipe, recipe.eut)?;
        recipe.eut *= 4f64.powi(k);
        recipe.dur = recipe.dur / 2f64.powi(k) / coil.multiplier;
        Ok(recipe)
    }

    pub(super) fn multi_smelter(&self, mut recipe: Recipe) -> Result<Recipe> {
        let (coil_idx, _) = self.coil(&recipe, COILS_HEAT_REASON)?;
        recipe.eut = 4.0;
        recipe.dur = 500.0;
        let mut recipe = self.standard(recipe)?;
        let batch_size = 8.0 * 2f64.powi(coil_idx.max(4) as i32);
        recipe.scale_io(batch_size);
        Ok(recipe)
    }

    pub(super) fn chemical_plant(&self, mut recipe: Recipe) -> Result<Recipe> {
        let (_, coil) = self.coil(&recipe, "calculating recipe duration (eg \"nichrome\")")?;
        let casing = recipe.require_text(
            "pipe_casings",
            "calculating throughput multiplier (eg \"steel\")",
        )?;
        let throughput = *self.data.pipe_casings.get(casing).ok_or_else(|| {
            FlowError::unknown_value(
                &recipe.machine,
                "pipe_casings",
                casing,
                self.data.pipe_casings.keys(),
            )
        })?;

        recipe.dur /= coil.multiplier;
        recipe.scale_io(throughput);
        self.standard(recipe)
    }

    pub(super) fn dehydrator(&self, mut recipe: Recipe) -> Result<Recipe> {
        let (_, coil) = self.coil(&recipe, COILS_HEAT_REASON)?;
        let heat = recipe.require_int("heat", HEAT_REASON)?;
        let stats = self.gtpp_stats(&recipe)?;
        let tier = self.user_tier(&recipe)?;

        let speed = 1.0 / (stats.speed_boost + 1.0);
        let max_parallels = ((tier + 1) as u32 * stats.parallels_per_tier) as f64;
        let duration = (recipe.dur * speed).max(1.0);
        let p = self.fit_parallels(&recipe, recipe.eut * stats.eu_discount, max_parallels, duration)?;

        // The parallel set overclocks as one EBF-style recipe, without the tier heat bonus
        let k = self.overclock_count(&recipe, p.total_eut)?;
        let bonus = HeatBonus::new(&recipe, coil.heat, heat)?;

        recipe.eut = p.total_eut * 4f64.powi(k) * bonus.eut_factor;
        recipe.dur = p.duration / bonus.speedup(k);
        recipe.scale_io(p.count);
        Ok(recipe)
    }
}
