//! GT++ multiblocks: parallel search followed by internal overclocks.

use log::debug;

use super::Overclocker;
use crate::data::GtppStats;
use crate::error::{FlowError, Result};
use crate::recipe::Recipe;

/// Result of fitting as many parallels as the tier's energy allows.
pub(super) struct Parallels {
    pub available_eut: f64,
    pub total_eut: f64,
    pub duration: f64,
    pub count: f64,
}

impl<'a> Overclocker<'a> {
    pub(super) fn gtpp_stats(&self, recipe: &Recipe) -> Result<GtppStats> {
        self.data
            .gtpp_stats
            .get(&recipe.machine)
            .copied()
            .ok_or_else(|| FlowError::MissingOverclockData {
                machine: recipe.machine.clone(),
            })
    }

    /// Parallel step shared by the GT++ table models.
    pub(super) fn fit_parallels(
        &self,
        recipe: &Recipe,
        eut_per_parallel: f64,
        max_parallels: f64,
        duration: f64,
    ) -> Result<Parallels> {
        let tier = self.user_tier(recipe)?;
        let available_eut = self.available_eut(tier);
        let count = (available_eut / eut_per_parallel).floor().min(max_parallels);
        if count < 1.0 {
            return Err(FlowError::NegativeOverclock {
                machine: recipe.machine.clone(),
                base: self
                    .data
                    .voltage
                    .name(self.data.voltage.tier_for_eut(eut_per_parallel))
                    .to_string(),
                requested: recipe.user_voltage.clone(),
            });
        }
        let total_eut = eut_per_parallel * count;

        debug!(
            "Base GT++ OC stats: available_eut={} max_parallels={} duration={} total_eut={} parallels={}",
            available_eut, max_parallels, duration, total_eut, count
        );

        Ok(Parallels {
            available_eut,
            total_eut,
            duration,
            count,
        })
    }

    /// Double energy and halve duration while the budget allows.
    fn internal_overclocks(&self, mut p: Parallels, min_duration: f64) -> Parallels {
        while p.total_eut < p.available_eut {
            let oc_eut = p.total_eut * 4.0;
            let oc_dur = p.duration / 2.0;
            if oc_eut > p.available_eut || oc_dur < min_duration {
                break;
            }
            debug!("OC to eut={} dur={}", oc_eut, oc_dur);
            p.total_eut = oc_eut;
            p.duration = oc_dur;
        }
        p
    }

    pub(super) fn gtpp(&self, mut recipe: Recipe) -> Result<Recipe> {
        let stats = self.gtpp_stats(&recipe)?;
        let tier = self.user_tier(&recipe)?;
        let speed = 1.0 / (stats.speed_boost + 1.0);
        let max_parallels = ((tier + 1) as u32 * stats.parallels_per_tier) as f64;
        let duration = (recipe.dur * speed).max(1.0);

        let p = self.fit_parallels(&recipe, recipe.eut * stats.eu_discount, max_parallels, duration)?;
        let p = self.internal_overclocks(p, 1.0);

        recipe.eut = p.total_eut;
        recipe.dur = p.duration;
        recipe.scale_io(p.count);
        Ok(recipe)
    }

    pub(super) fn gtpp_custom(
        &self,
        mut recipe: Recipe,
        max_parallels: u32,
        speed_per_tier: f64,
    ) -> Result<Recipe> {
        let tier = self.user_tier(&recipe)?;
        let duration = round2(recipe.dur * speed_per_tier.powi(tier as i32 + 1));

        let p = self.fit_parallels(&recipe, recipe.eut, max_parallels as f64, duration)?;
        let p = self.internal_overclocks(p, 20.0);

        recipe.eut = p.total_eut;
        recipe.dur = p.duration;
        recipe.scale_io(p.count);
        Ok(recipe)
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
