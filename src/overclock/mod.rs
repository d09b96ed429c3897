//! Overclock engine.
//!
//! Rescales a recipe's energy, duration and sometimes its I/O to match the
//! voltage tier the user actually runs the machine at. Each machine belongs to
//! one [`MachineFamily`]; the family decides which physics model applies.
//!
//! The common model gains one overclock per tier above the recipe's minimum
//! tier: energy is multiplied by 4 and duration halved. Running below the
//! minimum tier is never silently allowed.

mod family;
mod gtpp;
mod heat;
mod special;
mod turbine;

pub use family::{canonical_machine_name, MachineFamily, TurbineFuel};

use log::debug;

use crate::data::{Coil, GameData};
use crate::error::{FlowError, Result};
use crate::recipe::Recipe;

/// Applies machine-specific overclocks using the game data tables.
pub struct Overclocker<'a> {
    data: &'a GameData,
}

impl<'a> Overclocker<'a> {
    pub fn new(data: &'a GameData) -> Self {
        Self { data }
    }

    /// Overclock a recipe to its user voltage.
    ///
    /// Recipes flagged `do_not_overclock` are returned unchanged. Otherwise
    /// `base_eut` is set to the per-machine energy after overclocking.
    pub fn overclock(&self, recipe: Recipe) -> Result<Recipe> {
        if recipe.skips_overclock() {
            return Ok(recipe);
        }

        let family = MachineFamily::of(&recipe.machine);
        debug!("Overclocking {} as {:?}", recipe.machine, family);

        let mut recipe = match family {
            MachineFamily::Standard => self.standard(recipe)?,
            MachineFamily::Perfect => self.perfect(recipe)?,
            MachineFamily::BlastFurnace => self.blast_furnace(recipe)?,
            MachineFamily::PyrolyseOven => self.pyrolyse_oven(recipe)?,
            MachineFamily::MultiSmelter => self.multi_smelter(recipe)?,
            MachineFamily::Fusion => self.fusion(recipe)?,
            MachineFamily::Turbine { fuel, xl } => self.turbine(recipe, fuel, xl)?,
            MachineFamily::GtPlusPlus => self.gtpp(recipe)?,
            MachineFamily::GtPlusPlusCustom {
                max_parallels,
                speed_per_tier,
            } => self.gtpp_custom(recipe, max_parallels, speed_per_tier)?,
            MachineFamily::ChemicalPlant => self.chemical_plant(recipe)?,
            MachineFamily::Zhuhai => self.zhuhai(recipe)?,
            MachineFamily::TreeGrowthSimulator => self.tree_growth_simulator(recipe)?,
            MachineFamily::Dehydrator => self.dehydrator(recipe)?,
        };
        recipe.base_eut = recipe.eut;
        Ok(recipe)
    }

    /// Overclock every recipe of a project.
    pub fn overclock_all(&self, recipes: Vec<Recipe>) -> Result<Vec<Recipe>> {
        recipes.into_iter().map(|r| self.overclock(r)).collect()
    }

    /// Number of standard overclocks from the recipe's minimum tier.
    fn overclock_count(&self, recipe: &Recipe, eut: f64) -> Result<i32> {
        let user = self.data.voltage.index(&recipe.user_voltage)?;
        let base = self.data.voltage.tier_for_eut(eut);
        if user < base {
            return Err(FlowError::NegativeOverclock {
                machine: recipe.machine.clone(),
                base: self.data.voltage.name(base).to_string(),
                requested: recipe.user_voltage.clone(),
            });
        }
        Ok((user - base) as i32)
    }

    fn user_tier(&self, recipe: &Recipe) -> Result<usize> {
        self.data.voltage.index(&recipe.user_voltage)
    }

    /// Maximum EU/t available at a tier (cutoff inclusive of the tier voltage).
    fn available_eut(&self, tier: usize) -> f64 {
        self.data.voltage.voltage(tier) + 1.0
    }

    fn coil(&self, recipe: &Recipe, reason: &str) -> Result<(usize, &'a Coil)> {
        let name = recipe.require_text("coils", reason)?;
        self.data.coil(name).ok_or_else(|| {
            FlowError::unknown_value(&recipe.machine, "coils", name, self.data.coil_names())
        })
    }

    fn standard(&self, mut recipe: Recipe) -> Result<Recipe> {
        let k = self.overclock_count(&recipe, recipe.eut)?;
        recipe.eut *= 4f64.powi(k);
        recipe.dur /= 2f64.powi(k);
        Ok(recipe)
    }

    fn perfect(&self, mut recipe: Recipe) -> Result<Recipe> {
        let k = self.overclock_count(&recipe, recipe.eut)?;
        recipe.eut *= 4f64.powi(k);
        recipe.dur /= 4f64.powi(k);
        Ok(recipe)
    }
}

/// Overclock a project's recipes with the given tables.
pub fn overclock_recipes(recipes: Vec<Recipe>, data: &GameData) -> Result<Vec<Recipe>> {
    Overclocker::new(data).overclock_all(recipes)
}
