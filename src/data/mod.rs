//! Static game data tables.
//!
//! The tables are read-only inputs to the overclock engine and the
//! post-processing steps. A default set for GT: New Horizons ships in
//! `resources/data.toml`; a different file can be loaded with
//! [`GameData::load`].

mod voltage;

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

pub use voltage::VoltageTable;

use crate::error::{FlowError, Result};

const BUILTIN_DATA: &str = include_str!("../../resources/data.toml");

/// A coil tier: heat capacity and speed multiplier.
#[derive(Debug, Clone, Deserialize)]
pub struct Coil {
    pub name: String,
    pub heat: i64,
    pub multiplier: f64,
}

/// Per-machine GT++ bonuses.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(from = "(f64, f64, u32)")]
pub struct GtppStats {
    /// Speed bonus as a fraction (1.25 = 125% faster)
    pub speed_boost: f64,
    /// EU/t multiplier (0.9 = 10% discount)
    pub eu_discount: f64,
    pub parallels_per_tier: u32,
}

impl From<(f64, f64, u32)> for GtppStats {
    fn from((speed_boost, eu_discount, parallels_per_tier): (f64, f64, u32)) -> Self {
        Self {
            speed_boost,
            eu_discount,
            parallels_per_tier,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TurbineMaterial {
    pub mining_speed: f64,
    pub tier: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RotorSize {
    pub multiplier: f64,
    pub efficiency: i32,
}

/// Large turbine tables.
#[derive(Debug, Clone, Deserialize)]
pub struct TurbineData {
    pub materials: BTreeMap<String, TurbineMaterial>,
    pub rotor_size: BTreeMap<String, RotorSize>,
    /// Fuel type (`gas_fuels`, `steam_fuels`) -> fuel -> EU per litre
    pub fuels: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Single-block generator tables used by power line synthesis.
#[derive(Debug, Clone, Deserialize)]
pub struct PowerData {
    pub turbine_fuels: BTreeMap<String, f64>,
    pub combustion_fuels: BTreeMap<String, f64>,
    pub semifluids: BTreeMap<String, f64>,
    pub rocket_fuels: BTreeMap<String, f64>,
    pub naqline_fuels: BTreeMap<String, f64>,
    /// Generator -> voltage tier -> efficiency
    pub simple_generator_efficiencies: BTreeMap<String, BTreeMap<String, f64>>,
}

/// All static tables consumed by the balancer.
#[derive(Debug, Clone, Deserialize)]
pub struct GameData {
    pub voltage: VoltageTable,
    pub coils: Vec<Coil>,
    pub pipe_casings: BTreeMap<String, f64>,
    pub gtpp_stats: BTreeMap<String, GtppStats>,
    pub turbine: TurbineData,
    pub power: PowerData,
    #[serde(default)]
    pub special_machine_weights: BTreeMap<String, f64>,
}

impl GameData {
    /// The bundled GT: New Horizons tables.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_DATA)
    }

    /// Parse tables from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| FlowError::config(format!("game data: {}", e)))
    }

    /// Load tables from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| FlowError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&text)
    }

    /// Look up a coil and its position in the coil order.
    pub fn coil(&self, name: &str) -> Option<(usize, &Coil)> {
        self.coils.iter().enumerate().find(|(_, c)| c.name == name)
    }

    pub fn coil_names(&self) -> impl Iterator<Item = &str> {
        self.coils.iter().map(|c| c.name.as_str())
    }
}
