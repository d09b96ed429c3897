//! Run configuration.
//!
//! [`FlowConfig`] collects every knob that changes how a project is loaded,
//! post-processed or drawn. All keys are optional in the TOML file; missing
//! keys take the defaults below.
//!
//! ```toml
//! dur_format = "sec"
//! power_line = true
//! do_not_burn = ["hydrogen"]
//! orientation = "LR"
//! power_units = "auto"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::data::GameData;
use crate::error::{FlowError, Result};

/// Unit of the `dur` values in a project file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurFormat {
    Ticks,
    Sec,
}

/// Graphviz rank direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Orientation {
    TB,
    LR,
    BT,
    RL,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::TB => "TB",
            Orientation::LR => "LR",
            Orientation::BT => "BT",
            Orientation::RL => "RL",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub dur_format: DurFormat,
    /// Burn leftover fuels in synthesized generators
    pub power_line: bool,
    /// Fuels the power line must never burn
    pub do_not_burn: Vec<String>,
    pub combine_inputs: bool,
    pub combine_outputs: bool,
    pub show_machine_indices: bool,
    /// Drop `[tag]` prefixes from ingredient names in labels
    pub strip_brackets: bool,
    pub orientation: Orientation,
    /// `auto`, `eut`, or a voltage tier name
    pub power_units: String,
    pub print_bottlenecks: bool,
    pub max_bottlenecks: usize,
    pub use_rainbow_edges: bool,
    pub edge_colors: Vec<String>,
    pub background_color: String,
    pub title_color: String,
    pub summary_color: String,
    pub sourcesink_color: String,
    pub nonlocked_node_color: String,
    pub locked_node_color: String,
    pub positive_color: String,
    pub negative_color: String,
    pub general_font: String,
    pub node_fontsize: u32,
    pub edge_fontsize: u32,
    pub debug_logging: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            dur_format: DurFormat::Ticks,
            power_line: false,
            do_not_burn: Vec::new(),
            combine_inputs: false,
            combine_outputs: false,
            show_machine_indices: false,
            strip_brackets: false,
            orientation: Orientation::TB,
            power_units: "auto".to_string(),
            print_bottlenecks: true,
            max_bottlenecks: 5,
            use_rainbow_edges: true,
            edge_colors: [
                "#b58900", "#cb4b16", "#dc322f", "#d33682", "#6c71c4", "#268bd2", "#2aa198",
                "#859900",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            background_color: "#043742".to_string(),
            title_color: "#ffffff".to_string(),
            summary_color: "#ffffff".to_string(),
            sourcesink_color: "#ffffff".to_string(),
            nonlocked_node_color: "#ffffff".to_string(),
            locked_node_color: "#f1c40f".to_string(),
            positive_color: "#00ff00".to_string(),
            negative_color: "#ff0000".to_string(),
            general_font: "Verdana".to_string(),
            node_fontsize: 10,
            edge_fontsize: 10,
            debug_logging: false,
        }
    }
}

impl FlowConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| FlowError::config(e.to_string()))
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| FlowError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check values that depend on the game data tables.
    pub fn validate(&self, data: &GameData) -> Result<()> {
        let units = self.power_units.as_str();
        if units != "auto" && units != "eut" && data.voltage.index(units).is_err() {
            return Err(FlowError::config(format!(
                "power_units must be \"auto\", \"eut\" or a voltage tier, got \"{}\"",
                units
            )));
        }
        if self.use_rainbow_edges && self.edge_colors.is_empty() {
            return Err(FlowError::config("use_rainbow_edges needs at least one edge colour"));
        }
        Ok(())
    }

    /// Whether a fuel is on the power line deny-list.
    pub fn is_unburnable(&self, ingredient: &str) -> bool {
        self.do_not_burn
            .iter()
            .any(|name| name.trim().to_lowercase() == ingredient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = FlowConfig::from_toml_str("").unwrap();
        assert_eq!(config.dur_format, DurFormat::Ticks);
        assert_eq!(config.orientation, Orientation::TB);
        assert_eq!(config.power_units, "auto");
        assert!(!config.power_line);
    }

    #[test]
    fn test_partial_override() {
        let config = FlowConfig::from_toml_str(
            r#"
            dur_format = "sec"
            power_line = true
            do_not_burn = ["Hydrogen"]
            orientation = "LR"
            "#,
        )
        .unwrap();
        assert_eq!(config.dur_format, DurFormat::Sec);
        assert_eq!(config.orientation.as_str(), "LR");
        assert!(config.is_unburnable("hydrogen"));
        assert!(!config.is_unburnable("methane"));
        assert_eq!(config.max_bottlenecks, 5);
    }

    #[test]
    fn test_invalid_values() {
        assert!(FlowConfig::from_toml_str("dur_format = \"minutes\"").is_err());

        let data = GameData::builtin().unwrap();
        let mut config = FlowConfig::default();
        config.power_units = "hv".to_string();
        assert!(config.validate(&data).is_ok());
        config.power_units = "volts".to_string();
        assert!(matches!(config.validate(&data), Err(FlowError::ConfigError { .. })));
    }
}
