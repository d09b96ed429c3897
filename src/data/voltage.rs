//! Voltage tier table.

use serde::Deserialize;

use crate::error::{FlowError, Result};

/// Ordered voltage tiers (`lv`, `mv`, `hv`, ...).
///
/// Tier `i` carries `32 * 4^i` EU/t. A recipe drawing exactly that much still
/// fits in the tier, so the bucket boundary used for "which tier does this
/// recipe need" is one EU/t above it.
#[derive(Debug, Clone, Deserialize)]
pub struct VoltageTable {
    tiers: Vec<String>,
}

impl VoltageTable {
    /// Create a table from tier names in ascending order.
    pub fn new<S: Into<String>>(tiers: impl IntoIterator<Item = S>) -> Self {
        Self {
            tiers: tiers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Index of a tier name.
    pub fn index(&self, tier: &str) -> Result<usize> {
        self.tiers
            .iter()
            .position(|t| t == tier)
            .ok_or_else(|| FlowError::UnknownVoltage {
                tier: tier.to_string(),
            })
    }

    /// Name of the tier at an index, clamped to the highest tier.
    pub fn name(&self, idx: usize) -> &str {
        let idx = idx.min(self.tiers.len().saturating_sub(1));
        self.tiers.get(idx).map(String::as_str).unwrap_or("")
    }

    /// Maximum EU/t of a tier.
    pub fn voltage(&self, idx: usize) -> f64 {
        32.0 * 4f64.powi(idx as i32)
    }

    /// Lowest tier index able to run a recipe drawing `eut`.
    ///
    /// Equivalent to a right bisection of `eut` over the tier cutoffs
    /// `32 * 4^i + 1`.
    pub fn tier_for_eut(&self, eut: f64) -> usize {
        (0..self.tiers.len())
            .take_while(|&i| self.voltage(i) + 1.0 <= eut)
            .count()
    }

    /// Tier names in ascending order.
    pub fn tiers(&self) -> &[String] {
        &self.tiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> VoltageTable {
        VoltageTable::new([
            "lv", "mv", "hv", "ev", "iv", "luv", "zpm", "uv", "uhv", "uev", "uiv", "umv", "uxv",
        ])
    }

    #[test]
    fn test_tier_voltages() {
        let t = table();
        let expected = [
            ("lv", 32.0),
            ("mv", 128.0),
            ("hv", 512.0),
            ("ev", 2048.0),
            ("iv", 8192.0),
            ("luv", 32768.0),
            ("zpm", 131072.0),
            ("uv", 524288.0),
            ("uhv", 2097152.0),
            ("uev", 8388608.0),
            ("uiv", 33554432.0),
            ("umv", 134217728.0),
            ("uxv", 536870912.0),
        ];
        for (tier, voltage) in expected {
            assert_eq!(t.voltage(t.index(tier).unwrap()), voltage);
        }
    }

    #[test]
    fn test_tier_for_eut_boundaries() {
        let t = table();
        assert_eq!(t.tier_for_eut(2.0), 0);
        assert_eq!(t.tier_for_eut(32.0), 0);
        assert_eq!(t.tier_for_eut(33.0), 1);
        assert_eq!(t.tier_for_eut(128.0), 1);
        assert_eq!(t.tier_for_eut(129.0), 2);
        assert_eq!(t.tier_for_eut(30720.0), 5);
    }

    #[test]
    fn test_unknown_tier() {
        assert!(matches!(
            table().index("ulv"),
            Err(FlowError::UnknownVoltage { .. })
        ));
    }
}
