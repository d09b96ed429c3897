//! Machine recipe type.

use std::fmt;

use super::attrs::{AttrValue, Attributes};
use super::ingredient::IngredientCollection;
use crate::error::{FlowError, Result};
use crate::TICKS_PER_SECOND;

/// Side of a recipe an ingredient sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IoDirection {
    Input,
    Output,
}

impl IoDirection {
    /// Both directions, inputs first.
    pub const BOTH: [IoDirection; 2] = [IoDirection::Input, IoDirection::Output];

    /// The opposite side.
    pub fn swap(self) -> Self {
        match self {
            IoDirection::Input => IoDirection::Output,
            IoDirection::Output => IoDirection::Input,
        }
    }
}

impl fmt::Display for IoDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoDirection::Input => write!(f, "I"),
            IoDirection::Output => write!(f, "O"),
        }
    }
}

/// A processing step with fixed-ratio inputs and outputs.
#[derive(Debug, Clone)]
pub struct Recipe {
    /// Standardized machine name (aliases already resolved)
    pub machine: String,
    /// Voltage tier the user runs this machine at
    pub user_voltage: String,
    pub inputs: IngredientCollection,
    pub outputs: IngredientCollection,
    /// Energy per tick
    pub eut: f64,
    /// Duration in ticks
    pub dur: f64,
    /// Per-machine energy after overclocking, before the solved multiplier
    pub base_eut: f64,
    /// Anchor: desired machine count
    pub number: Option<f64>,
    /// Anchor: desired ingredient throughput per second, in declaration order
    pub targets: Vec<(String, f64)>,
    /// Machine-specific attributes
    pub attrs: Attributes,
    multiplier: Option<f64>,
}

impl Recipe {
    /// Create a recipe with no anchors and no extra attributes.
    pub fn new(
        machine: impl Into<String>,
        user_voltage: impl Into<String>,
        inputs: IngredientCollection,
        outputs: IngredientCollection,
        eut: f64,
        dur: f64,
    ) -> Self {
        Self {
            machine: machine.into(),
            user_voltage: user_voltage.into(),
            inputs,
            outputs,
            eut,
            dur,
            base_eut: eut,
            number: None,
            targets: Vec::new(),
            attrs: Attributes::new(),
            multiplier: None,
        }
    }

    /// Builder: set the machine count anchor.
    pub fn with_number(mut self, number: f64) -> Self {
        self.number = Some(number);
        self
    }

    /// Builder: add a target anchor.
    pub fn with_target(mut self, ingredient: impl AsRef<str>, quantity: f64) -> Self {
        let name = super::ingredient::normalize_name(ingredient.as_ref());
        self.targets.push((name, quantity));
        self
    }

    /// Builder: set an extra attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: AttrValue) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    /// Ingredients on one side of the recipe.
    pub fn io(&self, direction: IoDirection) -> &IngredientCollection {
        match direction {
            IoDirection::Input => &self.inputs,
            IoDirection::Output => &self.outputs,
        }
    }

    /// Whether the user anchored this recipe with `number` or `target`.
    pub fn is_anchored(&self) -> bool {
        self.number.is_some() || !self.targets.is_empty()
    }

    /// Whether overclocking must leave this recipe untouched.
    pub fn skips_overclock(&self) -> bool {
        self.attrs
            .get("do_not_overclock")
            .and_then(AttrValue::as_bool)
            .unwrap_or(false)
    }

    /// Cycle time in seconds.
    pub fn cycle_seconds(&self) -> f64 {
        self.dur / TICKS_PER_SECOND
    }

    /// Look up a required text attribute.
    pub fn require_text(&self, key: &str, reason: &str) -> Result<&str> {
        self.attrs
            .get(key)
            .and_then(AttrValue::as_text)
            .ok_or_else(|| FlowError::missing_attribute(&self.machine, key, "text", reason))
    }

    /// Look up a required integer attribute.
    pub fn require_int(&self, key: &str, reason: &str) -> Result<i64> {
        self.attrs
            .get(key)
            .and_then(AttrValue::as_int)
            .ok_or_else(|| FlowError::missing_attribute(&self.machine, key, "integer", reason))
    }

    /// Text attribute if present.
    pub fn text_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(AttrValue::as_text)
    }

    /// Multiply inputs and outputs by a parallel count.
    pub fn scale_io(&mut self, factor: f64) {
        self.inputs.scale(factor);
        self.outputs.scale(factor);
    }

    /// Solved machine count, once post-processing has set it.
    pub fn multiplier(&self) -> Option<f64> {
        self.multiplier
    }

    /// Record the solved machine count and rescale the amortized energy.
    ///
    /// A recipe can only be multiplied once.
    pub fn apply_multiplier(&mut self, multiplier: f64) -> Result<()> {
        if self.multiplier.is_some() {
            return Err(FlowError::MultiplierAlreadySet {
                machine: self.machine.clone(),
            });
        }
        self.multiplier = Some(multiplier);
        self.eut *= multiplier;
        Ok(())
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {} EU/t {}t I={} O={}",
            self.machine, self.user_voltage, self.eut, self.dur, self.inputs, self.outputs
        )?;
        for (key, value) in &self.attrs {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Ingredient;

    fn sample() -> Recipe {
        Recipe::new(
            "electric blast furnace",
            "hv",
            IngredientCollection::new(vec![Ingredient::new("iron dust", 1.0)]),
            IngredientCollection::new(vec![Ingredient::new("steel ingot", 1.0)]),
            120.0,
            400.0,
        )
    }

    #[test]
    fn test_multiplier_applies_once() {
        let mut rec = sample();
        rec.apply_multiplier(2.5).unwrap();
        assert_eq!(rec.multiplier(), Some(2.5));
        assert!((rec.eut - 300.0).abs() < 1e-12);
        assert!(matches!(
            rec.apply_multiplier(2.0),
            Err(FlowError::MultiplierAlreadySet { .. })
        ));
    }

    #[test]
    fn test_require_reports_key_and_reason() {
        let rec = sample().with_attr("heat", AttrValue::Text("hot".into()));
        let err = rec.require_int("heat", "heat requirement").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("\"heat\""));
        assert!(msg.contains("heat requirement"));
        assert!(rec.require_text("coils", "coil heat").is_err());
    }

    #[test]
    fn test_target_names_are_normalized() {
        let rec = sample().with_target("Steel Ingot", 2.0);
        assert_eq!(rec.targets, vec![("steel ingot".to_string(), 2.0)]);
        assert!(rec.is_anchored());
    }
}
