//! Ingredients and ordered ingredient collections.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;

/// Set once the square-bracket deprecation warning has been shown.
static BRACKET_WARNING_SHOWN: AtomicBool = AtomicBool::new(false);

/// A named quantity of an item, fluid or energy.
///
/// The name is the join key used to connect producers and consumers, so it is
/// normalized on construction: lowercased (except the special `EU` name) and
/// the first `(`/`)` pair is translated to the `[`/`]` tag form.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
}

impl Ingredient {
    /// Create an ingredient, normalizing its name.
    pub fn new(name: impl AsRef<str>, quantity: f64) -> Self {
        Self {
            name: normalize_name(name.as_ref()),
            quantity,
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quantity, self.name)
    }
}

/// Normalize an ingredient name so that equal ingredients compare equal.
pub(crate) fn normalize_name(raw: &str) -> String {
    let raw = raw.trim();
    if raw == "EU" {
        return raw.to_string();
    }

    let first_word = raw.split(' ').next().unwrap_or("");
    if first_word.contains('[')
        && first_word.contains(']')
        && !BRACKET_WARNING_SHOWN.swap(true, Ordering::Relaxed)
    {
        warn!(
            "You are using square brackets in your I/O! Support for square bracket tags \"[]\" \
             will be phased out in the future. Switch to using parentheses \"()\" instead."
        );
    }

    raw.to_lowercase().replacen('(', "[", 1).replacen(')', "]", 1)
}

/// Ordered collection of ingredients used for recipe inputs or outputs.
///
/// Insertion order is preserved: the first ingredient is the representative
/// one when the solver needs to pick a single flow for a machine. A name may
/// appear more than once, so the derived index maps a name to every position
/// it occupies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientCollection {
    ingredients: Vec<Ingredient>,
    index: HashMap<String, Vec<usize>>,
}

impl IngredientCollection {
    /// Create a collection from an ordered list of ingredients.
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, ing) in ingredients.iter().enumerate() {
            index.entry(ing.name.clone()).or_default().push(i);
        }
        Self { ingredients, index }
    }

    /// Create an empty collection.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Iterate over the ingredients in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Ingredient> {
        self.ingredients.iter()
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }

    /// The representative (first) ingredient.
    pub fn first(&self) -> Option<&Ingredient> {
        self.ingredients.first()
    }

    /// Mutable access to the first ingredient.
    pub fn first_mut(&mut self) -> Option<&mut Ingredient> {
        self.ingredients.first_mut()
    }

    /// Ingredient at a position.
    pub fn get(&self, idx: usize) -> Option<&Ingredient> {
        self.ingredients.get(idx)
    }

    /// All quantities recorded under a name, in insertion order.
    pub fn quantities(&self, name: &str) -> Vec<f64> {
        self.index
            .get(name)
            .map(|positions| positions.iter().map(|&i| self.ingredients[i].quantity).collect())
            .unwrap_or_default()
    }

    /// Distinct names in first-seen order, with repeated entries summed.
    pub fn totals(&self) -> Vec<(&str, f64)> {
        let mut out: Vec<(&str, f64)> = Vec::new();
        for ing in &self.ingredients {
            match out.iter_mut().find(|(name, _)| *name == ing.name) {
                Some((_, total)) => *total += ing.quantity,
                None => out.push((&ing.name, ing.quantity)),
            }
        }
        out
    }

    /// Check whether an ingredient name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Multiply every quantity in place.
    pub fn scale(&mut self, factor: f64) {
        for ing in &mut self.ingredients {
            ing.quantity *= factor;
        }
    }
}

impl<'a> IntoIterator for &'a IngredientCollection {
    type Item = &'a Ingredient;
    type IntoIter = std::slice::Iter<'a, Ingredient>;

    fn into_iter(self) -> Self::IntoIter {
        self.ingredients.iter()
    }
}

impl FromIterator<Ingredient> for IngredientCollection {
    fn from_iter<T: IntoIterator<Item = Ingredient>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for IngredientCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, ing) in self.ingredients.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ing)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_normalization() {
        assert_eq!(Ingredient::new("Sugar Beet", 1.0).name, "sugar beet");
        assert_eq!(Ingredient::new("EU", 1.0).name, "EU");
        assert_eq!(
            Ingredient::new("(recycle) distilled water", 1.0).name,
            "[recycle] distilled water"
        );
        assert_eq!(Ingredient::new("[recycle] water", 1.0).name, "[recycle] water");
    }

    #[test]
    fn test_duplicate_names_keep_every_quantity() {
        let coll = IngredientCollection::new(vec![
            Ingredient::new("water", 100.0),
            Ingredient::new("oxygen", 50.0),
            Ingredient::new("water", 25.0),
        ]);
        assert_eq!(coll.len(), 3);
        assert_eq!(coll.quantities("water"), vec![100.0, 25.0]);
        assert!(coll.quantities("nitrogen").is_empty());
        assert_eq!(coll.first().map(|i| i.name.as_str()), Some("water"));
        assert_eq!(coll.totals(), vec![("water", 125.0), ("oxygen", 50.0)]);
    }

    #[test]
    fn test_scale() {
        let mut coll: IngredientCollection =
            vec![Ingredient::new("a", 2.0), Ingredient::new("b", 3.0)].into_iter().collect();
        coll.scale(4.0);
        assert_eq!(coll.quantities("a"), vec![8.0]);
        assert_eq!(coll.quantities("b"), vec![12.0]);
    }
}
