//! Recipe model: ingredients, ingredient collections and machine recipes.
//!
//! A [`Recipe`] describes one machine's fixed-ratio conversion of inputs to
//! outputs at a given voltage tier. Recipes are produced by the project
//! loader, rescaled by the overclock engine and finally multiplied by the
//! solved machine count.

mod attrs;
mod ingredient;
mod types;

pub use attrs::{AttrValue, Attributes};
pub use ingredient::{Ingredient, IngredientCollection};
pub use types::{IoDirection, Recipe};
