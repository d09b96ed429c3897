//! Project DSL for describing a processing line.
//!
//! A project is a list of recipe blocks. Each block starts with a `.recipe`
//! header naming the machine and its settings, followed by one line per input,
//! output or target ingredient.
//!
//! # Grammar Overview
//!
//! ```text
//! project     = { line }
//! line        = comment | header | io_line | empty
//! comment     = '#' { any_char }
//! header      = ".recipe" name { key '=' value }
//! io_line     = ("in" | "out" | "target") name number
//!
//! name        = string | word
//! value       = number | string | word | "true" | "false"
//! number      = ['-'] digit+ ['.' digit+] [('e'|'E') ['-'|'+'] digit+] [suffix]
//! suffix      = 'k' | 'M' | 'G'
//! string      = '"' { any_char_but_quote } '"'
//! word        = (letter | '_') { letter | digit | '_' | '-' }
//! ```
//!
//! # Header keys
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `tier` | Voltage tier the machine runs at (required) |
//! | `eut` | Base EU/t of the recipe (required) |
//! | `dur` | Base duration in ticks, or seconds with `dur_format = "sec"` (required) |
//! | `number` | Anchor: the machine count is fixed to this value |
//! | anything else | Machine attribute (`coils`, `heat`, `saw_type`, ...) |
//!
//! # Example
//!
//! ```text
//! .recipe ebf tier=hv eut=120 dur=400 coils=nichrome heat=1800 number=2
//! in  "iron dust" 1
//! in  oxygen 1000
//! out "steel ingot" 1
//!
//! .recipe "vacuum freezer" tier=hv eut=120 dur=100
//! in  "hot steel ingot" 1
//! out "steel ingot" 1
//! target "steel ingot" 0.5
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use std::path::Path;

use log::debug;

use crate::config::{DurFormat, FlowConfig};
use crate::error::{FlowError, Result};
use crate::overclock::canonical_machine_name;
use crate::recipe::{AttrValue, Ingredient, IngredientCollection, Recipe};
use crate::TICKS_PER_SECOND;

/// Header keys consumed by the recipe itself rather than stored as attributes.
const RESERVED_KEYS: &[&str] = &["tier", "eut", "dur", "number"];

/// Parse a project DSL string into an AST.
pub fn parse(input: &str) -> Result<ProjectAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse project text and build recipes ready for overclocking.
pub fn load_project(input: &str, config: &FlowConfig) -> Result<Vec<Recipe>> {
    let ast = parse(input)?;
    ast.recipes.iter().map(|def| build_recipe(def, config)).collect()
}

/// Read and load a project file.
pub fn load_project_file(path: &Path, config: &FlowConfig) -> Result<Vec<Recipe>> {
    let content = std::fs::read_to_string(path).map_err(|e| FlowError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    load_project(&content, config)
}

fn required_number(def: &RecipeDef, key: &str) -> Result<f64> {
    def.param(key)
        .and_then(AttrValue::as_f64)
        .ok_or_else(|| FlowError::invalid_recipe(&def.machine, def.line, format!("missing numeric \"{}\"", key)))
}

/// Validate a recipe block and turn it into a [`Recipe`].
pub fn build_recipe(def: &RecipeDef, config: &FlowConfig) -> Result<Recipe> {
    let machine = canonical_machine_name(&def.machine);
    let tier = def
        .param("tier")
        .and_then(AttrValue::as_text)
        .ok_or_else(|| FlowError::invalid_recipe(&def.machine, def.line, "missing voltage \"tier\""))?
        .to_lowercase();
    let eut = required_number(def, "eut")?;
    let mut dur = required_number(def, "dur")?;
    if config.dur_format == DurFormat::Sec {
        dur *= TICKS_PER_SECOND;
    }
    if dur <= 0.0 {
        return Err(FlowError::invalid_recipe(&def.machine, def.line, "\"dur\" must be positive"));
    }

    let inputs: IngredientCollection = def
        .inputs
        .iter()
        .map(|io| Ingredient::new(&io.name, io.quantity))
        .collect();
    let outputs: IngredientCollection = def
        .outputs
        .iter()
        .map(|io| Ingredient::new(&io.name, io.quantity))
        .collect();

    let mut recipe = Recipe::new(machine, tier, inputs, outputs, eut, dur);

    if let Some(value) = def.param("number") {
        let number = value.as_f64().ok_or_else(|| {
            FlowError::invalid_recipe(&def.machine, def.line, "\"number\" must be numeric")
        })?;
        recipe = recipe.with_number(number);
    }
    for target in &def.targets {
        recipe = recipe.with_target(&target.name, target.quantity);
    }
    for (key, value) in &def.params {
        if !RESERVED_KEYS.contains(&key.as_str()) {
            recipe = recipe.with_attr(key.clone(), value.clone());
        }
    }

    debug!("Loaded recipe {}", recipe);
    Ok(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"
.recipe EBF tier=HV eut=120 dur=20 coils=nichrome heat=1800 number=2
in "Iron Dust" 1
out "steel ingot" 1

.recipe centrifuge tier=lv eut=5 dur=2
in "steel ingot" 1
out "(recycle) iron" 1
target "(recycle) iron" 3
"#;

    #[test]
    fn test_load_project() {
        let recipes = load_project(PROJECT, &FlowConfig::default()).unwrap();
        assert_eq!(recipes.len(), 2);

        let ebf = &recipes[0];
        assert_eq!(ebf.machine, "electric blast furnace");
        assert_eq!(ebf.user_voltage, "hv");
        assert_eq!(ebf.number, Some(2.0));
        assert_eq!(ebf.dur, 20.0);
        assert_eq!(ebf.inputs.first().map(|i| i.name.as_str()), Some("iron dust"));
        assert_eq!(ebf.attrs.get("heat"), Some(&AttrValue::Int(1800)));
        assert!(!ebf.attrs.contains_key("tier"));

        let centrifuge = &recipes[1];
        assert_eq!(centrifuge.targets, vec![("[recycle] iron".to_string(), 3.0)]);
        assert!(centrifuge.outputs.contains("[recycle] iron"));
    }

    #[test]
    fn test_seconds_duration_format() {
        let config = FlowConfig {
            dur_format: DurFormat::Sec,
            ..FlowConfig::default()
        };
        let recipes = load_project(PROJECT, &config).unwrap();
        assert_eq!(recipes[0].dur, 400.0);
        assert_eq!(recipes[1].dur, 40.0);
    }

    #[test]
    fn test_missing_header_keys() {
        let err = load_project(".recipe mixer tier=lv eut=5\nin a 1\n", &FlowConfig::default())
            .unwrap_err();
        match err {
            FlowError::InvalidRecipe { machine, line, message } => {
                assert_eq!(machine, "mixer");
                assert_eq!(line, 1);
                assert!(message.contains("dur"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(load_project(".recipe mixer eut=5 dur=1\n", &FlowConfig::default()).is_err());
    }
}
