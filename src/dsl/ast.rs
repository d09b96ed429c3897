//! Abstract Syntax Tree types for the project DSL.

use crate::recipe::AttrValue;

/// Complete AST of a parsed project file.
#[derive(Debug, Clone, Default)]
pub struct ProjectAst {
    /// Recipes in declaration order
    pub recipes: Vec<RecipeDef>,
}

/// A `.recipe` block as written, before validation.
#[derive(Debug, Clone)]
pub struct RecipeDef {
    /// Machine name exactly as written
    pub machine: String,
    /// `key=value` parameters from the header line, in order
    pub params: Vec<(String, AttrValue)>,
    pub inputs: Vec<IoLine>,
    pub outputs: Vec<IoLine>,
    pub targets: Vec<IoLine>,
    /// Source line of the header for error reporting
    pub line: usize,
}

impl RecipeDef {
    pub fn new(machine: impl Into<String>, line: usize) -> Self {
        Self {
            machine: machine.into(),
            params: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            targets: Vec::new(),
            line,
        }
    }

    /// First value given for a header key.
    pub fn param(&self, key: &str) -> Option<&AttrValue> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// An `in`, `out` or `target` line.
#[derive(Debug, Clone, PartialEq)]
pub struct IoLine {
    pub name: String,
    pub quantity: f64,
    pub line: usize,
}

/// Body line keywords inside a recipe block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoKeyword {
    In,
    Out,
    Target,
}

impl IoKeyword {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "in" | "i" => Some(Self::In),
            "out" | "o" => Some(Self::Out),
            "target" => Some(Self::Target),
            _ => None,
        }
    }
}
