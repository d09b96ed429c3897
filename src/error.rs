//! Error types for the GT Flow balancer.
//!
//! This module provides a unified error type [`FlowError`] that covers
//! all error conditions that can occur while reading a project, overclocking
//! recipes, building the flow graph and solving it.

use thiserror::Error;

/// Result type alias using [`FlowError`].
pub type Result<T> = std::result::Result<T, FlowError>;

/// Unified error type for all GT Flow operations.
#[derive(Error, Debug)]
pub enum FlowError {
    // ============ Project Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Recipe definition is incomplete or malformed
    #[error("Invalid recipe '{machine}' at line {line}: {message}")]
    InvalidRecipe {
        machine: String,
        line: usize,
        message: String,
    },

    /// Configuration or game data file could not be understood
    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },

    // ============ Overclock Errors ============
    /// A machine-specific attribute is missing or has the wrong type
    #[error("Improper config! \"{machine}\" requires key \"{key}\" ({expected}) - it is used for {reason}")]
    MissingAttribute {
        machine: String,
        key: String,
        expected: &'static str,
        reason: String,
    },

    /// An attribute names a value that is not in the known tables
    #[error("Unsupported {key} \"{value}\" for \"{machine}\", expected one of: {allowed}")]
    UnknownValue {
        machine: String,
        key: String,
        value: String,
        allowed: String,
    },

    /// Requested voltage is below the recipe's minimum tier
    #[error("Recipe \"{machine}\" has negative overclock! Min voltage is {base}, given OC voltage is {requested}")]
    NegativeOverclock {
        machine: String,
        base: String,
        requested: String,
    },

    /// Voltage tier name not present in the tier table
    #[error("Unknown voltage tier \"{tier}\"")]
    UnknownVoltage { tier: String },

    /// No overclock table entry for a machine routed to a table-driven model
    #[error("Missing overclock data for \"{machine}\" - add it to the game data tables")]
    MissingOverclockData { machine: String },

    /// Recipe asks for a feature the overclock model does not implement
    #[error("Unsupported overclock setup for \"{machine}\": {message}")]
    UnsupportedOverclock { machine: String, message: String },

    // ============ Solver Errors ============
    /// A recipe has neither inputs nor outputs
    #[error("Recipe {node} ({machine}) has no inputs or outputs")]
    NoIo { node: String, machine: String },

    /// No recipe carries a `number` or `target` anchor
    #[error("Need at least one \"number\" or \"target\" argument to base machine balancing around")]
    MissingAnchor,

    /// More than one targeted ingredient on a single recipe
    #[error("Recipe {node} ({machine}) targets {count} ingredients - only one targeted ingredient per machine is implemented")]
    MultipleTargets {
        node: String,
        machine: String,
        count: usize,
    },

    /// Targeted ingredient is not among the recipe's own I/O
    #[error("Targeted ingredient \"{ingredient}\" must be in the I/O of recipe {node} ({machine})")]
    TargetNotInRecipe {
        node: String,
        machine: String,
        ingredient: String,
    },

    /// Diagnosed conflict between two flows of the same ingredient
    #[error("Inconsistent flow of \"{ingredient}\" between {producer} and {consumer} (off by {difference:.4})")]
    Inconsistent {
        ingredient: String,
        producer: String,
        consumer: String,
        difference: f64,
    },

    /// Diagnosis found a conflict it cannot explain
    #[error("Inconsistent system of equations involving {variables} - conflicts of this shape are not implemented")]
    UnsupportedConflict { variables: String },

    /// System has no solution and no conflict could be localized
    #[error("Linear solver found an empty solution set and inconsistency search found no conflict - report to dev")]
    Infeasible,

    /// System has more than one solution
    #[error("Multiple solutions ({free} free variables) - no code written to deal with this scenario yet")]
    Underdetermined { free: usize },

    /// Both endpoints of a machine-machine edge solved to different flows
    #[error("Mismatched machine-edge quantities on {edge}: {from_side} vs {to_side}")]
    EdgeMismatch {
        edge: String,
        from_side: f64,
        to_side: f64,
    },

    /// A solved multiplier was applied to a recipe twice
    #[error("Cannot multiply recipe \"{machine}\" multiple times")]
    MultiplierAlreadySet { machine: String },

    // ============ I/O Errors ============
    /// Error reading an input file
    #[error("Failed to read '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing an output file
    #[error("Failed to write '{path}': {source}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FlowError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid recipe error
    pub fn invalid_recipe(machine: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidRecipe {
            machine: machine.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a missing attribute error
    pub fn missing_attribute(
        machine: impl Into<String>,
        key: impl Into<String>,
        expected: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::MissingAttribute {
            machine: machine.into(),
            key: key.into(),
            expected,
            reason: reason.into(),
        }
    }

    /// Create an unknown table value error
    pub fn unknown_value<I, S>(machine: &str, key: &str, value: &str, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = allowed
            .into_iter()
            .map(|s| format!("\"{}\"", s.as_ref()))
            .collect::<Vec<_>>()
            .join(", ");
        Self::UnknownValue {
            machine: machine.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            allowed,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }
}
