//! Machine-specific recipe attributes.

use std::collections::BTreeMap;
use std::fmt;

/// A single free-form attribute value from the project file.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl AttrValue {
    /// Human readable name of the value's type, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AttrValue::Int(_) => "integer",
            AttrValue::Float(_) => "number",
            AttrValue::Text(_) => "text",
            AttrValue::Bool(_) => "bool",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(i) => Some(*i as f64),
            AttrValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(i) => write!(f, "{}", i),
            AttrValue::Float(x) => write!(f, "{}", x),
            AttrValue::Text(s) => write!(f, "{}", s),
            AttrValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Ordered map of extra attributes (`coils`, `heat`, `material`, ...).
pub type Attributes = BTreeMap<String, AttrValue>;
