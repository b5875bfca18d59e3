//! # Scalar types and type coercion
//!
//! Statements mix two scalar types. The caller declares the type of every
//! identifier it reads through a [`TypeMap`]; the [`SemanticAnalyzer`] then
//! decides whether the statement is evaluated in floating point and, if so,
//! wraps every integer leaf in an explicit promotion node.
//!
//! Identifiers missing from the map resolve to [`ScalarType::Int`]. The
//! compiler's strict type policy turns that default into an error instead.

mod coercion;

pub use coercion::{analyze, has_float, SemanticAnalyzer};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Scalar type of an operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// Integer
    Int,
    /// Floating point
    Float,
}

impl ScalarType {
    /// True for [`ScalarType::Float`]
    pub fn is_float(self) -> bool {
        self == ScalarType::Float
    }

    /// Type of a numeric literal: float iff it has a decimal point
    pub fn of_literal(text: &str) -> Self {
        if text.contains('.') {
            ScalarType::Float
        } else {
            ScalarType::Int
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Int => f.write_str("INT"),
            ScalarType::Float => f.write_str("FLOAT"),
        }
    }
}

impl FromStr for ScalarType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" => Ok(ScalarType::Int),
            "float" => Ok(ScalarType::Float),
            _ => Err(Error::InvalidTypeName(s.to_string())),
        }
    }
}

/// Declared identifier types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMap {
    types: BTreeMap<String, ScalarType>,
}

impl TypeMap {
    /// Creates an empty type map
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares (or redeclares) the type of an identifier
    pub fn declare(&mut self, name: impl Into<String>, ty: ScalarType) {
        self.types.insert(name.into(), ty);
    }

    /// Declared type of an identifier, if any
    pub fn get(&self, name: &str) -> Option<ScalarType> {
        self.types.get(name).copied()
    }

    /// Declared type of an identifier, defaulting to [`ScalarType::Int`]
    pub fn resolve(&self, name: &str) -> ScalarType {
        self.get(name).unwrap_or(ScalarType::Int)
    }

    /// True if `name` has a declared type
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Iterates declarations in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, ScalarType)> {
        self.types.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Number of declared identifiers
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when nothing is declared
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, ScalarType)> for TypeMap {
    fn from_iter<I: IntoIterator<Item = (S, ScalarType)>>(iter: I) -> Self {
        let mut map = TypeMap::new();
        for (name, ty) in iter {
            map.declare(name, ty);
        }
        map
    }
}
