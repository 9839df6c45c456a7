//! The Function Registry: a catalog mapping a function name to its category and
//! ordered parameter schema.
//!
//! The compiler consults the registry only to decide argument order and whether a
//! call result has to be bound to a variable. Argument values themselves are never
//! validated, matching the loosely typed target dialect.

use crate::error::RegistryError;
use ahash::AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

mod catalog;

/// Broad role a function plays in a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionCategory {
    Timing,
    ValueAcquisition,
    Consequence,
    Conditional,
    ContinueIf,
}

impl fmt::Display for FunctionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FunctionCategory::Timing => "Timing",
            FunctionCategory::ValueAcquisition => "ValueAcquisition",
            FunctionCategory::Consequence => "Consequence",
            FunctionCategory::Conditional => "Conditional",
            FunctionCategory::ContinueIf => "ContinueIf",
        };
        f.write_str(name)
    }
}

/// Describes a single callable function of the dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    pub category: FunctionCategory,
    /// Argument names in the order the dialect expects them.
    #[serde(default)]
    pub parameters: Vec<String>,
}

impl FunctionSchema {
    pub fn new(name: &str, category: FunctionCategory, parameters: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            category,
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Whether a call to this function yields a value that must be bound to a slot.
    pub fn is_value_producing(&self) -> bool {
        self.category == FunctionCategory::ValueAcquisition
    }

    /// Whether this function splits control flow into `true` and `false` branches.
    pub fn has_two_branches(&self) -> bool {
        self.category == FunctionCategory::Conditional
    }
}

/// Lookup table of every known function.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    schemas: AHashMap<String, FunctionSchema>,
}

impl FunctionRegistry {
    /// A registry with no entries at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in catalog.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        catalog::register_default_functions(&mut registry);
        registry
    }

    /// Builds the default catalog and merges the schemas listed in `json` on top of it.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let extra: Vec<FunctionSchema> = serde_json::from_str(json)
            .map_err(|e| RegistryError::JsonParseError(e.to_string()))?;
        let mut registry = Self::with_defaults();
        for schema in extra {
            if schema.name.trim().is_empty() {
                return Err(RegistryError::EmptyName);
            }
            registry.register(schema);
        }
        Ok(registry)
    }

    /// Adds a schema, replacing any previous entry with the same name.
    pub fn register(&mut self, schema: FunctionSchema) {
        self.schemas.insert(schema.name.clone(), schema);
    }

    pub fn lookup(&self, function_name: &str) -> Option<&FunctionSchema> {
        self.schemas.get(function_name)
    }

    pub fn contains(&self, function_name: &str) -> bool {
        self.schemas.contains_key(function_name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// All schemas, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &FunctionSchema> {
        self.schemas.values().sorted_by(|a, b| a.name.cmp(&b.name))
    }

    /// Schemas of one category, sorted by name.
    pub fn by_category(&self, category: FunctionCategory) -> impl Iterator<Item = &FunctionSchema> {
        self.iter().filter(move |schema| schema.category == category)
    }
}
