//! Query definitions - dimension-filtered cost queries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dimension names that refer to fixed fact columns rather than tags.
pub const FIXED_DIMENSIONS: &[&str] = &["region", "service", "operation"];

/// Prefix applied to tag dimensions to keep them apart from the fixed columns.
pub const TAG_PREFIX: &str = "user_";

/// Normalize a column or dimension name: punctuation and whitespace fold to
/// underscores, everything lowercased. Applied identically to query dimension
/// names and fact table columns so the two always compare.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c == ':' || c.is_whitespace() {
                '_'
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

/// Canonical name of a tag dimension or tag column: normalized, with the tag
/// prefix guaranteed. Billing exports name tags "user:Team"-style, which
/// normalizes to the prefixed form on its own; bare names get the prefix
/// added.
pub fn tag_dimension_name(name: &str) -> String {
    let name = normalize_name(name);
    if name.starts_with(TAG_PREFIX) {
        name
    } else {
        format!("{}{}", TAG_PREFIX, name)
    }
}

/// A dimension predicate: exact match, or substring containment when the raw
/// value carried a `*` wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// The row's column value must equal this string.
    Exact(String),
    /// The row's column value must contain this string. Containment direction
    /// is predicate-in-row, not the reverse.
    Contains(String),
}

impl Predicate {
    /// Parse a raw predicate value.
    pub fn parse(raw: &str) -> Self {
        if raw.contains('*') {
            Predicate::Contains(raw.replace('*', ""))
        } else {
            Predicate::Exact(raw.to_string())
        }
    }

    /// Test a row's column value against this predicate.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Predicate::Exact(want) => value == want,
            Predicate::Contains(want) => value.contains(want.as_str()),
        }
    }
}

/// A query definition: dimension name → raw predicate value.
///
/// Values stay raw; wildcard interpretation happens at filter time. The map
/// is ordered so expansion and filtering are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryDefinition {
    dimensions: BTreeMap<String, String>,
}

impl QueryDefinition {
    /// Create an empty definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dimension (builder form).
    pub fn with(mut self, dimension: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(dimension.into(), value.into());
        self
    }

    /// Set a dimension's predicate value.
    pub fn insert(&mut self, dimension: impl Into<String>, value: impl Into<String>) {
        self.dimensions.insert(dimension.into(), value.into());
    }

    /// Look up a dimension's raw predicate value.
    pub fn get(&self, dimension: &str) -> Option<&str> {
        self.dimensions.get(dimension).map(String::as_str)
    }

    /// Remove a dimension, returning its value if present.
    pub fn remove(&mut self, dimension: &str) -> Option<String> {
        self.dimensions.remove(dimension)
    }

    /// Whether the definition filters on this dimension.
    pub fn contains(&self, dimension: &str) -> bool {
        self.dimensions.contains_key(dimension)
    }

    /// Iterate (dimension, raw value) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.dimensions
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate dimension names in order.
    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.dimensions.keys().map(String::as_str)
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    /// Whether the definition has no dimensions.
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Build a new definition with every dimension name normalized and
    /// non-fixed names carrying the tag prefix. Always builds a fresh map;
    /// the input is never mutated.
    pub fn normalized(&self) -> QueryDefinition {
        let mut dimensions = BTreeMap::new();
        for (name, value) in &self.dimensions {
            let normalized = normalize_name(name);
            let name = if FIXED_DIMENSIONS.contains(&normalized.as_str()) {
                normalized
            } else {
                tag_dimension_name(&normalized)
            };
            dimensions.insert(name, value.clone());
        }
        QueryDefinition { dimensions }
    }
}
