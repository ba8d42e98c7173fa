//! In-memory fact table view.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::query::definition::FIXED_DIMENSIONS;

/// One pre-aggregated billing fact: a (day, service, operation, region)
/// tuple with its summed cost and tag values.
#[derive(Debug, Clone, PartialEq)]
pub struct FactRow {
    pub day: NaiveDate,
    pub service: String,
    pub operation: String,
    pub region: String,
    pub cost: f64,
    /// Tag values keyed by normalized readable tag name. A tag missing from
    /// the row's source month is simply absent here.
    pub tags: HashMap<String, String>,
}

impl FactRow {
    /// Look up a filterable dimension value on this row. Returns None for
    /// unknown dimensions and for tags the row does not carry.
    pub fn dimension(&self, name: &str) -> Option<&str> {
        match name {
            "service" => Some(&self.service),
            "operation" => Some(&self.operation),
            "region" => Some(&self.region),
            _ => self.tags.get(name).map(String::as_str),
        }
    }
}

/// The unified tabular view over every month read for one run.
///
/// Built once per invocation, read-only afterwards. Tag columns are the
/// union across months; rows from a month lacking a tag have no value in
/// that column.
#[derive(Debug, Clone, Default)]
pub struct FactTable {
    tag_columns: Vec<String>,
    rows: Vec<FactRow>,
}

impl FactTable {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one month's rows, extending the known tag columns.
    pub fn append(&mut self, tag_columns: impl IntoIterator<Item = String>, rows: Vec<FactRow>) {
        for column in tag_columns {
            if !self.tag_columns.contains(&column) {
                self.tag_columns.push(column);
            }
        }
        self.rows.extend(rows);
    }

    /// Whether queries may filter on this dimension name. Covers the fixed
    /// dimensions plus every tag column seen so far.
    pub fn has_column(&self, name: &str) -> bool {
        FIXED_DIMENSIONS.contains(&name) || self.tag_columns.iter().any(|c| c == name)
    }

    /// All column names of the view, for logging.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = ["day", "service", "operation", "region", "cost"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        columns.extend(self.tag_columns.iter().cloned());
        columns
    }

    /// The view's rows.
    pub fn rows(&self) -> &[FactRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the view holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
