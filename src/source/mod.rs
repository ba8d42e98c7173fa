//! Fact source - the queryable store holding monthly billing exports.
//!
//! One table per billing month plus a companion tag-mapping table. The trait
//! keeps the detector independent of where the export actually lives; the
//! bundled implementation reads a local SQLite store.

pub mod sqlite;

pub use sqlite::SqliteFactSource;

use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;

/// Result type for fact source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors from the fact source. All fatal: a run cannot proceed on a partial
/// view of the billing data.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to open the billing store.
    #[error("failed to open billing store: {0}")]
    Open(#[source] rusqlite::Error),

    /// A query against the store failed.
    #[error("billing query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// A row carried a day value that does not parse as a calendar date.
    #[error("malformed day value {value:?}: {source}")]
    MalformedDay {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Mapping from a raw tag column identifier to its readable display name, as
/// declared by one month's companion tag-mapping table. Order is the table's
/// declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMapping {
    entries: Vec<(String, String)>,
}

impl TagMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from (raw column, display name) pairs.
    pub fn from_pairs<I, R, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (R, D)>,
        R: Into<String>,
        D: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(raw, display)| (raw.into(), display.into()))
                .collect(),
        }
    }

    /// Append one entry.
    pub fn push(&mut self, raw: impl Into<String>, display: impl Into<String>) {
        self.entries.push((raw.into(), display.into()));
    }

    /// Raw column identifiers in declared order.
    pub fn raw_columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(raw, _)| raw.as_str())
    }

    /// Readable display names in declared order.
    pub fn display_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, display)| display.as_str())
    }

    /// Number of mapped tags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the month declares no tags.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One pre-aggregated row as the source hands it over: region not yet
/// derived, tag values keyed by the month's display names, not yet
/// normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFactRow {
    pub day: NaiveDate,
    pub service: String,
    pub operation: String,
    pub usage_type: String,
    pub cost: f64,
    pub tags: HashMap<String, String>,
}

/// A queryable store exposing one table per billing month.
///
/// Rows arrive pre-aggregated by (day, service, operation, usage type, tag
/// values), with fee, refund, credit and reserved-instance-fee line items
/// already excluded.
pub trait FactSource {
    /// Fetch the tag mapping declared for one month's table. `month` is the
    /// `YYYYMM` key of the table.
    fn tag_mapping(&self, month: &str) -> SourceResult<TagMapping>;

    /// Fetch the month's pre-aggregated fact rows.
    fn fact_rows(&self, month: &str, tags: &TagMapping) -> SourceResult<Vec<RawFactRow>>;
}
