//! Query filtering - one concrete definition evaluated against the fact view.

use crate::facts::FactTable;
use crate::query::definition::{Predicate, QueryDefinition};
use crate::query::series::DailySeries;

/// Why a query produced no series this run. These are per-query skips, not
/// errors; the run carries on with the next query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSkip {
    /// Dimensions the view has no column for.
    MissingColumns(Vec<String>),
    /// The predicates matched no rows at all.
    NoRows,
}

/// Evaluate one concrete query definition against the view.
///
/// Every dimension must exist as a view column, or the query is skipped.
/// Predicates are conjoined with AND; a row missing a tag value never
/// matches a predicate on that tag. Matching rows are grouped by day and
/// their costs summed.
pub fn filter_series(
    view: &FactTable,
    definition: &QueryDefinition,
) -> Result<DailySeries, FilterSkip> {
    let missing: Vec<String> = definition
        .dimensions()
        .filter(|d| !view.has_column(d))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(FilterSkip::MissingColumns(missing));
    }

    let predicates: Vec<(&str, Predicate)> = definition
        .iter()
        .map(|(dimension, value)| (dimension, Predicate::parse(value)))
        .collect();

    let mut series = DailySeries::new();
    for row in view.rows() {
        let matches = predicates.iter().all(|(dimension, predicate)| {
            row.dimension(dimension)
                .map_or(false, |value| predicate.matches(value))
        });
        if matches {
            series.add(row.day, row.cost);
        }
    }

    if series.is_empty() {
        return Err(FilterSkip::NoRows);
    }
    Ok(series)
}
