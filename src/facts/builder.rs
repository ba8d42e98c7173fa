//! Fact table view construction from monthly source tables.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::facts::region::parse_region;
use crate::facts::view::{FactRow, FactTable};
use crate::query::definition::tag_dimension_name;
use crate::source::{FactSource, SourceResult};

/// The `YYYYMM` keys of the monthly tables needed to cover a lookback window
/// ending at `target`: the target's month and the month containing
/// (target − lookback days). Ascending, deduplicated.
pub fn months_to_read(target: NaiveDate, lookback_days: u32) -> Vec<String> {
    let earliest = target - Duration::days(i64::from(lookback_days));
    let mut months = vec![
        earliest.format("%Y%m").to_string(),
        target.format("%Y%m").to_string(),
    ];
    months.dedup();
    months
}

/// Build the unified view for one run: fetch each month's tag mapping and
/// rows, normalize tag column names, derive `region` from the usage type,
/// and concatenate. Months are simply appended; the source already
/// pre-aggregated within each month.
pub fn build_view(
    source: &dyn FactSource,
    target: NaiveDate,
    lookback_days: u32,
) -> SourceResult<FactTable> {
    let mut view = FactTable::new();
    for month in months_to_read(target, lookback_days) {
        let mapping = source.tag_mapping(&month)?;
        let raw_rows = source.fact_rows(&month, &mapping)?;
        debug!(%month, rows = raw_rows.len(), tags = mapping.len(), "read monthly table");

        let tag_columns: Vec<String> = mapping
            .display_names()
            .map(tag_dimension_name)
            .collect();
        let rows = raw_rows
            .into_iter()
            .map(|raw| FactRow {
                day: raw.day,
                service: raw.service,
                operation: raw.operation,
                region: parse_region(&raw.usage_type).to_string(),
                cost: raw.cost,
                tags: raw
                    .tags
                    .into_iter()
                    .map(|(name, value)| (tag_dimension_name(&name), value))
                    .collect(),
            })
            .collect();
        view.append(tag_columns, rows);
    }
    Ok(view)
}
