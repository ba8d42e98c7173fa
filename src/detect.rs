//! End-to-end detection: configuration to anomaly results.
//!
//! ```text
//! Settings → Expand Queries → Fact Table View → Filter → Score → Sinks
//! ```
//!
//! # Example
//!
//! ```ignore
//! use kestrel::prelude::*;
//!
//! let settings = Settings::load()?;
//! settings.validate()?;
//! let source = SqliteFactSource::open("./billing.db", Vec::new())?;
//! let mut sinks: Vec<Box<dyn ResultSink>> =
//!     vec![Box::new(SqliteSink::open("./anomalies.db")?)];
//! let ctx = RunContext::new("./runs/markers");
//! let summary = run_detector(&settings, date, &source, &mut sinks, &ctx)?;
//! println!("{} results written", summary.written);
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Settings, SettingsError};
use crate::expand::expand_queries;
use crate::facts::build_view;
use crate::query::{filter_series, FilterSkip};
use crate::run_context::RunContext;
use crate::score::score_series;
use crate::sink::{ResultSink, SinkError};
use crate::source::{FactSource, SourceError};

// ============================================================================
// Error Types
// ============================================================================

/// Fatal errors aborting a run. Per-query data-absence conditions are not
/// errors; they are logged skips counted in the [`RunSummary`].
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("configuration error: {0}")]
    Settings(#[from] SettingsError),

    #[error("fact source error: {0}")]
    Source(#[from] SourceError),

    #[error("result sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("failed to record completion marker: {0}")]
    Marker(#[source] std::io::Error),
}

pub type DetectResult<T> = Result<T, DetectError>;

// ============================================================================
// Result Types
// ============================================================================

/// Outcome counters for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// The run no-oped because a completion marker already existed.
    pub already_complete: bool,

    /// Concrete queries after dimension expansion.
    pub expanded: usize,

    /// Queries whose dimensions are missing from the view's columns.
    pub skipped_missing_columns: usize,

    /// Queries with no matching rows, or no value on the target date.
    pub skipped_no_data: usize,

    /// All-zero results discarded as "no activity".
    pub suppressed: usize,

    /// Results handed to the sinks.
    pub written: usize,
}

// ============================================================================
// Detection
// ============================================================================

/// Run the detector for one target date across all configured queries.
///
/// Queries are evaluated sequentially in name order against one shared,
/// read-only fact table view. Each surviving result is written to every
/// sink. Source and sink failures abort the run; a failed run records no
/// completion marker, so re-invocation recomputes it.
pub fn run_detector(
    settings: &Settings,
    date: NaiveDate,
    source: &dyn FactSource,
    sinks: &mut [Box<dyn ResultSink>],
    ctx: &RunContext,
) -> DetectResult<RunSummary> {
    let mut summary = RunSummary::default();

    // Step 1: idempotency guard - a completed run for this date stands.
    if ctx.markers.is_complete(date) {
        info!(%date, "run already complete, skipping");
        summary.already_complete = true;
        return Ok(summary);
    }

    // Step 2: expand declarative queries into concrete per-region queries.
    let queries = expand_queries(&settings.queries, &settings.aws_query_regions);
    summary.expanded = queries.len();

    // Step 3: build the fact table view covering the lookback window.
    let view = build_view(source, date, settings.detector.history_period_days)?;
    info!(
        rows = view.len(),
        columns = ?view.columns(),
        "fact table view ready"
    );

    let params = settings.score_params(date);

    // Step 4: filter, score, and write out each query.
    for (name, definition) in &queries {
        let series = match filter_series(&view, definition) {
            Ok(series) => series,
            Err(FilterSkip::MissingColumns(missing)) => {
                warn!(query = %name, ?missing, "dimensions not in the fact table, skipping");
                summary.skipped_missing_columns += 1;
                continue;
            }
            Err(FilterSkip::NoRows) => {
                info!(query = %name, "no data for this query, skipping");
                summary.skipped_no_data += 1;
                continue;
            }
        };

        if !series.contains(date) {
            info!(query = %name, %date, "no data on the target date, skipping");
            summary.skipped_no_data += 1;
            continue;
        }

        let Some(result) = score_series(name, &series, &params) else {
            debug!(query = %name, "all-zero result suppressed");
            summary.suppressed += 1;
            continue;
        };

        info!(
            query = %name,
            score = result.score,
            is_anomaly = result.is_anomaly,
            cost = result.cost,
            "scored"
        );
        for sink in sinks.iter_mut() {
            sink.write(&result)?;
        }
        summary.written += 1;
    }

    // Step 5: record completion.
    ctx.markers.mark_complete(date).map_err(DetectError::Marker)?;

    info!(
        written = summary.written,
        skipped_missing_columns = summary.skipped_missing_columns,
        skipped_no_data = summary.skipped_no_data,
        suppressed = summary.suppressed,
        "run complete"
    );
    Ok(summary)
}
