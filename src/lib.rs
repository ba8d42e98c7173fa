//! # Kestrel
//!
//! Dimensional cost anomaly detection for cloud billing exports.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Query Definitions (declarative, from config)      │
//! │     (service, operation, region, tags; * wildcards)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [expand]
//! ┌─────────────────────────────────────────────────────────┐
//! │    Concrete per-region queries (+ "general" variant)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [query::filter]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Fact Table View (monthly billing exports, [facts])     │
//! │              → one daily cost series per query           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [score]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Baseline statistics → bounded score + verdict          │
//! │              → result sinks (store + archive)            │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod detect;
pub mod expand;
pub mod facts;
pub mod query;
pub mod run_context;
pub mod score;
pub mod sink;
pub mod source;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::{Settings, SettingsError};
    pub use crate::detect::{run_detector, DetectError, RunSummary};
    pub use crate::expand::expand_queries;
    pub use crate::facts::{build_view, FactRow, FactTable};
    pub use crate::query::{filter_series, DailySeries, Predicate, QueryDefinition};
    pub use crate::run_context::RunContext;
    pub use crate::score::{score_series, AnomalyResult, ScoreParams};
    pub use crate::sink::{ArchiveSink, ResultSink, SqliteSink};
    pub use crate::source::{FactSource, SqliteFactSource, TagMapping};
}
