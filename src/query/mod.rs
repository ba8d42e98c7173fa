//! Query definitions, daily cost series, and filtering.

pub mod definition;
pub mod filter;
pub mod series;

pub use definition::{
    normalize_name, tag_dimension_name, Predicate, QueryDefinition, FIXED_DIMENSIONS, TAG_PREFIX,
};
pub use filter::{filter_series, FilterSkip};
pub use series::DailySeries;
