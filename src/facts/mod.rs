//! The fact table view over monthly billing exports.
//!
//! Raw monthly tables are fetched through a [`crate::source::FactSource`],
//! normalized (column names folded, `region` derived from the usage-type
//! code, tag columns renamed by each month's tag mapping) and concatenated
//! into one in-memory [`FactTable`] the query filter runs against.

pub mod builder;
pub mod region;
pub mod view;

pub use builder::{build_view, months_to_read};
pub use region::{parse_region, DEFAULT_REGION};
pub use view::{FactRow, FactTable};
