//! Output Systems
//!
//! Post-run summaries and JSON export of the final market state.

pub mod snapshot;
pub mod stats;

pub use snapshot::{read_snapshot, write_snapshot};
pub use stats::{Distribution, MarketSummary};
