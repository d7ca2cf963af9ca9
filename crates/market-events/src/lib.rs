//! Shared record types for the torus market simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! Reporting code (plots, summaries, exports) depends on it instead of the engine.

pub mod event;
pub mod snapshot;

// Re-export event types
pub use event::{GridCell, Initiator, TradeEvent};

// Re-export snapshot types
pub use snapshot::{AgentSnapshot, MarketSnapshot, MarketTotals, RoleSnapshot};
