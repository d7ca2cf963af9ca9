//! ECS Components
//!
//! Agent identity and ledgers, grid positions, and engine-wide resources.

pub mod agent;
pub mod grid;

pub use agent::*;
pub use grid::*;
