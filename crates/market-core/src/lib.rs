//! Torus Market Simulation Engine Library
//!
//! Consumers and suppliers wander a wrap-around grid and trade one unit at a
//! time when they share a cell. Given a seed, a run is fully reproducible.
//!
//! ```no_run
//! use market_core::{MarketConfig, Simulation};
//!
//! let config = MarketConfig::seeded(400, 40, 30, 30, 42);
//! let mut sim = Simulation::new(&config)?;
//! sim.run_ticks(100)?;
//! for agent in sim.agents() {
//!     println!("{:?}", agent);
//! }
//! # Ok::<(), market_core::SimError>(())
//! ```

pub mod components;
pub mod config;
pub mod error;
pub mod output;
pub mod rng;
pub mod setup;
pub mod simulation;
pub mod systems;

pub use components::*;
pub use config::{ConfigError, MarketConfig};
pub use error::{SimError, SimResult};
pub use rng::{choose, FirstChoice, RandomSource, SeededSource, SimRng};
pub use simulation::Simulation;
pub use systems::{MarketRules, TradeOutcome};
