//! ECS Systems
//!
//! Movement, trade matching, and the per-tick activation schedule.

pub mod matching;
pub mod movement;
pub mod scheduler;

pub use matching::{settle, transact, DeclineReason, MarketRules, TradeOutcome};
pub use movement::relocate;
pub use scheduler::{
    activate_agents, advance_clock, build_schedule, step_agent, EngineFault, SimClock, TickEvents,
};
