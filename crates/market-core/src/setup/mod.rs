//! World Setup
//!
//! Resource initialisation and agent spawning.

pub mod population;

pub use population::*;
