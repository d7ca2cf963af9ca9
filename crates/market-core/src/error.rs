//! Engine Errors
//!
//! Failures raised by grid bookkeeping and random selection. Economic
//! preconditions are never errors: a refused trade is a silent no-op.

use thiserror::Error;

use crate::components::agent::AgentId;
use crate::components::grid::Position;

/// Errors produced by the simulation engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Placement outside the grid extents; fatal during setup
    #[error("position ({}, {}) is outside the {width}x{height} grid", .position.x, .position.y)]
    OutOfBounds {
        position: Position,
        width: u32,
        height: u32,
    },

    /// Agent is not registered on the grid (engine invariant violation)
    #[error("agent {0} is not registered")]
    UnknownAgent(AgentId),

    /// Agent was placed twice
    #[error("agent {0} is already registered")]
    DuplicateAgent(AgentId),

    /// Random choice over an empty candidate set
    #[error("cannot choose from an empty sequence")]
    EmptyInput,

    /// Grid with a zero-length side
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// A consistency check over the whole world failed
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

pub type SimResult<T> = Result<T, SimError>;
