//! Trade Events
//!
//! One record per settled trade between a consumer and a supplier.

use serde::{Deserialize, Serialize};

/// A cell on the torus, as seen by reporting code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub x: u32,
    pub y: u32,
}

impl GridCell {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Which side of the pair was stepping when the trade happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initiator {
    Consumer,
    Supplier,
}

/// A settled trade: one unit of commodity for `price` units of money
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeEvent {
    /// Tick in which the trade settled (0-based)
    pub tick: u64,
    pub consumer: u64,
    pub supplier: u64,
    /// Cell shared by both agents at settlement time
    pub cell: GridCell,
    pub price: u32,
    pub initiator: Initiator,
}

impl TradeEvent {
    /// Id of the agent whose step triggered the trade
    pub fn initiator_id(&self) -> u64 {
        match self.initiator {
            Initiator::Consumer => self.consumer,
            Initiator::Supplier => self.supplier,
        }
    }
}
