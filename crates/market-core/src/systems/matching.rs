//! Matching Engine
//!
//! The transaction rule between two co-located agents. A trade needs one
//! consumer and one supplier, both past their gates, and then moves exactly
//! one unit of goods against one price's worth of money in a single update.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use market_events::{GridCell, Initiator, TradeEvent};

use crate::components::agent::{AgentDirectory, AgentId, Role};
use crate::components::grid::Position;
use crate::error::{SimError, SimResult};

/// Resource: Price and starting endowments of the market
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketRules {
    /// Money per unit of commodity
    pub price: u32,
    pub consumer_demand: u32,
    pub consumer_income: u32,
    pub supplier_supply: u32,
    pub supplier_inventory: u32,
}

impl Default for MarketRules {
    fn default() -> Self {
        Self {
            price: 5,
            consumer_demand: 5,
            consumer_income: 50,
            supplier_supply: 5,
            supplier_inventory: 50,
        }
    }
}

/// Why an encounter did not produce a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineReason {
    /// Two consumers or two suppliers
    SameRole,
    /// Consumer is sated or cannot afford the price
    ConsumerUnable,
    /// Supplier has nothing left to sell
    SupplierUnable,
    /// Buyer's goods or seller's revenue is already at its ceiling
    LedgerFull,
}

/// Result of evaluating the transaction rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeOutcome {
    Settled { consumer_initiated: bool },
    Declined(DeclineReason),
}

impl TradeOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, TradeOutcome::Settled { .. })
    }
}

/// Apply the transaction rule to an (acting, candidate) pair.
///
/// Either side may be the consumer. All six counters change together or
/// none do.
pub fn transact(acting: &mut Role, candidate: &mut Role, price: u32) -> TradeOutcome {
    let consumer_initiated = matches!(acting, Role::Consumer(_));
    match (acting, candidate) {
        (Role::Consumer(consumer), Role::Supplier(supplier))
        | (Role::Supplier(supplier), Role::Consumer(consumer)) => {
            if !consumer.can_buy(price) {
                return TradeOutcome::Declined(DeclineReason::ConsumerUnable);
            }
            if !supplier.can_sell() {
                return TradeOutcome::Declined(DeclineReason::SupplierUnable);
            }

            let (Some(commodities), Some(revenue)) = (
                consumer.commodities.checked_add(1),
                supplier.revenue.checked_add(price),
            ) else {
                return TradeOutcome::Declined(DeclineReason::LedgerFull);
            };

            consumer.demand -= 1;
            consumer.income -= price;
            consumer.commodities = commodities;

            supplier.supply -= 1;
            supplier.inventory -= 1;
            supplier.revenue = revenue;

            TradeOutcome::Settled { consumer_initiated }
        }
        _ => TradeOutcome::Declined(DeclineReason::SameRole),
    }
}

/// Evaluate a trade between two agents stored in `world`.
///
/// Both roles are read, the rule is applied to the copies, and both are
/// written back only when the trade settles.
pub fn settle(
    world: &mut World,
    tick: u64,
    acting: AgentId,
    candidate: AgentId,
) -> SimResult<Option<TradeEvent>> {
    let rules = *world.resource::<MarketRules>();
    let (acting_entity, candidate_entity) = {
        let directory = world.resource::<AgentDirectory>();
        (directory.entity(acting)?, directory.entity(candidate)?)
    };

    let mut acting_role = *world
        .get::<Role>(acting_entity)
        .ok_or(SimError::UnknownAgent(acting))?;
    let mut candidate_role = *world
        .get::<Role>(candidate_entity)
        .ok_or(SimError::UnknownAgent(candidate))?;
    let cell = *world
        .get::<Position>(acting_entity)
        .ok_or(SimError::UnknownAgent(acting))?;

    let outcome = transact(&mut acting_role, &mut candidate_role, rules.price);
    let TradeOutcome::Settled { consumer_initiated } = outcome else {
        tracing::trace!(%acting, %candidate, ?outcome, "encounter declined");
        return Ok(None);
    };

    if let Some(mut role) = world.get_mut::<Role>(acting_entity) {
        *role = acting_role;
    }
    if let Some(mut role) = world.get_mut::<Role>(candidate_entity) {
        *role = candidate_role;
    }

    let (consumer, supplier, initiator) = if consumer_initiated {
        (acting, candidate, Initiator::Consumer)
    } else {
        (candidate, acting, Initiator::Supplier)
    };
    tracing::trace!(tick, %consumer, %supplier, "trade settled");

    Ok(Some(TradeEvent {
        tick,
        consumer: consumer.0,
        supplier: supplier.0,
        cell: GridCell::from(cell),
        price: rules.price,
        initiator,
    }))
}
