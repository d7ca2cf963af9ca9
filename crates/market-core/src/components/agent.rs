//! Agent Components
//!
//! Identity, role, and the role-specific resource counters of market agents.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use market_events::RoleSnapshot;

use crate::error::{SimError, SimResult};

/// Component: Unique, monotonically assigned agent identifier
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Counters of a buying agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerLedger {
    /// Units still wanted
    pub demand: u32,
    /// Money left
    pub income: u32,
    /// Units bought so far
    pub commodities: u32,
}

impl ConsumerLedger {
    pub fn new(demand: u32, income: u32) -> Self {
        Self {
            demand,
            income,
            commodities: 0,
        }
    }

    /// Still wants goods and can pay more than `price`
    pub fn can_buy(&self, price: u32) -> bool {
        self.demand > 0 && self.income > price
    }
}

/// Counters of a selling agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierLedger {
    /// Money earned so far
    pub revenue: u32,
    /// Units still offered
    pub supply: u32,
    /// Produced goods on hand
    pub inventory: u32,
}

impl SupplierLedger {
    pub fn new(supply: u32, inventory: u32) -> Self {
        Self {
            revenue: 0,
            supply,
            inventory,
        }
    }

    pub fn can_sell(&self) -> bool {
        self.supply > 0 && self.inventory > 0
    }
}

/// Component: The agent's role and its counters
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Consumer(ConsumerLedger),
    Supplier(SupplierLedger),
}

impl Role {
    /// Gate checked before the agent looks for a partner
    pub fn ready_to_trade(&self, price: u32) -> bool {
        match self {
            Role::Consumer(ledger) => ledger.can_buy(price),
            Role::Supplier(ledger) => ledger.can_sell(),
        }
    }

    pub fn as_consumer(&self) -> Option<&ConsumerLedger> {
        match self {
            Role::Consumer(ledger) => Some(ledger),
            Role::Supplier(_) => None,
        }
    }

    pub fn as_supplier(&self) -> Option<&SupplierLedger> {
        match self {
            Role::Supplier(ledger) => Some(ledger),
            Role::Consumer(_) => None,
        }
    }
}

impl From<&Role> for RoleSnapshot {
    fn from(role: &Role) -> Self {
        match *role {
            Role::Consumer(c) => RoleSnapshot::Consumer {
                demand: c.demand,
                income: c.income,
                commodities: c.commodities,
            },
            Role::Supplier(s) => RoleSnapshot::Supplier {
                supply: s.supply,
                inventory: s.inventory,
                revenue: s.revenue,
            },
        }
    }
}

/// Resource: Lookup from public agent id to ECS entity
///
/// Ids are handed out in increasing order and never reused.
#[derive(Resource, Debug, Default)]
pub struct AgentDirectory {
    entities: BTreeMap<AgentId, Entity>,
    next_id: u64,
}

impl AgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next agent id
    pub fn allocate(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn register(&mut self, id: AgentId, entity: Entity) {
        self.entities.insert(id, entity);
    }

    pub fn entity(&self, id: AgentId) -> SimResult<Entity> {
        self.entities
            .get(&id)
            .copied()
            .ok_or(SimError::UnknownAgent(id))
    }

    /// All ids in ascending order
    pub fn ids(&self) -> Vec<AgentId> {
        self.entities.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
