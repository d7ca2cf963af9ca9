//! Snapshot Types
//!
//! Serialization structs for the post-run agent state.
//!
//! A snapshot is the only view of the engine that reporting code consumes:
//! every agent with its role and final counters, plus aggregate totals.

use serde::{Deserialize, Serialize};

use crate::event::GridCell;

/// Role-specific counters of one agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleSnapshot {
    Consumer {
        demand: u32,
        income: u32,
        commodities: u32,
    },
    Supplier {
        supply: u32,
        inventory: u32,
        revenue: u32,
    },
}

/// One agent's final state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: u64,
    pub cell: GridCell,
    #[serde(flatten)]
    pub role: RoleSnapshot,
}

impl AgentSnapshot {
    pub fn is_consumer(&self) -> bool {
        matches!(self.role, RoleSnapshot::Consumer { .. })
    }

    pub fn is_supplier(&self) -> bool {
        matches!(self.role, RoleSnapshot::Supplier { .. })
    }

    /// Consumer income, if this agent is a consumer
    pub fn income(&self) -> Option<u32> {
        match self.role {
            RoleSnapshot::Consumer { income, .. } => Some(income),
            RoleSnapshot::Supplier { .. } => None,
        }
    }

    /// Supplier revenue, if this agent is a supplier
    pub fn revenue(&self) -> Option<u32> {
        match self.role {
            RoleSnapshot::Supplier { revenue, .. } => Some(revenue),
            RoleSnapshot::Consumer { .. } => None,
        }
    }
}

/// Aggregate counters across the whole population
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketTotals {
    pub consumers: u32,
    pub suppliers: u32,
    pub total_demand: u64,
    pub total_income: u64,
    pub total_commodities: u64,
    pub total_supply: u64,
    pub total_inventory: u64,
    pub total_revenue: u64,
}

impl MarketTotals {
    /// Fold one agent into the totals
    pub fn add(&mut self, agent: &AgentSnapshot) {
        match agent.role {
            RoleSnapshot::Consumer {
                demand,
                income,
                commodities,
            } => {
                self.consumers += 1;
                self.total_demand += u64::from(demand);
                self.total_income += u64::from(income);
                self.total_commodities += u64::from(commodities);
            }
            RoleSnapshot::Supplier {
                supply,
                inventory,
                revenue,
            } => {
                self.suppliers += 1;
                self.total_supply += u64::from(supply);
                self.total_inventory += u64::from(inventory);
                self.total_revenue += u64::from(revenue);
            }
        }
    }

    pub fn from_agents<'a>(agents: impl IntoIterator<Item = &'a AgentSnapshot>) -> Self {
        let mut totals = Self::default();
        for agent in agents {
            totals.add(agent);
        }
        totals
    }
}

/// Complete post-run state of a market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Number of completed ticks
    pub tick: u64,
    pub seed: Option<u64>,
    pub width: u32,
    pub height: u32,
    pub trade_count: u64,
    pub totals: MarketTotals,
    pub agents: Vec<AgentSnapshot>,
}

impl MarketSnapshot {
    pub fn consumers(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.agents.iter().filter(|a| a.is_consumer())
    }

    pub fn suppliers(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.agents.iter().filter(|a| a.is_supplier())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
