//! Simulation Runner
//!
//! Owns the ECS world (grid, agents, random source, clock) and the tick
//! schedule. Callers build a [`Simulation`], run it for as many ticks as they
//! like, then read the final agent state.

use bevy_ecs::prelude::*;
use std::collections::HashSet;

use market_events::{AgentSnapshot, MarketSnapshot, MarketTotals, TradeEvent};

use crate::components::agent::{AgentDirectory, AgentId, Role};
use crate::components::grid::{Position, TorusGrid};
use crate::config::MarketConfig;
use crate::error::{SimError, SimResult};
use crate::rng::{RandomSource, SeededSource, SimRng};
use crate::setup::{new_consumer, new_supplier, spawn_agent, spawn_population, PopulationSpec};
use crate::systems::matching::MarketRules;
use crate::systems::scheduler::{build_schedule, EngineFault, SimClock, TickEvents};

/// A running market: one torus, one population, one random stream
pub struct Simulation {
    world: World,
    schedule: Schedule,
    seed: Option<u64>,
    trades: Vec<TradeEvent>,
    /// Totals at spawn time, the reference for conservation checks
    baseline: MarketTotals,
}

impl Simulation {
    /// Build a market from `config`, seeded from `config.simulation.seed`
    pub fn new(config: &MarketConfig) -> SimResult<Self> {
        let seed = config.simulation.seed;
        let mut sim = Self::with_source(config, SeededSource::new(seed))?;
        sim.seed = seed;
        Ok(sim)
    }

    /// Build a market drawing every random decision from `source`
    pub fn with_source(
        config: &MarketConfig,
        mut source: impl RandomSource + 'static,
    ) -> SimResult<Self> {
        let mut sim = Self::empty(config.grid.width, config.grid.height, config.economy)?;
        let spec = PopulationSpec::from(&config.population);
        spawn_population(&mut sim.world, &mut source, spec)?;
        sim.world.insert_resource(SimRng::new(source));
        sim.baseline = sim.totals();

        tracing::info!(
            consumers = spec.consumers,
            suppliers = spec.suppliers,
            width = config.grid.width,
            height = config.grid.height,
            "market initialised"
        );
        Ok(sim)
    }

    /// A market with no agents; populate it with the `spawn_*_at` methods
    pub fn empty(width: u32, height: u32, rules: MarketRules) -> SimResult<Self> {
        let mut world = World::new();
        world.insert_resource(TorusGrid::new(width, height)?);
        world.insert_resource(AgentDirectory::new());
        world.insert_resource(rules);
        world.insert_resource(SimClock::new());
        world.insert_resource(TickEvents::new());
        world.insert_resource(EngineFault::default());
        world.insert_resource(SimRng::new(SeededSource::from_entropy()));

        Ok(Self {
            world,
            schedule: build_schedule(),
            seed: None,
            trades: Vec::new(),
            baseline: MarketTotals::default(),
        })
    }

    /// Replace the random source (keeps agents and clock)
    pub fn set_source(&mut self, source: impl RandomSource + 'static) {
        self.world.insert_resource(SimRng::new(source));
    }

    pub fn spawn_consumer_at(&mut self, pos: Position) -> SimResult<AgentId> {
        let role = new_consumer(self.rules());
        self.spawn_with_role(role, pos)
    }

    pub fn spawn_supplier_at(&mut self, pos: Position) -> SimResult<AgentId> {
        let role = new_supplier(self.rules());
        self.spawn_with_role(role, pos)
    }

    /// Spawn an agent with explicit counters
    pub fn spawn_with_role(&mut self, role: Role, pos: Position) -> SimResult<AgentId> {
        let id = spawn_agent(&mut self.world, role, pos)?;
        self.baseline.add(&AgentSnapshot {
            agent_id: id.0,
            cell: pos.into(),
            role: (&role).into(),
        });
        Ok(id)
    }

    /// Run one full tick
    pub fn tick(&mut self) -> SimResult<()> {
        self.schedule.run(&mut self.world);

        // Trades settled before a fault already changed both ledgers
        let settled = self.world.resource_mut::<TickEvents>().drain();
        self.trades.extend(settled);
        match self.world.resource_mut::<EngineFault>().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Run `n` ticks, stopping at the first engine fault
    pub fn run_ticks(&mut self, n: u64) -> SimResult<()> {
        for _ in 0..n {
            self.tick()?;
        }
        tracing::info!(
            tick = self.current_tick(),
            trades = self.trades.len(),
            "run finished"
        );
        Ok(())
    }

    /// Number of completed ticks
    pub fn current_tick(&self) -> u64 {
        self.world.resource::<SimClock>().current_tick
    }

    pub fn rules(&self) -> &MarketRules {
        self.world.resource::<MarketRules>()
    }

    pub fn grid(&self) -> &TorusGrid {
        self.world.resource::<TorusGrid>()
    }

    pub fn agent_count(&self) -> usize {
        self.world.resource::<AgentDirectory>().len()
    }

    /// Every settled trade so far, in settlement order
    pub fn trades(&self) -> &[TradeEvent] {
        &self.trades
    }

    /// Current role and counters of one agent
    pub fn role_of(&self, agent: AgentId) -> SimResult<Role> {
        let entity = self.world.resource::<AgentDirectory>().entity(agent)?;
        self.world
            .get::<Role>(entity)
            .copied()
            .ok_or(SimError::UnknownAgent(agent))
    }

    /// All agents with their final counters, ordered by id
    pub fn agents(&self) -> Vec<AgentSnapshot> {
        let directory = self.world.resource::<AgentDirectory>();
        directory
            .ids()
            .into_iter()
            .filter_map(|id| {
                let entity = directory.entity(id).ok()?;
                let role = self.world.get::<Role>(entity)?;
                let pos = self.world.get::<Position>(entity)?;
                Some(AgentSnapshot {
                    agent_id: id.0,
                    cell: (*pos).into(),
                    role: role.into(),
                })
            })
            .collect()
    }

    pub fn totals(&self) -> MarketTotals {
        MarketTotals::from_agents(&self.agents())
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        let agents = self.agents();
        let grid = self.grid();
        MarketSnapshot {
            tick: self.current_tick(),
            seed: self.seed,
            width: grid.width(),
            height: grid.height(),
            trade_count: self.trades.len() as u64,
            totals: MarketTotals::from_agents(&agents),
            agents,
        }
    }

    /// Check grid consistency and goods conservation over the whole world
    pub fn check_invariants(&self) -> SimResult<()> {
        let directory = self.world.resource::<AgentDirectory>();
        let grid = self.grid();

        if grid.occupant_count() != directory.len() {
            return Err(SimError::InvariantViolation(format!(
                "{} agents registered on the grid, {} alive",
                grid.occupant_count(),
                directory.len()
            )));
        }

        let mut seen = HashSet::new();
        for (cell, occupants) in grid.occupied_cells() {
            for agent in occupants {
                if !seen.insert(*agent) {
                    return Err(SimError::InvariantViolation(format!(
                        "agent {} occupies more than one cell",
                        agent
                    )));
                }
                let entity = directory.entity(*agent)?;
                let stored = self.world.get::<Position>(entity).copied();
                if stored != Some(cell) {
                    return Err(SimError::InvariantViolation(format!(
                        "agent {} stored at {:?} but registered at {:?}",
                        agent, stored, cell
                    )));
                }
            }
        }

        let totals = self.totals();
        let trades = self.trades.len() as u64;
        let flows = [
            (
                "commodities bought",
                totals.total_commodities.checked_sub(self.baseline.total_commodities),
            ),
            (
                "inventory sold",
                self.baseline.total_inventory.checked_sub(totals.total_inventory),
            ),
        ];
        for (flow, units) in flows {
            if units != Some(trades) {
                return Err(SimError::InvariantViolation(format!(
                    "{} is {:?} after {} trades",
                    flow, units, trades
                )));
            }
        }

        let spent = self.baseline.total_income.checked_sub(totals.total_income);
        let earned = totals.total_revenue.checked_sub(self.baseline.total_revenue);
        if spent.is_none() || spent != earned {
            return Err(SimError::InvariantViolation(format!(
                "consumers spent {:?} but suppliers earned {:?}",
                spent, earned
            )));
        }
        Ok(())
    }
}
