//! Scheduler
//!
//! One tick shuffles the whole population and steps every agent once, in
//! that order, one at a time. A step is move-then-interact. Steps are
//! strictly sequential: an agent's step may rewrite its trade partner's
//! counters, so interleaving them would race.

use bevy_ecs::prelude::*;

use market_events::TradeEvent;

use crate::components::agent::{AgentDirectory, AgentId, Role};
use crate::components::grid::TorusGrid;
use crate::error::{SimError, SimResult};
use crate::rng::{choose, RandomSource, SimRng};
use crate::systems::matching::{settle, MarketRules};
use crate::systems::movement::relocate;

/// Resource: Completed tick counter
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimClock {
    pub current_tick: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self) {
        self.current_tick += 1;
    }
}

/// Resource: Trades settled during the current tick
#[derive(Resource, Debug, Default)]
pub struct TickEvents {
    pub trades: Vec<TradeEvent>,
}

impl TickEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, trade: TradeEvent) {
        self.trades.push(trade);
    }

    pub fn drain(&mut self) -> Vec<TradeEvent> {
        std::mem::take(&mut self.trades)
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

/// Resource: First internal-consistency fault raised during a tick
#[derive(Resource, Debug, Default)]
pub struct EngineFault(pub Option<SimError>);

impl EngineFault {
    pub fn take(&mut self) -> Option<SimError> {
        self.0.take()
    }
}

/// One agent's activation: move, then try to trade with a random cellmate
pub fn step_agent(
    world: &mut World,
    source: &mut dyn RandomSource,
    tick: u64,
    agent: AgentId,
) -> SimResult<Option<TradeEvent>> {
    let entity = world.resource::<AgentDirectory>().entity(agent)?;
    let position = relocate(world, source, agent, entity)?;

    let price = world.resource::<MarketRules>().price;
    let ready = world
        .get::<Role>(entity)
        .ok_or(SimError::UnknownAgent(agent))?
        .ready_to_trade(price);
    if !ready {
        return Ok(None);
    }

    let candidate = {
        let cellmates = world.resource::<TorusGrid>().cell_contents(position)?;
        if cellmates.len() < 2 {
            return Ok(None);
        }
        *choose(source, cellmates)?
    };
    if candidate == agent {
        return Ok(None);
    }

    settle(world, tick, agent, candidate)
}

/// System: Shuffle the population and step every agent once.
///
/// Stops at the first fault and leaves it in [`EngineFault`].
pub fn activate_agents(world: &mut World) {
    let tick = world.resource::<SimClock>().current_tick;
    let mut order = world.resource::<AgentDirectory>().ids();

    let fault = world.resource_scope(|world, mut rng: Mut<SimRng>| {
        let source = rng.source();
        source.shuffle_agents(&mut order);

        for agent in order {
            match step_agent(world, source, tick, agent) {
                Ok(Some(trade)) => world.resource_mut::<TickEvents>().push(trade),
                Ok(None) => {}
                Err(err) => return Some(err),
            }
        }
        None
    });

    if let Some(err) = fault {
        tracing::error!(tick, error = %err, "agent activation aborted");
        world.resource_mut::<EngineFault>().0.get_or_insert(err);
    }
}

/// System: Advance the tick counter after the full pass
pub fn advance_clock(mut clock: ResMut<SimClock>, events: Res<TickEvents>) {
    tracing::debug!(
        tick = clock.current_tick,
        trades = events.len(),
        "tick complete"
    );
    clock.advance();
}

/// Build the per-tick schedule
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((activate_agents, advance_clock).chain());
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::{ConsumerLedger, SupplierLedger};
    use crate::components::grid::Position;
    use crate::rng::{FirstChoice, SeededSource};

    fn spawn(world: &mut World, role: Role, at: Position) -> AgentId {
        let id = world.resource_mut::<AgentDirectory>().allocate();
        let entity = world.spawn((id, at, role)).id();
        world.resource_mut::<AgentDirectory>().register(id, entity);
        world.resource_mut::<TorusGrid>().place_agent(id, at).unwrap();
        id
    }

    fn market_world(width: u32, height: u32, source: impl RandomSource + 'static) -> World {
        let mut world = World::new();
        world.insert_resource(TorusGrid::new(width, height).unwrap());
        world.insert_resource(AgentDirectory::new());
        world.insert_resource(MarketRules::default());
        world.insert_resource(SimClock::new());
        world.insert_resource(TickEvents::new());
        world.insert_resource(EngineFault::default());
        world.insert_resource(SimRng::new(source));
        world
    }

    #[test]
    fn test_schedule_advances_clock() {
        let mut world = market_world(3, 3, SeededSource::from_seed(1));
        let mut schedule = build_schedule();

        schedule.run(&mut world);
        schedule.run(&mut world);
        assert_eq!(world.resource::<SimClock>().current_tick, 2);
    }

    #[test]
    fn test_every_agent_moves_each_tick() {
        let mut world = market_world(6, 6, SeededSource::from_seed(5));
        let start = Position::new(2, 2);
        let ids: Vec<_> = (0..10)
            .map(|_| spawn(&mut world, Role::Consumer(ConsumerLedger::new(5, 50)), start))
            .collect();

        build_schedule().run(&mut world);

        let grid = world.resource::<TorusGrid>();
        let neighbors = grid.neighborhood(start, false);
        for id in ids {
            let pos = grid.position_of(id).unwrap();
            assert!(neighbors.contains(&pos), "agent {} did not take one step", id);
        }
    }

    #[test]
    fn test_colocated_pair_trades_once_per_tick() {
        let mut world = market_world(3, 3, FirstChoice);
        let cell = Position::new(1, 1);
        spawn(&mut world, Role::Consumer(ConsumerLedger::new(5, 50)), cell);
        spawn(&mut world, Role::Supplier(SupplierLedger::new(5, 50)), cell);

        build_schedule().run(&mut world);

        let trades = world.resource_mut::<TickEvents>().drain();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].tick, 0);
        // The second mover finds the first in its new cell
        assert_eq!(trades[0].initiator_id(), 1);
    }

    #[test]
    fn test_lone_agent_never_trades() {
        let mut world = market_world(3, 3, SeededSource::from_seed(2));
        let id = spawn(
            &mut world,
            Role::Supplier(SupplierLedger::new(5, 50)),
            Position::new(0, 0),
        );

        let mut source = SeededSource::from_seed(2);
        for tick in 0..10 {
            assert_eq!(step_agent(&mut world, &mut source, tick, id), Ok(None));
        }
    }

    #[test]
    fn test_unknown_agent_records_fault() {
        let mut world = market_world(3, 3, SeededSource::from_seed(2));
        spawn(
            &mut world,
            Role::Consumer(ConsumerLedger::new(5, 50)),
            Position::new(0, 0),
        );
        // Break the grid registration behind the engine's back
        world.resource_mut::<TorusGrid>().remove_agent(AgentId(0)).unwrap();

        build_schedule().run(&mut world);

        let fault = world.resource_mut::<EngineFault>().take();
        assert_eq!(fault, Some(SimError::UnknownAgent(AgentId(0))));
    }
}
