//! Population Spawning
//!
//! Creates consumers and suppliers with their starting endowments and
//! registers each one on the grid.

use bevy_ecs::prelude::*;

use crate::components::agent::{AgentDirectory, AgentId, ConsumerLedger, Role, SupplierLedger};
use crate::components::grid::{Position, TorusGrid};
use crate::error::SimResult;
use crate::rng::RandomSource;
use crate::systems::matching::MarketRules;

/// How many agents of each kind to create
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationSpec {
    pub consumers: u32,
    pub suppliers: u32,
}

/// Starting role for a fresh consumer
pub fn new_consumer(rules: &MarketRules) -> Role {
    Role::Consumer(ConsumerLedger::new(rules.consumer_demand, rules.consumer_income))
}

/// Starting role for a fresh supplier
pub fn new_supplier(rules: &MarketRules) -> Role {
    Role::Supplier(SupplierLedger::new(rules.supplier_supply, rules.supplier_inventory))
}

/// Spawn one agent at `pos`, registering it on the grid first.
///
/// Nothing is spawned when the position is out of bounds.
pub fn spawn_agent(world: &mut World, role: Role, pos: Position) -> SimResult<AgentId> {
    let id = world.resource_mut::<AgentDirectory>().allocate();
    world.resource_mut::<TorusGrid>().place_agent(id, pos)?;

    let entity = world.spawn((id, pos, role)).id();
    world.resource_mut::<AgentDirectory>().register(id, entity);
    Ok(id)
}

/// Uniformly random cell
pub fn random_position(grid: &TorusGrid, source: &mut dyn RandomSource) -> Position {
    let x = source.coordinate(grid.width());
    let y = source.coordinate(grid.height());
    Position::new(x, y)
}

/// Spawn consumers then suppliers at random cells. Ids run 0..N in that order.
pub fn spawn_population(
    world: &mut World,
    source: &mut dyn RandomSource,
    spec: PopulationSpec,
) -> SimResult<Vec<AgentId>> {
    let rules = *world.resource::<MarketRules>();
    let consumers = spec.consumers as usize;
    let suppliers = spec.suppliers as usize;
    let roles = std::iter::repeat(new_consumer(&rules))
        .take(consumers)
        .chain(std::iter::repeat(new_supplier(&rules)).take(suppliers));

    let spawned = roles
        .map(|role| {
            let pos = random_position(world.resource::<TorusGrid>(), source);
            spawn_agent(world, role, pos)
        })
        .collect::<SimResult<Vec<_>>>()?;

    tracing::debug!(
        consumers = spec.consumers,
        suppliers = spec.suppliers,
        "population spawned"
    );
    Ok(spawned)
}
