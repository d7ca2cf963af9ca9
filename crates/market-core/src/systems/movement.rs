//! Movement
//!
//! Each activation starts with a random step to one of the eight
//! neighbouring cells.

use bevy_ecs::prelude::*;

use crate::components::agent::AgentId;
use crate::components::grid::{Position, TorusGrid};
use crate::error::{SimError, SimResult};
use crate::rng::{choose, RandomSource};

/// Move `agent` to a uniformly chosen Moore neighbour and return its new cell.
///
/// On a 1x1 grid there is nowhere to go and the agent stays put.
pub fn relocate(
    world: &mut World,
    source: &mut dyn RandomSource,
    agent: AgentId,
    entity: Entity,
) -> SimResult<Position> {
    let current = world
        .get::<Position>(entity)
        .copied()
        .ok_or(SimError::UnknownAgent(agent))?;

    let target = {
        let grid = world.resource::<TorusGrid>();
        let neighbors = grid.neighborhood(current, false);
        if neighbors.is_empty() {
            return Ok(current);
        }
        *choose(source, &neighbors)?
    };

    world.resource_mut::<TorusGrid>().move_agent(agent, target)?;
    if let Some(mut position) = world.get_mut::<Position>(entity) {
        *position = target;
    }
    Ok(target)
}
