//! Torus Grid
//!
//! A fixed-size grid whose edges wrap in both directions. Any number of agents
//! may share a cell. Every cell therefore has a full Moore neighbourhood and
//! no region of the grid sees fewer encounters than another.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use market_events::GridCell;

use crate::components::agent::AgentId;
use crate::error::{SimError, SimResult};

/// Component: An agent's current cell
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<Position> for GridCell {
    fn from(position: Position) -> Self {
        GridCell::new(position.x, position.y)
    }
}

/// Moore offsets in scan order
const MOORE_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Resource: Cell occupancy for the whole population
#[derive(Resource, Debug, Clone)]
pub struct TorusGrid {
    width: u32,
    height: u32,
    /// Row-major occupant lists, in arrival order
    cells: Vec<Vec<AgentId>>,
    /// Reverse index: where each registered agent lives
    positions: HashMap<AgentId, Position>,
}

impl TorusGrid {
    pub fn new(width: u32, height: u32) -> SimResult<Self> {
        if width == 0 || height == 0 {
            return Err(SimError::InvalidDimensions { width, height });
        }
        let cell_count = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            cells: vec![Vec::new(); cell_count],
            positions: HashMap::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Wrap signed coordinates onto the torus
    pub fn wrap(&self, x: i64, y: i64) -> Position {
        Position::new(
            x.rem_euclid(i64::from(self.width)) as u32,
            y.rem_euclid(i64::from(self.height)) as u32,
        )
    }

    fn index(&self, pos: Position) -> SimResult<usize> {
        if !self.contains(pos) {
            return Err(SimError::OutOfBounds {
                position: pos,
                width: self.width,
                height: self.height,
            });
        }
        Ok(pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Moore neighbourhood of `pos`, wrapped, without duplicates.
    ///
    /// Yields 8 cells (9 with the centre) on grids of at least 3x3. On
    /// narrower grids wrapped duplicates collapse, and the centre only
    /// appears when `include_center` is set.
    pub fn neighborhood(&self, pos: Position, include_center: bool) -> Vec<Position> {
        let mut cells = Vec::with_capacity(9);
        if include_center {
            cells.push(pos);
        }
        for (dx, dy) in MOORE_OFFSETS {
            let cell = self.wrap(i64::from(pos.x) + dx, i64::from(pos.y) + dy);
            if (cell != pos || include_center) && !cells.contains(&cell) {
                cells.push(cell);
            }
        }
        cells
    }

    /// Agents registered at `pos`, in arrival order
    pub fn cell_contents(&self, pos: Position) -> SimResult<&[AgentId]> {
        let index = self.index(pos)?;
        Ok(&self.cells[index])
    }

    pub fn is_cell_empty(&self, pos: Position) -> bool {
        self.cell_contents(pos).map_or(true, |c| c.is_empty())
    }

    pub fn position_of(&self, agent: AgentId) -> Option<Position> {
        self.positions.get(&agent).copied()
    }

    /// Number of registered agents
    pub fn occupant_count(&self) -> usize {
        self.positions.len()
    }

    /// Register a new agent at `pos`
    pub fn place_agent(&mut self, agent: AgentId, pos: Position) -> SimResult<()> {
        let index = self.index(pos)?;
        if self.positions.contains_key(&agent) {
            return Err(SimError::DuplicateAgent(agent));
        }
        self.cells[index].push(agent);
        self.positions.insert(agent, pos);
        Ok(())
    }

    /// Move a registered agent to `new_pos`, appending it to that cell
    pub fn move_agent(&mut self, agent: AgentId, new_pos: Position) -> SimResult<()> {
        let target = self.index(new_pos)?;
        let current = self
            .positions
            .get(&agent)
            .copied()
            .ok_or(SimError::UnknownAgent(agent))?;
        let source = self.index(current)?;

        self.cells[source].retain(|occupant| *occupant != agent);
        self.cells[target].push(agent);
        self.positions.insert(agent, new_pos);
        Ok(())
    }

    /// Unregister an agent, returning its last position
    pub fn remove_agent(&mut self, agent: AgentId) -> SimResult<Position> {
        let pos = self
            .positions
            .remove(&agent)
            .ok_or(SimError::UnknownAgent(agent))?;
        let index = self.index(pos)?;
        self.cells[index].retain(|occupant| *occupant != agent);
        Ok(pos)
    }

    /// Non-empty cells with their occupants, row-major
    pub fn occupied_cells(&self) -> impl Iterator<Item = (Position, &[AgentId])> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, occupants)| !occupants.is_empty())
            .map(move |(i, occupants)| {
                let pos = Position::new(i as u32 % width, i as u32 / width);
                (pos, occupants.as_slice())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_zero_dimensions_rejected() {
        assert_eq!(
            TorusGrid::new(0, 4).unwrap_err(),
            SimError::InvalidDimensions { width: 0, height: 4 }
        );
        assert!(TorusGrid::new(3, 0).is_err());
    }

    #[test]
    fn test_corner_neighborhood_wraps() {
        let grid = TorusGrid::new(5, 4).unwrap();
        let cells: HashSet<_> = grid
            .neighborhood(Position::new(0, 0), false)
            .into_iter()
            .collect();

        assert_eq!(cells.len(), 8);
        assert!(!cells.contains(&Position::new(0, 0)));
        for expected in [
            Position::new(4, 3),
            Position::new(4, 0),
            Position::new(0, 3),
            Position::new(1, 3),
            Position::new(4, 1),
            Position::new(1, 0),
            Position::new(0, 1),
            Position::new(1, 1),
        ] {
            assert!(cells.contains(&expected), "missing {:?}", expected);
        }
    }

    #[test]
    fn test_neighborhood_with_center() {
        let grid = TorusGrid::new(3, 3).unwrap();
        let cells = grid.neighborhood(Position::new(1, 1), true);
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], Position::new(1, 1));
    }

    #[test]
    fn test_every_cell_has_full_neighborhood() {
        let grid = TorusGrid::new(4, 3).unwrap();
        for x in 0..4 {
            for y in 0..3 {
                let cells = grid.neighborhood(Position::new(x, y), false);
                assert_eq!(cells.len(), 8, "cell ({}, {})", x, y);
                assert!(cells.iter().all(|c| grid.contains(*c)));
            }
        }
    }

    #[test]
    fn test_degenerate_grids() {
        let single = TorusGrid::new(1, 1).unwrap();
        assert!(single.neighborhood(Position::new(0, 0), false).is_empty());
        assert_eq!(single.neighborhood(Position::new(0, 0), true).len(), 1);

        let narrow = TorusGrid::new(2, 2).unwrap();
        let cells = narrow.neighborhood(Position::new(0, 0), false);
        assert_eq!(cells.len(), 3);
    }

    #[test]
    fn test_place_out_of_bounds() {
        let mut grid = TorusGrid::new(3, 3).unwrap();
        let err = grid.place_agent(AgentId(0), Position::new(3, 0)).unwrap_err();
        assert!(matches!(err, SimError::OutOfBounds { .. }));
        assert_eq!(grid.occupant_count(), 0);
    }

    #[test]
    fn test_place_twice_rejected() {
        let mut grid = TorusGrid::new(3, 3).unwrap();
        grid.place_agent(AgentId(0), Position::new(0, 0)).unwrap();
        assert_eq!(
            grid.place_agent(AgentId(0), Position::new(1, 1)),
            Err(SimError::DuplicateAgent(AgentId(0)))
        );
    }

    #[test]
    fn test_multi_occupancy_and_move() {
        let mut grid = TorusGrid::new(3, 3).unwrap();
        let cell = Position::new(1, 1);
        grid.place_agent(AgentId(0), cell).unwrap();
        grid.place_agent(AgentId(1), cell).unwrap();
        grid.place_agent(AgentId(2), Position::new(2, 2)).unwrap();

        assert_eq!(grid.cell_contents(cell).unwrap(), &[AgentId(0), AgentId(1)]);

        grid.move_agent(AgentId(0), Position::new(2, 2)).unwrap();
        assert_eq!(grid.cell_contents(cell).unwrap(), &[AgentId(1)]);
        assert_eq!(
            grid.cell_contents(Position::new(2, 2)).unwrap(),
            &[AgentId(2), AgentId(0)]
        );
        assert_eq!(grid.position_of(AgentId(0)), Some(Position::new(2, 2)));
        assert_eq!(grid.occupant_count(), 3);
    }

    #[test]
    fn test_move_unknown_agent() {
        let mut grid = TorusGrid::new(3, 3).unwrap();
        assert_eq!(
            grid.move_agent(AgentId(5), Position::new(0, 0)),
            Err(SimError::UnknownAgent(AgentId(5)))
        );
    }

    #[test]
    fn test_remove_agent() {
        let mut grid = TorusGrid::new(3, 3).unwrap();
        grid.place_agent(AgentId(0), Position::new(2, 1)).unwrap();

        assert_eq!(grid.remove_agent(AgentId(0)), Ok(Position::new(2, 1)));
        assert!(grid.is_cell_empty(Position::new(2, 1)));
        assert!(grid.remove_agent(AgentId(0)).is_err());
    }

    #[test]
    fn test_occupied_cells() {
        let mut grid = TorusGrid::new(4, 2).unwrap();
        grid.place_agent(AgentId(0), Position::new(3, 1)).unwrap();
        grid.place_agent(AgentId(1), Position::new(0, 0)).unwrap();

        let occupied: Vec<_> = grid.occupied_cells().map(|(pos, _)| pos).collect();
        assert_eq!(occupied, vec![Position::new(0, 0), Position::new(3, 1)]);
    }
}
