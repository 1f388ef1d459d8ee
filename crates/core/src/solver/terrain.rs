//! Static solver view of a grid plus the packed search-state key.

use crate::push::{ChainBoard, LandingBlocker, walk_push_chain};
use crate::state::Grid;
use crate::types::{Direction, DirectionSet, Pos, Tile};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TerrainCell {
    Rock,
    /// Plain floor, including cells that started under a block.
    Floor,
    Exit,
    /// Walkable, but no block may land here.
    Feature(LandingBlocker),
}

/// Search vertex: player cell plus every block's cell in fixed slot order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct StateKey {
    pub(crate) player: u32,
    pub(crate) blocks: Box<[u32]>,
}

pub(crate) struct Transition {
    pub(crate) next: StateKey,
    /// Block slots shifted by this move, chain head first. Empty for a plain step.
    pub(crate) moved: Vec<usize>,
}

impl Transition {
    pub(crate) fn pushed(&self) -> bool {
        !self.moved.is_empty()
    }
}

pub(crate) struct Terrain {
    width: usize,
    height: usize,
    cells: Vec<TerrainCell>,
    block_directions: Vec<DirectionSet>,
    initial_blocks: Box<[u32]>,
    exit: u32,
}

impl Terrain {
    /// Returns `None` when `exit` lies outside the grid.
    pub(crate) fn from_grid(grid: &Grid, exit: Pos) -> Option<Self> {
        if !grid.in_bounds(exit) {
            return None;
        }
        let mut cells = Vec::with_capacity(grid.tiles().len());
        let mut block_directions = Vec::new();
        let mut initial_blocks = Vec::new();
        for (index, tile) in grid.tiles().iter().enumerate() {
            let cell = match tile {
                Tile::Rock => TerrainCell::Rock,
                Tile::Empty { .. } => TerrainCell::Floor,
                Tile::Block { directions, .. } => {
                    block_directions.push(*directions);
                    initial_blocks.push(index as u32);
                    TerrainCell::Floor
                }
                Tile::Trap { .. } => TerrainCell::Feature(LandingBlocker::Trap),
                Tile::Treasure { .. } => TerrainCell::Feature(LandingBlocker::Treasure),
                Tile::MagicItem { .. } => TerrainCell::Feature(LandingBlocker::MagicItem),
                Tile::Exit { .. } => TerrainCell::Exit,
            };
            cells.push(cell);
        }
        let exit_index = grid.index(exit);
        cells[exit_index] = TerrainCell::Exit;

        Some(Self {
            width: grid.width(),
            height: grid.height(),
            cells,
            block_directions,
            initial_blocks: initial_blocks.into_boxed_slice(),
            exit: exit_index as u32,
        })
    }

    pub(crate) fn exit(&self) -> u32 {
        self.exit
    }

    pub(crate) fn exit_pos(&self) -> Pos {
        self.pos_of(self.exit)
    }

    pub(crate) fn index(&self, pos: Pos) -> Option<u32> {
        if pos.x < 0 || pos.y < 0 || pos.x as usize >= self.width || pos.y as usize >= self.height {
            return None;
        }
        Some((pos.y as usize * self.width + pos.x as usize) as u32)
    }

    pub(crate) fn pos_of(&self, index: u32) -> Pos {
        let index = index as usize;
        Pos { y: (index / self.width) as i32, x: (index % self.width) as i32 }
    }

    /// Initial state with the player on `pos`, if a player can stand there.
    pub(crate) fn start_state(&self, pos: Pos) -> Option<StateKey> {
        let player = self.index(pos)?;
        if self.cells[player as usize] == TerrainCell::Rock || self.initial_blocks.contains(&player) {
            return None;
        }
        Some(StateKey { player, blocks: self.initial_blocks.clone() })
    }

    /// Applies one player move to `state` under the shared chain-push rule.
    pub(crate) fn advance(&self, state: &StateKey, direction: Direction) -> Option<Transition> {
        let target = self.pos_of(state.player).step(direction);
        let target_index = self.index(target)?;
        if self.cells[target_index as usize] == TerrainCell::Rock {
            return None;
        }

        let board = SolverBoard { terrain: self, blocks: &state.blocks };
        if board.slot_at(target_index).is_none() {
            return Some(Transition {
                next: StateKey { player: target_index, blocks: state.blocks.clone() },
                moved: Vec::new(),
            });
        }

        let chain = walk_push_chain(&board, target, direction).ok()?;
        let mut blocks = state.blocks.to_vec();
        let mut moved = Vec::with_capacity(chain.len());
        for cell in &chain.cells {
            let slot = board.slot_at(self.index(*cell)?)?;
            blocks[slot] = self.index(cell.step(direction))?;
            moved.push(slot);
        }
        Some(Transition {
            next: StateKey { player: target_index, blocks: blocks.into_boxed_slice() },
            moved,
        })
    }
}

struct SolverBoard<'a> {
    terrain: &'a Terrain,
    blocks: &'a [u32],
}

impl SolverBoard<'_> {
    fn slot_at(&self, index: u32) -> Option<usize> {
        self.blocks.iter().position(|&block| block == index)
    }
}

impl ChainBoard for SolverBoard<'_> {
    fn in_bounds(&self, pos: Pos) -> bool {
        self.terrain.index(pos).is_some()
    }

    fn block_directions(&self, pos: Pos) -> Option<DirectionSet> {
        let slot = self.slot_at(self.terrain.index(pos)?)?;
        Some(self.terrain.block_directions[slot])
    }

    fn check_landing(&self, pos: Pos) -> Result<(), LandingBlocker> {
        let Some(index) = self.terrain.index(pos) else {
            return Err(LandingBlocker::Rock);
        };
        if self.slot_at(index).is_some() {
            return Err(LandingBlocker::Block);
        }
        match self.terrain.cells[index as usize] {
            TerrainCell::Floor => Ok(()),
            TerrainCell::Rock => Err(LandingBlocker::Rock),
            TerrainCell::Exit => Err(LandingBlocker::Exit),
            TerrainCell::Feature(blocker) => Err(blocker),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{grid_from_rows, turn_pocket_fixture};

    #[test]
    fn block_cells_become_floor_and_fill_slots_row_major() {
        let grid = grid_from_rows(&["#####", "#B.R#", "#.V.#", "#####"]);
        let terrain = Terrain::from_grid(&grid, Pos { y: 2, x: 3 }).unwrap();
        assert_eq!(terrain.initial_blocks.as_ref(), &[6, 8, 12]);
        assert_eq!(terrain.cells[6], TerrainCell::Floor);
        assert_eq!(terrain.block_directions[1], DirectionSet::single(Direction::Right));
        assert_eq!(terrain.cells[13], TerrainCell::Exit);
    }

    #[test]
    fn start_state_rejects_rock_and_block_cells() {
        let grid = grid_from_rows(&["#####", "#B..#", "#####"]);
        let terrain = Terrain::from_grid(&grid, Pos { y: 1, x: 3 }).unwrap();
        assert!(terrain.start_state(Pos { y: 0, x: 0 }).is_none());
        assert!(terrain.start_state(Pos { y: 1, x: 1 }).is_none());
        assert!(terrain.start_state(Pos { y: 1, x: 2 }).is_some());
    }

    #[test]
    fn pushing_into_the_pocket_moves_the_block_slot() {
        let (grid, exit) = turn_pocket_fixture();
        let terrain = Terrain::from_grid(&grid, exit).unwrap();
        let state = terrain.start_state(Pos { y: 2, x: 4 }).unwrap();

        let transition = terrain.advance(&state, Direction::Right).unwrap();
        assert!(transition.pushed());
        assert_eq!(transition.moved, vec![0]);
        assert_eq!(terrain.pos_of(transition.next.player), Pos { y: 2, x: 5 });
        assert_eq!(terrain.pos_of(transition.next.blocks[0]), Pos { y: 2, x: 6 });

        assert!(terrain.advance(&transition.next, Direction::Right).is_none());
        assert!(terrain.advance(&state, Direction::Up).is_none());
    }

    #[test]
    fn blocks_never_land_on_features_or_the_exit() {
        let grid = grid_from_rows(&["########", "#.B$.BE#", "########"]);
        let terrain = Terrain::from_grid(&grid, Pos { y: 1, x: 6 }).unwrap();
        let onto_treasure = terrain.start_state(Pos { y: 1, x: 1 }).unwrap();
        assert!(terrain.advance(&onto_treasure, Direction::Right).is_none());
        let onto_exit = terrain.start_state(Pos { y: 1, x: 4 }).unwrap();
        assert!(terrain.advance(&onto_exit, Direction::Right).is_none());
    }
}
