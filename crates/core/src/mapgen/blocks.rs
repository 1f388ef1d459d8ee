//! Movable block placement along the main path, each with a carved pocket to be pushed into.

use crate::state::Grid;
use crate::types::{Direction, DirectionSet, Pos, Rect, Tile};

use super::layout::CarvedLayout;
use super::progression;
use super::seed::LevelRng;

const ALL_DIRECTIONS_CHANCE: f64 = 0.20;
const AXIS_CHANCE: f64 = 0.15;

pub(super) struct BlockContext<'a> {
    pub(super) grid: &'a mut Grid,
    pub(super) rng: &'a mut LevelRng,
    pub(super) layout: &'a CarvedLayout,
    pub(super) level: u32,
    pub(super) start_area: Rect,
    pub(super) exit: Pos,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct BlockPlacement {
    pub(super) blocks: Vec<Pos>,
    /// Row-major mask of carved pocket cells.
    pub(super) pockets: Vec<bool>,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    pos: Pos,
    /// Direction of travel into `pos` along the main path.
    flow: Direction,
    is_turn: bool,
}

pub(super) fn place_blocks(context: &mut BlockContext<'_>) -> BlockPlacement {
    let path = &context.layout.main_path;
    let mut turns = Vec::new();
    let mut straights = Vec::new();
    for index in 1..path.len().saturating_sub(1) {
        let pos = path[index];
        if context.start_area.contains(pos) || pos.manhattan(context.exit) <= 1 {
            continue;
        }
        let (Some(flow), Some(outgoing)) =
            (path[index - 1].direction_to(pos), pos.direction_to(path[index + 1]))
        else {
            continue;
        };
        let candidate = Candidate { pos, flow, is_turn: flow != outgoing };
        if candidate.is_turn {
            turns.push(candidate);
        } else {
            straights.push(candidate);
        }
    }
    context.rng.shuffle(&mut turns);
    context.rng.shuffle(&mut straights);

    let target = progression::block_count(context.level, path.len());
    let mut placement =
        BlockPlacement { blocks: Vec::with_capacity(target), pockets: vec![false; context.grid.tiles().len()] };

    for candidate in turns.into_iter().chain(straights) {
        if placement.blocks.len() >= target {
            break;
        }
        if context.grid.tile_at(candidate.pos).is_block() {
            continue;
        }
        let Some(pocket_direction) = choose_pocket(context, &placement, candidate) else {
            continue;
        };

        let mut directions = roll_directions(context.rng, pocket_direction);
        directions.insert(candidate.flow);

        let pocket = candidate.pos.step(pocket_direction);
        context.grid.set_tile(pocket, Tile::HIDDEN_FLOOR);
        placement.pockets[context.grid.index(pocket)] = true;
        context.grid.set_tile(candidate.pos, Tile::Block { directions, uncovered: false });
        placement.blocks.push(candidate.pos);
    }
    placement
}

fn choose_pocket(
    context: &mut BlockContext<'_>,
    placement: &BlockPlacement,
    candidate: Candidate,
) -> Option<Direction> {
    let open: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|&direction| is_pocket_cell(context, placement, candidate.pos.step(direction)))
        .collect();
    if candidate.is_turn && open.contains(&candidate.flow) {
        return Some(candidate.flow);
    }
    context.rng.pick(&open).copied()
}

fn is_pocket_cell(context: &BlockContext<'_>, placement: &BlockPlacement, pos: Pos) -> bool {
    let grid = &*context.grid;
    grid.is_interior(pos)
        && !context.layout.corridor[grid.index(pos)]
        && !placement.pockets[grid.index(pos)]
        && !context.start_area.contains(pos)
        && pos != context.exit
        && !grid.tile_at(pos).is_block()
}

fn roll_directions(rng: &mut LevelRng, pocket_direction: Direction) -> DirectionSet {
    let roll = rng.next_f64();
    if roll < ALL_DIRECTIONS_CHANCE {
        DirectionSet::ALL
    } else if roll < ALL_DIRECTIONS_CHANCE + AXIS_CHANCE {
        DirectionSet::axis(pocket_direction)
    } else {
        DirectionSet::single(pocket_direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::layout::{CarveContext, carve_layout};
    use crate::test_support::START_AREA;

    fn carve_and_place(seed: u64, level: u32) -> (Grid, CarvedLayout, BlockPlacement) {
        let mut grid = Grid::filled(18, 12, Tile::Rock);
        let mut rng = LevelRng::new(seed);
        let exit = Pos { y: 10, x: 16 };
        let layout = carve_layout(&mut CarveContext {
            grid: &mut grid,
            rng: &mut rng,
            level,
            start_area: START_AREA,
            walk_start: Pos { y: 2, x: 2 },
            exit,
        });
        let placement = place_blocks(&mut BlockContext {
            grid: &mut grid,
            rng: &mut rng,
            layout: &layout,
            level,
            start_area: START_AREA,
            exit,
        });
        (grid, layout, placement)
    }

    #[test]
    fn blocks_sit_on_the_main_path_clear_of_start_and_exit() {
        for seed in [5_u64, 42, 77, 2_024] {
            let (grid, layout, placement) = carve_and_place(seed, 2);
            assert!(!placement.blocks.is_empty(), "seed={seed} placed no blocks");
            assert!(placement.blocks.len() <= progression::block_count(2, layout.main_path.len()));
            for &block in &placement.blocks {
                assert!(layout.main_path.contains(&block));
                assert!(!START_AREA.contains(block));
                assert!(block.manhattan(Pos { y: 10, x: 16 }) > 1);
                assert!(grid.tile_at(block).is_block());
            }
        }
    }

    #[test]
    fn every_block_can_move_into_its_pocket_or_along_the_path() {
        for seed in [5_u64, 42, 77, 2_024] {
            let (grid, layout, placement) = carve_and_place(seed, 3);
            for &block in &placement.blocks {
                let directions = grid.tile_at(block).block_directions().unwrap();
                assert!(!directions.is_empty());
                let index = layout.main_path.iter().position(|&pos| pos == block).unwrap();
                let flow = layout.main_path[index - 1].direction_to(block).unwrap();
                assert!(directions.contains(flow), "seed={seed} block at {block:?} blocks its own flow");
                let has_pocket = Direction::ALL.into_iter().any(|direction| {
                    let pocket = block.step(direction);
                    directions.contains(direction) && placement.pockets[grid.index(pocket)]
                });
                assert!(has_pocket, "seed={seed} block at {block:?} has no pocket");
            }
        }
    }

    #[test]
    fn pockets_are_carved_off_corridor_floor() {
        let (grid, layout, placement) = carve_and_place(42, 4);
        for pos in grid.positions() {
            if placement.pockets[grid.index(pos)] {
                assert!(grid.tile_at(pos).is_empty());
                assert!(!layout.corridor[grid.index(pos)]);
                assert!(!START_AREA.contains(pos));
            }
        }
    }
}
