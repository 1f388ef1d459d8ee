//! Candidate-construction pipeline that composes the carving and placement stages.

use crate::state::Grid;
use crate::types::{Pos, Rect, Tile};

use super::super::blocks::{BlockContext, place_blocks};
use super::super::layout::{CarveContext, carve_layout};
use super::super::model::LevelCandidate;
use super::super::seed::LevelRng;
use super::super::spawns::{
    SpawnContext, place_contested_room_treasure, place_monsters, place_treasure,
};
use super::hazards::{FeatureContext, place_magic_items, place_traps};

pub(super) const START_AREA: Rect = Rect { x: 1, y: 1, width: 3, height: 3 };

pub(super) fn build_candidate(level: u32, width: usize, height: usize, attempt_seed: u64) -> LevelCandidate {
    let mut rng = LevelRng::new(attempt_seed);
    let mut grid = Grid::filled(width, height, Tile::Rock);
    let exit = Pos { y: height as i32 - 2, x: width as i32 - 2 };

    let layout = carve_layout(&mut CarveContext {
        grid: &mut grid,
        rng: &mut rng,
        level,
        start_area: START_AREA,
        walk_start: START_AREA.center(),
        exit,
    });
    grid.set_tile(exit, Tile::Exit { uncovered: false });

    let blocks = place_blocks(&mut BlockContext {
        grid: &mut grid,
        rng: &mut rng,
        layout: &layout,
        level,
        start_area: START_AREA,
        exit,
    });

    place_traps(&mut FeatureContext {
        grid: &mut grid,
        rng: &mut rng,
        level,
        corridor: &layout.corridor,
        pockets: &blocks.pockets,
        start_area: START_AREA,
    });

    let mut spawn_context = SpawnContext {
        grid: &mut grid,
        rng: &mut rng,
        level,
        rooms: &layout.rooms,
        pockets: &blocks.pockets,
        start_area: START_AREA,
        exit,
    };
    place_treasure(&mut spawn_context);

    place_magic_items(&mut FeatureContext {
        grid: &mut *spawn_context.grid,
        rng: &mut *spawn_context.rng,
        level,
        corridor: &layout.corridor,
        pockets: &blocks.pockets,
        start_area: START_AREA,
    });

    let monsters = place_monsters(&mut spawn_context);
    place_contested_room_treasure(&mut spawn_context, &monsters);

    for cell in START_AREA.cells() {
        grid.uncover(cell);
    }

    LevelCandidate {
        tiles: grid,
        start_area: START_AREA,
        exit,
        monsters,
        attempt_seed,
    }
}
