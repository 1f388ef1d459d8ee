//! Trap and magic-item placement on off-corridor floor.

use crate::state::Grid;
use crate::types::{Pos, Rect, Tile};

use super::super::progression;
use super::super::seed::LevelRng;

pub(super) const TRAP_MESSAGES: [&str; 6] = [
    "A pressure plate clicks underfoot. The party freezes.",
    "A tripwire snaps and loose stones rain from the ceiling.",
    "Gas hisses from a crack in the wall.",
    "The floor gives way a few inches, then holds.",
    "A rusted bell clangs somewhere in the dark.",
    "Darts whistle out of the wall and clatter harmlessly.",
];

pub(super) const MAGIC_ITEM_NAMES: [&str; 6] = [
    "Lantern of Echoes",
    "Miner's Charm",
    "Glowstone",
    "Whispering Pick",
    "Cracked Compass",
    "Amber Vial",
];

const TRAP_MIN_START_DISTANCE: u32 = 2;

pub(super) struct FeatureContext<'a> {
    pub(super) grid: &'a mut Grid,
    pub(super) rng: &'a mut LevelRng,
    pub(super) level: u32,
    pub(super) corridor: &'a [bool],
    pub(super) pockets: &'a [bool],
    pub(super) start_area: Rect,
}

impl FeatureContext<'_> {
    /// Plain floor off the corridor, away from pockets and the start area.
    fn open_side_cells(&self) -> Vec<Pos> {
        self.grid
            .positions()
            .filter(|&pos| {
                let index = self.grid.index(pos);
                self.grid.tile_at(pos).is_empty()
                    && !self.corridor[index]
                    && !self.pockets[index]
                    && !self.start_area.contains(pos)
            })
            .collect()
    }
}

pub(super) fn place_traps(context: &mut FeatureContext<'_>) -> usize {
    let start_center = context.start_area.center();
    let mut candidates: Vec<Pos> = context
        .open_side_cells()
        .into_iter()
        .filter(|pos| pos.manhattan(start_center) > TRAP_MIN_START_DISTANCE)
        .collect();
    context.rng.shuffle(&mut candidates);

    let count = candidates.len().min(progression::trap_count(context.level));
    for &pos in &candidates[..count] {
        let message = context.rng.pick(&TRAP_MESSAGES).copied().unwrap_or(TRAP_MESSAGES[0]);
        context.grid.set_tile(pos, Tile::Trap { message: message.to_string(), uncovered: false });
    }
    count
}

pub(super) fn place_magic_items(context: &mut FeatureContext<'_>) -> usize {
    let mut candidates = context.open_side_cells();
    context.rng.shuffle(&mut candidates);

    let count = candidates.len().min(progression::magic_item_count(context.level));
    for &pos in &candidates[..count] {
        let name = context.rng.pick(&MAGIC_ITEM_NAMES).copied().unwrap_or(MAGIC_ITEM_NAMES[0]);
        context.grid.set_tile(pos, Tile::MagicItem { item_name: name.to_string(), uncovered: false });
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::START_AREA;

    fn open_room_grid() -> Grid {
        let mut grid = Grid::filled(14, 10, Tile::Rock);
        for pos in grid.positions().collect::<Vec<_>>() {
            if grid.is_interior(pos) {
                grid.set_tile(pos, Tile::HIDDEN_FLOOR);
            }
        }
        grid
    }

    #[test]
    fn traps_keep_clear_of_the_start_and_corridor() {
        let mut grid = open_room_grid();
        let mut corridor = vec![false; grid.tiles().len()];
        for x in 1..13 {
            corridor[grid.index(Pos { y: 5, x })] = true;
        }
        let pockets = vec![false; grid.tiles().len()];
        let mut rng = LevelRng::new(17);

        let placed = place_traps(&mut FeatureContext {
            grid: &mut grid,
            rng: &mut rng,
            level: 2,
            corridor: &corridor,
            pockets: &pockets,
            start_area: START_AREA,
        });
        assert_eq!(placed, 10);

        let traps: Vec<Pos> =
            grid.positions().filter(|&pos| matches!(grid.tile_at(pos), Tile::Trap { .. })).collect();
        assert_eq!(traps.len(), placed);
        for trap in traps {
            assert!(trap.manhattan(START_AREA.center()) > 2);
            assert!(!corridor[grid.index(trap)]);
            let Tile::Trap { message, .. } = grid.tile_at(trap) else { unreachable!() };
            assert!(TRAP_MESSAGES.contains(&message.as_str()));
        }
    }

    #[test]
    fn trap_count_is_limited_by_candidates() {
        let mut grid = Grid::filled(8, 7, Tile::Rock);
        grid.set_tile(Pos { y: 5, x: 6 }, Tile::HIDDEN_FLOOR);
        let mask = vec![false; grid.tiles().len()];
        let placed = place_traps(&mut FeatureContext {
            grid: &mut grid,
            rng: &mut LevelRng::new(1),
            level: 9,
            corridor: &mask,
            pockets: &mask,
            start_area: START_AREA,
        });
        assert_eq!(placed, 1);
    }

    #[test]
    fn magic_items_are_capped_at_three() {
        let mut grid = open_room_grid();
        let mask = vec![false; grid.tiles().len()];
        let placed = place_magic_items(&mut FeatureContext {
            grid: &mut grid,
            rng: &mut LevelRng::new(5),
            level: 12,
            corridor: &mask,
            pockets: &mask,
            start_area: START_AREA,
        });
        assert_eq!(placed, 3);
        let names: Vec<&str> = grid
            .tiles()
            .iter()
            .filter_map(|tile| match tile {
                Tile::MagicItem { item_name, .. } => Some(item_name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.iter().all(|name| MAGIC_ITEM_NAMES.contains(name)));
    }
}
