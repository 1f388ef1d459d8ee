//! Treasure and monster placement, including the bonus hoard for contested rooms.

use crate::state::Grid;
use crate::types::{Monster, MonsterKind, Pos, Rect, Tile};

use super::grid::reachable_from_start;
use super::progression;
use super::seed::LevelRng;

pub(super) struct SpawnContext<'a> {
    pub(super) grid: &'a mut Grid,
    pub(super) rng: &'a mut LevelRng,
    pub(super) level: u32,
    pub(super) rooms: &'a [Rect],
    pub(super) pockets: &'a [bool],
    pub(super) start_area: Rect,
    pub(super) exit: Pos,
}

impl SpawnContext<'_> {
    fn is_free_floor(&self, pos: Pos) -> bool {
        self.grid.tile_at(pos).is_empty()
            && !self.pockets[self.grid.index(pos)]
            && !self.start_area.contains(pos)
    }

    /// 1d10, 2d12 or 3d20 by which third of the start-to-exit distance `pos` falls in.
    fn roll_treasure(&mut self, pos: Pos) -> Tile {
        let start_center = self.start_area.center();
        let max_distance = start_center.manhattan(self.exit);
        let distance = pos.manhattan(start_center);
        let value = if distance * 3 <= max_distance {
            self.rng.roll_dice(1, 10)
        } else if distance * 3 <= max_distance * 2 {
            self.rng.roll_dice(2, 12)
        } else {
            self.rng.roll_dice(3, 20)
        };
        Tile::Treasure { value, uncovered: false }
    }
}

/// One treasure per room first, then scattered treasure up to the level cap.
pub(super) fn place_treasure(context: &mut SpawnContext<'_>) -> usize {
    let cap = progression::treasure_cap(context.level);
    let mut placed = 0;

    for room in context.rooms {
        if placed >= cap {
            break;
        }
        let cells: Vec<Pos> = room.cells().filter(|&pos| context.is_free_floor(pos)).collect();
        if let Some(&pos) = context.rng.pick(&cells) {
            let treasure = context.roll_treasure(pos);
            context.grid.set_tile(pos, treasure);
            placed += 1;
        }
    }

    let mut scattered: Vec<Pos> =
        context.grid.positions().filter(|&pos| context.is_free_floor(pos)).collect();
    context.rng.shuffle(&mut scattered);
    for pos in scattered {
        if placed >= cap {
            break;
        }
        let treasure = context.roll_treasure(pos);
        context.grid.set_tile(pos, treasure);
        placed += 1;
    }
    placed
}

/// Places each kind's quota on plain floor the start area cannot walk to.
///
/// Ids run from 1 in placement order. Stops early when candidates run out.
pub(super) fn place_monsters(context: &mut SpawnContext<'_>) -> Vec<Monster> {
    let reachable = reachable_from_start(context.grid, context.start_area);
    let mut candidates: Vec<Pos> = context
        .grid
        .positions()
        .filter(|&pos| !reachable[context.grid.index(pos)] && context.is_free_floor(pos))
        .collect();
    context.rng.shuffle(&mut candidates);

    let mut monsters = Vec::new();
    let mut available = candidates.into_iter();
    'kinds: for kind in MonsterKind::ALL {
        for _ in 0..progression::monster_quota(context.level, kind) {
            let Some(pos) = available.next() else {
                break 'kinds;
            };
            monsters.push(Monster { id: monsters.len() as u32 + 1, kind, pos });
        }
    }
    monsters
}

/// Rooms hosting a monster get extra treasure on their remaining free floor.
pub(super) fn place_contested_room_treasure(context: &mut SpawnContext<'_>, monsters: &[Monster]) -> usize {
    let bonus = progression::contested_room_bonus(context.level);
    let mut placed = 0;
    for room in context.rooms {
        if !monsters.iter().any(|monster| room.contains(monster.pos)) {
            continue;
        }
        let mut cells: Vec<Pos> = room
            .cells()
            .filter(|&pos| {
                context.is_free_floor(pos) && !monsters.iter().any(|monster| monster.pos == pos)
            })
            .collect();
        context.rng.shuffle(&mut cells);
        for &pos in cells.iter().take(bonus) {
            let treasure = context.roll_treasure(pos);
            context.grid.set_tile(pos, treasure);
            placed += 1;
        }
    }
    placed
}
