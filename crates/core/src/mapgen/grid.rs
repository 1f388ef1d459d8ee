//! Flood fills and nearest-cell queries over a tile grid.

use std::collections::VecDeque;

use crate::state::Grid;
use crate::types::{Direction, Pos, Rect, Tile};

/// Cells reachable from `seeds` by stepping across tiles accepted by `passable`.
///
/// Returns a row-major mask. Seeds that fail `passable` do not spread.
pub(super) fn flood_fill<F>(grid: &Grid, seeds: impl IntoIterator<Item = Pos>, passable: F) -> Vec<bool>
where
    F: Fn(&Tile) -> bool,
{
    let mut reached = vec![false; grid.tiles().len()];
    let mut queue = VecDeque::new();
    for seed in seeds {
        if grid.in_bounds(seed) && passable(grid.tile_at(seed)) && !reached[grid.index(seed)] {
            reached[grid.index(seed)] = true;
            queue.push_back(seed);
        }
    }

    while let Some(current) = queue.pop_front() {
        for direction in Direction::ALL {
            let next = current.step(direction);
            if !grid.in_bounds(next) || reached[grid.index(next)] {
                continue;
            }
            if passable(grid.tile_at(next)) {
                reached[grid.index(next)] = true;
                queue.push_back(next);
            }
        }
    }
    reached
}

/// Open floor (empty or treasure) reachable from the start area without pushing anything.
pub fn reachable_from_start(grid: &Grid, start_area: Rect) -> Vec<bool> {
    flood_fill(grid, start_area.cells(), Tile::is_open_floor)
}

/// Number of open-floor cells a monster standing on `pos` can reach, its own cell included.
pub fn mobility_region_size(grid: &Grid, pos: Pos) -> usize {
    flood_fill(grid, [pos], Tile::is_open_floor).into_iter().filter(|&reached| reached).count()
}

/// Closest cell in `mask` to `desired`, ties broken by lowest `(y, x)`.
pub(super) fn nearest_marked_cell(grid: &Grid, mask: &[bool], desired: Pos) -> Option<Pos> {
    let mut best: Option<(u32, Pos)> = None;
    for pos in grid.positions() {
        if !mask[grid.index(pos)] {
            continue;
        }
        let distance = pos.manhattan(desired);
        let is_better = match best {
            None => true,
            Some((best_distance, best_pos)) => {
                distance < best_distance
                    || (distance == best_distance && (pos.y, pos.x) < (best_pos.y, best_pos.x))
            }
        };
        if is_better {
            best = Some((distance, pos));
        }
    }
    best.map(|(_, pos)| pos)
}
