//! Corridor walk and side-room carving for base level topology.

use crate::state::Grid;
use crate::types::{Direction, Pos, Rect, Tile};

use super::grid::nearest_marked_cell;
use super::progression;
use super::seed::LevelRng;

const TAKE_CLOSEST_PROBABILITY: f64 = 0.65;
const ROOM_PLACEMENT_TRIES: usize = 40;
const MIN_ROOM_SIDE: usize = 3;
const MAX_ROOM_SIDE: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct CarvedLayout {
    /// Loop-erased route from the walk start to the exit.
    pub(super) main_path: Vec<Pos>,
    /// Every cell carved by the walk and by room connectors.
    pub(super) corridor: Vec<bool>,
    pub(super) rooms: Vec<Rect>,
}

pub(super) struct CarveContext<'a> {
    pub(super) grid: &'a mut Grid,
    pub(super) rng: &'a mut LevelRng,
    pub(super) level: u32,
    pub(super) start_area: Rect,
    pub(super) walk_start: Pos,
    pub(super) exit: Pos,
}

pub(super) fn carve_layout(context: &mut CarveContext<'_>) -> CarvedLayout {
    for cell in context.start_area.cells() {
        context.grid.set_tile(cell, Tile::HIDDEN_FLOOR);
    }

    let main_path = walk_corridor(context.grid, context.rng, context.walk_start, context.exit)
        .unwrap_or_else(|| l_shaped_route(context.walk_start, context.exit));
    let mut corridor = vec![false; context.grid.tiles().len()];
    // Cells walked but erased from the route stay carved.
    for pos in context.grid.positions() {
        if context.grid.tile_at(pos).is_empty() && !context.start_area.contains(pos) {
            corridor[context.grid.index(pos)] = true;
        }
    }
    for &pos in &main_path {
        context.grid.set_tile(pos, Tile::HIDDEN_FLOOR);
        corridor[context.grid.index(pos)] = true;
    }

    let rooms = place_rooms(context);
    for room in &rooms {
        for cell in room.cells() {
            context.grid.set_tile(cell, Tile::HIDDEN_FLOOR);
        }
    }
    for room in &rooms {
        connect_room(context, *room, &mut corridor);
    }

    CarvedLayout { main_path, corridor, rooms }
}

/// Biased random walk from `start` to `exit`, carving as it goes.
///
/// Returns the loop-erased route, or `None` when the step budget runs out.
fn walk_corridor(grid: &mut Grid, rng: &mut LevelRng, start: Pos, exit: Pos) -> Option<Vec<Pos>> {
    let step_budget = 3 * grid.width() * grid.height();
    let mut visited = vec![false; grid.tiles().len()];
    let mut route = vec![start];
    let mut current = start;
    let mut previous: Option<Direction> = None;
    visited[grid.index(start)] = true;
    grid.set_tile(start, Tile::HIDDEN_FLOOR);

    for _ in 0..step_budget {
        if current == exit {
            return Some(route);
        }
        let mut candidates: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|&direction| grid.is_interior(current.step(direction)))
            .collect();
        if candidates.len() > 1
            && let Some(last) = previous
        {
            candidates.retain(|&direction| direction != last.reverse());
        }
        if candidates.is_empty() {
            return None;
        }
        candidates.sort_by_key(|&direction| current.step(direction).manhattan(exit));

        let mut chosen = if rng.chance(TAKE_CLOSEST_PROBABILITY) {
            candidates[0]
        } else {
            candidates[rng.range(0, candidates.len() - 1)]
        };
        if visited[grid.index(current.step(chosen))]
            && let Some(&fresh) =
                candidates.iter().find(|&&direction| !visited[grid.index(current.step(direction))])
        {
            chosen = fresh;
        }

        current = current.step(chosen);
        previous = Some(chosen);
        visited[grid.index(current)] = true;
        grid.set_tile(current, Tile::HIDDEN_FLOOR);
        if let Some(seen_at) = route.iter().position(|&pos| pos == current) {
            route.truncate(seen_at + 1);
        } else {
            route.push(current);
        }
    }
    (current == exit).then_some(route)
}

/// Horizontal run along the start row, then a vertical run down the exit column.
fn l_shaped_route(start: Pos, exit: Pos) -> Vec<Pos> {
    let mut route = Vec::new();
    let step_x = if exit.x >= start.x { 1 } else { -1 };
    let mut x = start.x;
    while x != exit.x {
        route.push(Pos { y: start.y, x });
        x += step_x;
    }
    let step_y = if exit.y >= start.y { 1 } else { -1 };
    let mut y = start.y;
    while y != exit.y {
        route.push(Pos { y, x: exit.x });
        y += step_y;
    }
    route.push(exit);
    route
}

fn place_rooms(context: &mut CarveContext<'_>) -> Vec<Rect> {
    let width = context.grid.width();
    let height = context.grid.height();
    let target = progression::room_count(context.level);
    let mut rooms: Vec<Rect> = Vec::with_capacity(target);
    let reserved = context.start_area.expanded(1);

    for _ in 0..target {
        for _ in 0..ROOM_PLACEMENT_TRIES {
            let room_width = context.rng.range(MIN_ROOM_SIDE, MAX_ROOM_SIDE);
            let room_height = context.rng.range(MIN_ROOM_SIDE, MAX_ROOM_SIDE);
            if room_width + 2 > width || room_height + 2 > height {
                continue;
            }
            let x = context.rng.range(1, width - 1 - room_width);
            let y = context.rng.range(1, height - 1 - room_height);
            let candidate = Rect { x, y, width: room_width, height: room_height };
            let with_margin = candidate.expanded(1);
            if with_margin.intersects(&reserved)
                || candidate.contains(context.exit)
                || rooms.iter().any(|room| room.expanded(1).intersects(&with_margin))
            {
                continue;
            }
            rooms.push(candidate);
            break;
        }
    }
    rooms
}

/// Joins `room` to the nearest corridor cell with an L-shaped run from a random room cell.
fn connect_room(context: &mut CarveContext<'_>, room: Rect, corridor: &mut [bool]) {
    let origin = Pos {
        y: context.rng.range(room.y, room.bottom()) as i32,
        x: context.rng.range(room.x, room.right()) as i32,
    };
    let horizontal_first = context.rng.chance(0.5);
    let Some(target) = nearest_marked_cell(context.grid, corridor, origin) else {
        return;
    };

    let bend = if horizontal_first {
        Pos { y: origin.y, x: target.x }
    } else {
        Pos { y: target.y, x: origin.x }
    };
    for pos in straight_run(origin, bend).chain(straight_run(bend, target)) {
        if room.contains(pos) || context.start_area.contains(pos) || pos == context.exit {
            continue;
        }
        context.grid.set_tile(pos, Tile::HIDDEN_FLOOR);
        corridor[context.grid.index(pos)] = true;
    }
}

fn straight_run(from: Pos, to: Pos) -> impl Iterator<Item = Pos> {
    let length = from.manhattan(to) as i32;
    let dy = (to.y - from.y).signum();
    let dx = (to.x - from.x).signum();
    (0..=length).map(move |offset| Pos { y: from.y + dy * offset, x: from.x + dx * offset })
}
