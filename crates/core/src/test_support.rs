//! Shared grid fixtures for unit tests across the crate.

use crate::state::Grid;
use crate::types::{Direction, DirectionSet, Pos, Rect, Tile};

pub(crate) const START_AREA: Rect = Rect { x: 1, y: 1, width: 3, height: 3 };

/// Builds a grid from rows of glyphs.
///
/// `#` rock, `.` floor, `E` exit, `^` trap, `$` treasure worth 5, `*` magic item,
/// `B` block pushable every way, `U`/`D`/`L`/`R` single-direction blocks,
/// `H`/`V` horizontal or vertical axis blocks.
pub(crate) fn grid_from_rows(rows: &[&str]) -> Grid {
    let height = rows.len();
    let width = rows[0].len();
    let mut grid = Grid::filled(width, height, Tile::Rock);
    for (y, row) in rows.iter().enumerate() {
        assert_eq!(row.len(), width, "fixture rows must share one width");
        for (x, glyph) in row.chars().enumerate() {
            let pos = Pos { y: y as i32, x: x as i32 };
            grid.set_tile(pos, tile_for_glyph(glyph));
        }
    }
    grid
}

fn tile_for_glyph(glyph: char) -> Tile {
    let block = |directions| Tile::Block { directions, uncovered: false };
    match glyph {
        '#' => Tile::Rock,
        '.' => Tile::HIDDEN_FLOOR,
        'E' => Tile::Exit { uncovered: false },
        '^' => Tile::Trap { message: "A tripwire snaps.".to_string(), uncovered: false },
        '$' => Tile::Treasure { value: 5, uncovered: false },
        '*' => Tile::MagicItem { item_name: "Lantern".to_string(), uncovered: false },
        'B' => block(DirectionSet::ALL),
        'U' => block(DirectionSet::single(Direction::Up)),
        'D' => block(DirectionSet::single(Direction::Down)),
        'L' => block(DirectionSet::single(Direction::Left)),
        'R' => block(DirectionSet::single(Direction::Right)),
        'H' => block(DirectionSet::axis(Direction::Left)),
        'V' => block(DirectionSet::axis(Direction::Up)),
        other => panic!("unknown fixture glyph {other:?}"),
    }
}

/// A corridor that turns down right after a right-only block; one push clears it.
pub(crate) fn turn_pocket_fixture() -> (Grid, Pos) {
    let grid = grid_from_rows(&[
        "#########",
        "#...#####",
        "#....R.##",
        "#...#.###",
        "#####E###",
    ]);
    (grid, Pos { y: 4, x: 5 })
}

/// Two right-only blocks in a row that must be shoved twice as one chain.
pub(crate) fn chain_fixture() -> (Grid, Pos) {
    let grid = grid_from_rows(&[
        "##########",
        "#...######",
        "#...RR..##",
        "#...#.####",
        "#####E####",
    ]);
    (grid, Pos { y: 4, x: 5 })
}
