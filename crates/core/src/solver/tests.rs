use super::*;
use crate::test_support::{START_AREA, chain_fixture, grid_from_rows, turn_pocket_fixture};
use crate::types::Tile;

fn mv(dir: Direction, push: bool) -> SolutionMove {
    SolutionMove { dir, push }
}

#[test]
fn turn_pocket_needs_one_push_and_four_steps() {
    let (grid, exit) = turn_pocket_fixture();
    let solution = solve_block_puzzle(&SolveParams::new(&grid, START_AREA, exit))
        .expect("pocket fixture is solvable");

    assert_eq!(solution.start, Pos { y: 2, x: 3 });
    assert_eq!(
        solution.moves,
        vec![
            mv(Direction::Right, false),
            mv(Direction::Right, true),
            mv(Direction::Down, false),
            mv(Direction::Down, false),
        ]
    );
    assert_eq!(solution.pushes, 1);
    assert_eq!(solution.steps, 4);
    assert_eq!(solution.unintuitive_pushes, 1);
    assert_eq!(solution.distinct_blocks_pushed, 1);
    assert_eq!(solution.revisited_squares, 0);
    assert_eq!(solution.revisit_events, 0);
}

#[test]
fn chained_blocks_move_together() {
    let (grid, exit) = chain_fixture();
    let solution = solve_block_puzzle(&SolveParams::new(&grid, START_AREA, exit))
        .expect("chain fixture is solvable");

    assert_eq!(solution.pushes, 2);
    assert_eq!(solution.steps, 4);
    assert_eq!(solution.distinct_blocks_pushed, 2);
    assert_eq!(solution.unintuitive_pushes, 1);
}

#[test]
fn block_refusing_the_only_push_direction_makes_the_level_unsolvable() {
    let grid = grid_from_rows(&[
        "#########",
        "#...#####",
        "#....D.##",
        "#...#.###",
        "#####E###",
    ]);
    let params = SolveParams::new(&grid, START_AREA, Pos { y: 4, x: 5 });
    assert_eq!(solve_block_puzzle(&params), None);
    assert_eq!(estimate_min_pushes(&params), None);
}

#[test]
fn estimate_matches_the_full_search_on_fixtures() {
    for (grid, exit) in [turn_pocket_fixture(), chain_fixture()] {
        let params = SolveParams::new(&grid, START_AREA, exit);
        let solution = solve_block_puzzle(&params).unwrap();
        assert_eq!(estimate_min_pushes(&params), Some(solution.pushes));
    }
}

#[test]
fn exit_inside_the_start_area_needs_no_moves() {
    let grid = grid_from_rows(&["#####", "#...#", "#.E.#", "#...#", "#####"]);
    let solution =
        solve_block_puzzle(&SolveParams::new(&grid, START_AREA, Pos { y: 2, x: 2 })).unwrap();
    assert!(solution.moves.is_empty());
    assert_eq!(solution.start, Pos { y: 2, x: 2 });
    assert_eq!(solution.pushes, 0);
}

#[test]
fn limits_turn_a_solvable_level_into_no_result() {
    let (grid, exit) = turn_pocket_fixture();
    let params = SolveParams::new(&grid, START_AREA, exit);

    let no_pushes = SolveLimits { max_pushes: Some(0), ..SolveLimits::default() };
    assert_eq!(solve_block_puzzle(&params.with_limits(no_pushes)), None);
    assert_eq!(estimate_min_pushes(&params.with_limits(no_pushes)), None);

    let one_push = SolveLimits { max_pushes: Some(1), ..SolveLimits::default() };
    assert!(solve_block_puzzle(&params.with_limits(one_push)).is_some());

    let short = SolveLimits { max_steps: Some(3), ..SolveLimits::default() };
    assert_eq!(solve_block_puzzle(&params.with_limits(short)), None);

    let tiny = SolveLimits::with_max_states(3);
    assert_eq!(solve_block_puzzle(&params.with_limits(tiny)), None);
    assert_eq!(estimate_min_pushes(&params.with_limits(tiny)), None);
}

fn open_field(size: usize) -> (Grid, Pos) {
    let mut grid = Grid::filled(size, size, Tile::Rock);
    for pos in grid.positions().collect::<Vec<_>>() {
        if grid.is_interior(pos) {
            grid.set_tile(pos, Tile::HIDDEN_FLOOR);
        }
    }
    let exit = Pos { y: size as i32 - 2, x: size as i32 - 2 };
    grid.set_tile(exit, Tile::Exit { uncovered: false });
    (grid, exit)
}

#[test]
fn cancelled_token_stops_a_long_search() {
    let (grid, exit) = open_field(64);
    let params = SolveParams::new(&grid, START_AREA, exit);
    assert!(solve_block_puzzle(&params).is_some());

    let token = CancelToken::new();
    token.cancel();
    assert_eq!(solve_block_puzzle(&params.with_cancel(&token)), None);
}

#[test]
fn analysis_counts_revisits_from_the_start_cell() {
    let grid = grid_from_rows(&["#####", "#...#", "#..E#", "#####"]);
    let moves = [
        mv(Direction::Right, false),
        mv(Direction::Left, false),
        mv(Direction::Right, false),
    ];
    let stats = analyze_solution(&grid, Pos { y: 2, x: 3 }, Pos { y: 1, x: 1 }, &moves).unwrap();
    assert_eq!(stats.steps, 3);
    assert_eq!(stats.pushes, 0);
    assert_eq!(stats.revisited_squares, 2);
    assert_eq!(stats.revisit_events, 2);
}

#[test]
fn analysis_rejects_mislabelled_or_illegal_moves() {
    let (grid, exit) = turn_pocket_fixture();
    let start = Pos { y: 2, x: 3 };
    let wrong_flag = [mv(Direction::Right, true)];
    assert_eq!(analyze_solution(&grid, exit, start, &wrong_flag), None);

    let into_rock = [mv(Direction::Up, false), mv(Direction::Up, false)];
    assert_eq!(analyze_solution(&grid, exit, start, &into_rock), None);
}

#[test]
fn solution_json_uses_camel_case_fields() {
    let (grid, exit) = turn_pocket_fixture();
    let solution = solve_block_puzzle(&SolveParams::new(&grid, START_AREA, exit)).unwrap();
    let json = serde_json::to_value(&solution).unwrap();
    assert_eq!(json["unintuitivePushes"], 1);
    assert_eq!(json["moves"][1]["dir"], "right");
    assert_eq!(json["moves"][1]["push"], true);
    assert_eq!(json["start"]["x"], 3);
}
