//! Replays solver output against the live push rules.

use log::debug;
use thiserror::Error;

use crate::game::{LiveLevel, MoveError};
use crate::solver::{Solution, SolutionMove};
use crate::state::LevelState;
use crate::types::Pos;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("cannot place the player at ({}, {}): {source}", .at.x, .at.y)]
    BadStart { at: Pos, source: MoveError },
    #[error("move {step} was rejected: {source}")]
    MoveRejected { step: usize, source: MoveError },
    #[error("move {step} disagrees with the recorded push flag")]
    PushMismatch { step: usize },
    #[error("replay ended at ({}, {}) instead of the exit", .at.x, .at.y)]
    EndedOffExit { at: Pos },
}

#[derive(Clone, Debug)]
pub struct ReplayOutcome {
    pub final_pos: Pos,
    pub reached_exit: bool,
    pub pushes: u32,
    /// The level as it stands after the last move.
    pub live: LiveLevel,
}

/// Plays `moves` from `start` on a fresh copy of `level` with a single player.
pub fn replay_moves(level: &LevelState, start: Pos, moves: &[SolutionMove]) -> Result<ReplayOutcome, ReplayError> {
    let mut live = LiveLevel::from_level(level);
    let player = live.add_player(start).map_err(|source| ReplayError::BadStart { at: start, source })?;

    let mut pushes = 0;
    let mut final_pos = start;
    for (step, recorded) in moves.iter().enumerate() {
        let outcome = live
            .move_player(player, recorded.dir)
            .map_err(|source| ReplayError::MoveRejected { step, source })?;
        if outcome.pushed() != recorded.push {
            return Err(ReplayError::PushMismatch { step });
        }
        pushes += u32::from(outcome.pushed());
        final_pos = outcome.to;
    }

    let reached_exit = live.reached_exit(player);
    debug!("replayed {} moves ({pushes} pushes), reached exit: {reached_exit}", moves.len());
    Ok(ReplayOutcome { final_pos, reached_exit, pushes, live })
}

/// Replays a solver route and requires it to finish on the exit.
pub fn replay_solution(level: &LevelState, solution: &Solution) -> Result<ReplayOutcome, ReplayError> {
    let outcome = replay_moves(level, solution.start, &solution.moves)?;
    if !outcome.reached_exit {
        return Err(ReplayError::EndedOffExit { at: outcome.final_pos });
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{SolveParams, solve_block_puzzle};
    use crate::state::{Grid, Solvability};
    use crate::test_support::{START_AREA, turn_pocket_fixture};
    use crate::types::Direction;

    fn level_from(tiles: Grid, exit: Pos) -> LevelState {
        LevelState {
            width: tiles.width(),
            height: tiles.height(),
            tiles,
            start_area: START_AREA,
            exit,
            monsters: Vec::new(),
            level: 1,
            seed: 0,
            attempt_seed: 0,
            solvability: Solvability::Unverified,
            min_pushes: None,
            solution: None,
        }
    }

    fn step(dir: Direction, push: bool) -> SolutionMove {
        SolutionMove { dir, push }
    }

    #[test]
    fn solver_route_replays_onto_the_exit() {
        let (grid, exit) = turn_pocket_fixture();
        let level = level_from(grid, exit);
        let solution = solve_block_puzzle(&SolveParams::for_level(&level)).unwrap();

        let outcome = replay_solution(&level, &solution).unwrap();
        assert_eq!(outcome.final_pos, exit);
        assert_eq!(outcome.pushes, solution.pushes);
        assert!(outcome.reached_exit);
    }

    #[test]
    fn wrong_push_flag_is_reported_with_its_step() {
        let (grid, exit) = turn_pocket_fixture();
        let level = level_from(grid, exit);
        let moves = [step(Direction::Right, false), step(Direction::Right, false)];
        assert_eq!(
            replay_moves(&level, Pos { y: 2, x: 3 }, &moves).unwrap_err(),
            ReplayError::PushMismatch { step: 1 }
        );
    }

    #[test]
    fn rejected_move_and_early_stop_are_errors() {
        let (grid, exit) = turn_pocket_fixture();
        let level = level_from(grid, exit);

        let into_rock = [step(Direction::Up, false), step(Direction::Up, false)];
        assert!(matches!(
            replay_moves(&level, Pos { y: 2, x: 3 }, &into_rock),
            Err(ReplayError::MoveRejected { step: 1, source: MoveError::Rock { .. } })
        ));

        let solution = Solution {
            moves: vec![step(Direction::Left, false)],
            start: Pos { y: 2, x: 3 },
            pushes: 0,
            steps: 1,
            unintuitive_pushes: 0,
            distinct_blocks_pushed: 0,
            revisited_squares: 0,
            revisit_events: 0,
        };
        assert_eq!(
            replay_solution(&level, &solution).unwrap_err(),
            ReplayError::EndedOffExit { at: Pos { y: 2, x: 2 } }
        );
    }

    #[test]
    fn start_on_rock_is_rejected() {
        let (grid, exit) = turn_pocket_fixture();
        let level = level_from(grid, exit);
        assert!(matches!(
            replay_moves(&level, Pos { y: 0, x: 0 }, &[]),
            Err(ReplayError::BadStart { .. })
        ));
    }
}
