//! Raw output of one generation attempt, before the loop scores it.

use crate::solver::Solution;
use crate::state::{Grid, LevelState, Solvability};
use crate::types::{Monster, Pos, Rect};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelCandidate {
    pub tiles: Grid,
    pub start_area: Rect,
    pub exit: Pos,
    pub monsters: Vec<Monster>,
    pub attempt_seed: u64,
}

/// What the generator loop learned about the candidate it accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Verdict {
    pub(super) solvability: Solvability,
    pub(super) min_pushes: Option<u32>,
    pub(super) solution: Option<Solution>,
}

impl LevelCandidate {
    pub(super) fn into_level_state(self, level: u32, seed: u64, verdict: Verdict) -> LevelState {
        LevelState {
            width: self.tiles.width(),
            height: self.tiles.height(),
            tiles: self.tiles,
            start_area: self.start_area,
            exit: self.exit,
            monsters: self.monsters,
            level,
            seed,
            attempt_seed: self.attempt_seed,
            solvability: verdict.solvability,
            min_pushes: verdict.min_pushes,
            solution: verdict.solution,
        }
    }
}
