//! Push-block puzzle search over `(player cell, block layout)` states.
//!
//! Generation and the tools use it to prove a level solvable and to measure it.
//! Live gameplay lives in `game`; both sides share the chain rule in `push`.

mod analysis;
mod estimate;
mod limits;
mod search;
mod terrain;

use serde::{Deserialize, Serialize};

use crate::state::{Grid, LevelState};
use crate::types::{Direction, Pos, Rect};

pub use analysis::{SolutionStats, analyze_solution};
pub use estimate::estimate_min_pushes;
pub use limits::{CancelToken, DEFAULT_MAX_STATES, SolveLimits};
pub use search::solve_block_puzzle;

pub(crate) use limits::CANCEL_CHECK_INTERVAL;
#[cfg(test)]
pub(crate) use terrain::Terrain;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SolutionMove {
    pub dir: Direction,
    pub push: bool,
}

/// A minimum-push, then minimum-step, route from a start-area cell to the exit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub moves: Vec<SolutionMove>,
    pub start: Pos,
    pub pushes: u32,
    pub steps: u32,
    pub unintuitive_pushes: u32,
    pub distinct_blocks_pushed: u32,
    pub revisited_squares: u32,
    pub revisit_events: u32,
}

impl Solution {
    fn from_stats(moves: Vec<SolutionMove>, start: Pos, stats: SolutionStats) -> Self {
        Self {
            moves,
            start,
            pushes: stats.pushes,
            steps: stats.steps,
            unintuitive_pushes: stats.unintuitive_pushes,
            distinct_blocks_pushed: stats.distinct_blocks_pushed,
            revisited_squares: stats.revisited_squares,
            revisit_events: stats.revisit_events,
        }
    }
}

/// Inputs shared by [`solve_block_puzzle`] and [`estimate_min_pushes`].
#[derive(Clone, Copy, Debug)]
pub struct SolveParams<'a> {
    pub tiles: &'a Grid,
    pub start_area: Rect,
    pub exit: Pos,
    pub limits: SolveLimits,
    pub cancel: Option<&'a CancelToken>,
}

impl<'a> SolveParams<'a> {
    pub fn new(tiles: &'a Grid, start_area: Rect, exit: Pos) -> Self {
        Self { tiles, start_area, exit, limits: SolveLimits::default(), cancel: None }
    }

    pub fn for_level(level: &'a LevelState) -> Self {
        Self::new(&level.tiles, level.start_area, level.exit)
    }

    pub fn with_limits(mut self, limits: SolveLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_cancel(mut self, cancel: &'a CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancelToken::is_cancelled)
    }
}

#[cfg(test)]
mod tests;
