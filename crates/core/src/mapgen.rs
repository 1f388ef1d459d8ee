//! Procedural level generation split into carving, placement, and the attempt loop.

pub mod model;
pub mod progression;

mod attempts;
mod blocks;
mod generator;
mod grid;
mod layout;
mod seed;
mod spawns;

use crate::config::GameOptions;
use crate::solver::CancelToken;
use crate::state::LevelState;

pub use attempts::{AttemptProgress, GenerationPass};
pub use generator::LevelGenerator;
pub use grid::{mobility_region_size, reachable_from_start};
pub use model::LevelCandidate;
pub use seed::LevelRng;

/// Generates the level for `options`. Identical options give identical levels.
pub fn create_game(options: &GameOptions) -> LevelState {
    create_game_with_progress(options, |_| {})
}

pub fn create_game_with_progress<P>(options: &GameOptions, on_progress: P) -> LevelState
where
    P: FnMut(&AttemptProgress),
{
    attempts::generate_level(options, &CancelToken::new(), on_progress)
}

/// Like [`create_game_with_progress`], stopping early once `cancel` fires.
///
/// A cancelled run still returns a level: the best candidate seen so far, or an
/// unverified fallback.
pub fn create_game_cancellable<P>(options: &GameOptions, cancel: &CancelToken, on_progress: P) -> LevelState
where
    P: FnMut(&AttemptProgress),
{
    attempts::generate_level(options, cancel, on_progress)
}
