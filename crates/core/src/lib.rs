pub mod config;
pub mod game;
pub mod mapgen;
pub mod push;
pub mod replay;
pub mod snapshot;
pub mod solver;
pub mod state;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::{GameOptions, GenerationConfig};
pub use game::{GameEvent, LiveLevel, LiveMonster, MonsterKey, MoveError, MoveOutcome, Player, PlayerId};
pub use mapgen::{AttemptProgress, GenerationPass, create_game, create_game_cancellable, create_game_with_progress};
pub use push::{ChainBlocked, LandingBlocker};
pub use replay::{ReplayError, ReplayOutcome, replay_moves, replay_solution};
pub use snapshot::{LevelSnapshot, SnapshotError, load_snapshot, save_snapshot};
pub use solver::{
    CancelToken, Solution, SolutionMove, SolveLimits, SolveParams, estimate_min_pushes, solve_block_puzzle,
};
pub use state::{Grid, LevelState, Solvability};
pub use types::*;
