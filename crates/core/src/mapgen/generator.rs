//! Single-attempt level construction: carve, then place blocks, hazards, rewards, and monsters.

mod hazards;
mod pipeline;

use super::model::LevelCandidate;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelGenerator {
    level: u32,
    width: usize,
    height: usize,
}

impl LevelGenerator {
    pub fn new(level: u32, width: usize, height: usize) -> Self {
        Self { level, width, height }
    }

    /// Builds the candidate for one attempt seed. Same seed, same candidate.
    pub fn build(&self, attempt_seed: u64) -> LevelCandidate {
        pipeline::build_candidate(self.level, self.width, self.height, attempt_seed)
    }
}
