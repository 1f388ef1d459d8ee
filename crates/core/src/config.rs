//! Tunable knobs for the generate-and-test loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::solver::{CancelToken, DEFAULT_MAX_STATES, SolveLimits};

pub const DEFAULT_WIDTH: usize = 18;
pub const DEFAULT_HEIGHT: usize = 12;
pub const MIN_WIDTH: usize = 8;
pub const MIN_HEIGHT: usize = 7;

/// Generation settings. Every field has a default, so a config file may set any subset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Attempts per pass; the relaxed pass gets the same number again.
    pub max_attempts: u32,
    pub seed_stride: u64,
    pub max_states: usize,
    /// Open-floor cells every monster must be able to reach, its own included.
    pub mobility_floor: usize,
    pub target_pushes_per_level: u32,
    /// 1 evaluates attempts on the calling thread.
    pub workers: usize,
    pub deadline_ms: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 120,
            seed_stride: 173,
            max_states: DEFAULT_MAX_STATES,
            mobility_floor: 5,
            target_pushes_per_level: 2,
            workers: 1,
            deadline_ms: None,
        }
    }
}

impl GenerationConfig {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn solve_limits(&self) -> SolveLimits {
        SolveLimits::with_max_states(self.max_states)
    }

    /// `cancel` narrowed by this config's deadline, if one is set.
    pub fn bounded_token(&self, cancel: &CancelToken) -> CancelToken {
        match self.deadline_ms {
            Some(budget) => cancel.with_budget(Duration::from_millis(budget)),
            None => cancel.clone(),
        }
    }
}

/// Inputs to [`crate::create_game`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOptions {
    pub level: u32,
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub config: GenerationConfig,
}

impl GameOptions {
    pub fn new(level: u32, seed: u64) -> Self {
        Self {
            level,
            seed,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            config: GenerationConfig::default(),
        }
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Requested size raised to the smallest grid the carver supports.
    pub fn effective_size(&self) -> (usize, usize) {
        (self.width.max(MIN_WIDTH), self.height.max(MIN_HEIGHT))
    }
}
