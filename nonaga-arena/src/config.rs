//! Configuration types for arena play
//!
//! Level 4 - Utilities and configuration

use nonaga_core::{Color, Heuristics};
use serde::{Deserialize, Serialize};

/// Settings for a batch of AI-vs-AI games
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Number of games in a match
    pub games: usize,
    /// Base seed; game `i` is played with `seed + i`
    pub seed: u64,
    /// Whether to run games in parallel
    pub parallel: bool,
    /// Full turns (slide plus relocation) before a game is called unfinished
    pub max_turns: u32,
    /// Weights for the red AI
    pub red: Heuristics,
    /// Weights for the blue AI
    pub blue: Heuristics,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            games: 100,
            seed: 42,
            parallel: true,
            max_turns: 200,
            red: Heuristics::default(),
            blue: Heuristics::default(),
        }
    }
}

impl ArenaConfig {
    /// Create config for `games` games with default settings
    pub fn new(games: usize) -> Self {
        Self {
            games,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Same weights for both sides
    pub fn with_heuristics(mut self, heuristics: Heuristics) -> Self {
        self.red = heuristics.clone();
        self.blue = heuristics;
        self
    }

    /// Weights for one side only
    pub fn with_side(mut self, color: Color, heuristics: Heuristics) -> Self {
        match color {
            Color::Red => self.red = heuristics,
            Color::Blue => self.blue = heuristics,
        }
        self
    }

    pub fn heuristics_for(&self, color: Color) -> &Heuristics {
        match color {
            Color::Red => &self.red,
            Color::Blue => &self.blue,
        }
    }
}
