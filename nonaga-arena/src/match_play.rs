//! Match play - many seeded games between two weight sets
//!
//! Level 2 - Phase-level implementation

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ArenaConfig;
use crate::game_runner::{play_game, EndReason, GameOutcome};

/// Result of a match (multiple games)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MatchResult {
    pub red_wins: u32,
    pub blue_wins: u32,
    /// Games stopped because the side to move had no legal move
    pub stalls: u32,
    /// Games that hit the turn cap
    pub unfinished: u32,
    /// Average game length in full turns
    pub avg_turns: f32,
    pub games_played: u32,
    /// Individual game outcomes
    pub game_outcomes: Vec<GameOutcome>,
}

impl MatchResult {
    /// Create empty result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Combine two results
    pub fn combine(&self, other: &MatchResult) -> MatchResult {
        let total_games = self.games_played + other.games_played;
        let avg_turns = if total_games > 0 {
            (self.avg_turns * self.games_played as f32
                + other.avg_turns * other.games_played as f32)
                / total_games as f32
        } else {
            0.0
        };

        let mut game_outcomes = self.game_outcomes.clone();
        game_outcomes.extend(other.game_outcomes.iter().cloned());

        MatchResult {
            red_wins: self.red_wins + other.red_wins,
            blue_wins: self.blue_wins + other.blue_wins,
            stalls: self.stalls + other.stalls,
            unfinished: self.unfinished + other.unfinished,
            avg_turns,
            games_played: total_games,
            game_outcomes,
        }
    }

    fn rate(&self, count: u32) -> f32 {
        if self.games_played == 0 {
            0.0
        } else {
            count as f32 / self.games_played as f32
        }
    }

    pub fn red_win_rate(&self) -> f32 {
        self.rate(self.red_wins)
    }

    pub fn blue_win_rate(&self) -> f32 {
        self.rate(self.blue_wins)
    }

    /// Share of games that ended without a winner, for either reason
    pub fn undecided_rate(&self) -> f32 {
        self.rate(self.stalls + self.unfinished)
    }
}

/// Play `config.games` games one after another (Level 2 phase)
pub fn play_match(config: &ArenaConfig) -> MatchResult {
    let outcomes = game_seeds(config)
        .into_iter()
        .map(|seed| play_game(config, seed))
        .collect();
    aggregate_results(outcomes)
}

/// Play `config.games` games on the rayon pool (Level 2 phase).
/// Same seeds as [`play_match`], so both return the same outcomes.
pub fn play_match_parallel(config: &ArenaConfig) -> MatchResult {
    let outcomes = game_seeds(config)
        .into_par_iter()
        .map(|seed| play_game(config, seed))
        .collect();
    aggregate_results(outcomes)
}

/// Sequential or parallel, as configured
pub fn run_match(config: &ArenaConfig) -> MatchResult {
    if config.parallel {
        play_match_parallel(config)
    } else {
        play_match(config)
    }
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

fn game_seeds(config: &ArenaConfig) -> Vec<u64> {
    (0..config.games)
        .map(|i| config.seed.wrapping_add(i as u64))
        .collect()
}

/// Aggregate game outcomes into a match result
fn aggregate_results(outcomes: Vec<GameOutcome>) -> MatchResult {
    let mut result = MatchResult::empty();
    let mut total_turns = 0u64;

    for outcome in &outcomes {
        total_turns += outcome.turns as u64;
        match outcome.reason {
            EndReason::Victory if outcome.red_wins() => result.red_wins += 1,
            EndReason::Victory => result.blue_wins += 1,
            EndReason::TurnLimit => result.unfinished += 1,
            EndReason::NoLegalMove => result.stalls += 1,
        }
    }

    result.games_played = outcomes.len() as u32;
    if result.games_played > 0 {
        result.avg_turns = total_turns as f32 / result.games_played as f32;
    }
    result.game_outcomes = outcomes;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(red: u32, blue: u32, unfinished: u32, avg: f32) -> MatchResult {
        MatchResult {
            red_wins: red,
            blue_wins: blue,
            stalls: 0,
            unfinished,
            avg_turns: avg,
            games_played: red + blue + unfinished,
            game_outcomes: vec![],
        }
    }

    #[test]
    fn test_match_result_empty() {
        let result = MatchResult::empty();
        assert_eq!(result.games_played, 0);
        assert_eq!(result.red_win_rate(), 0.0);
    }

    #[test]
    fn test_match_result_combine() {
        let combined = counts(2, 1, 1, 20.0).combine(&counts(1, 2, 1, 30.0));
        assert_eq!(combined.red_wins, 3);
        assert_eq!(combined.blue_wins, 3);
        assert_eq!(combined.unfinished, 2);
        assert_eq!(combined.games_played, 8);
        assert!((combined.avg_turns - 25.0).abs() < 0.01);
    }

    #[test]
    fn test_match_result_rates() {
        let result = counts(6, 3, 1, 25.0);
        assert_eq!(result.red_win_rate(), 0.6);
        assert_eq!(result.blue_win_rate(), 0.3);
        assert_eq!(result.undecided_rate(), 0.1);
    }

    #[test]
    fn test_play_match_basic() {
        let config = ArenaConfig::new(2).with_max_turns(15).with_parallel(false);
        let result = play_match(&config);

        assert_eq!(result.games_played, 2);
        assert_eq!(
            result.red_wins + result.blue_wins + result.unfinished + result.stalls,
            2
        );
    }

    #[test]
    fn test_play_match_zero_games() {
        let result = play_match(&ArenaConfig::new(0));
        assert_eq!(result.games_played, 0);
        assert_eq!(result.avg_turns, 0.0);
    }

    #[test]
    fn test_seeds_follow_base() {
        let seeds = game_seeds(&ArenaConfig::new(3).with_seed(10));
        assert_eq!(seeds, vec![10, 11, 12]);
    }
}
