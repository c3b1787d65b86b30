//! Game runner - executes single games
//!
//! Level 3 - Step-level implementation

use nonaga_core::{Color, GameState, HeuristicAI, MoveRequest, Phase, Status};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::ArenaConfig;

/// Seat names used for AI games
pub const HOST: &str = "ai-host";
pub const GUEST: &str = "ai-guest";

/// Why a game stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    /// Someone connected their three pieces
    Victory,
    /// The turn cap ran out first
    TurnLimit,
    /// The side to move had nothing the engine would accept. The board
    /// invariants should make this impossible.
    NoLegalMove,
}

/// Outcome of a single game
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameOutcome {
    /// Seed the game was played with
    pub seed: u64,
    pub winner: Option<Color>,
    pub reason: EndReason,
    /// Completed full turns
    pub turns: u32,
    /// Every accepted half-move, in order
    pub moves: Vec<MoveRequest>,
    /// Position when the game stopped
    pub final_state: GameState,
}

impl GameOutcome {
    pub fn red_wins(&self) -> bool {
        self.winner == Some(Color::Red)
    }

    pub fn blue_wins(&self) -> bool {
        self.winner == Some(Color::Blue)
    }

    pub fn is_unfinished(&self) -> bool {
        self.reason == EndReason::TurnLimit
    }

    pub fn is_stalled(&self) -> bool {
        self.reason == EndReason::NoLegalMove
    }
}

/// Play one AI-vs-AI game through the state machine.
///
/// `seed` drives color assignment and both AIs' jitter, so the same seed
/// always replays the same game.
pub fn play_game(config: &ArenaConfig, seed: u64) -> GameOutcome {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let waiting = GameState::start(HOST, &mut rng);
    match waiting.join(GUEST) {
        Ok(state) => play_from(config, seed, state),
        Err(err) => {
            tracing::error!(%err, "could not seat AI players");
            finish(seed, waiting, EndReason::NoLegalMove, 0, Vec::new())
        }
    }
}

/// Continue a game already in progress with both seats filled, the AIs
/// seeded from `seed` as in [`play_game`]
pub fn play_from(config: &ArenaConfig, seed: u64, mut state: GameState) -> GameOutcome {
    let mut red_ai = HeuristicAI::with_seed(config.red.clone(), seed);
    let mut blue_ai = HeuristicAI::with_seed(config.blue.clone(), seed.wrapping_add(1));
    let mut moves = Vec::new();
    let mut turns = 0u32;

    while state.status() == Status::Playing {
        if turns >= config.max_turns {
            return finish(seed, state, EndReason::TurnLimit, turns, moves);
        }
        if !state.has_legal_move() {
            tracing::error!(seed, color = %state.turn(), phase = ?state.phase(), "side to move is stuck");
            return finish(seed, state, EndReason::NoLegalMove, turns, moves);
        }

        let color = state.turn();
        let ai = match color {
            Color::Red => &mut red_ai,
            Color::Blue => &mut blue_ai,
        };
        let next = ai.next_move(&state);
        let actor = state.player_for(color).map(str::to_string);
        let (Some(mv), Some(actor)) = (next, actor) else {
            return finish(seed, state, EndReason::NoLegalMove, turns, moves);
        };

        let request = mv.into_request(actor);
        let ends_turn = state.phase() == Phase::RelocateTile;
        match state.apply(&request) {
            Ok(applied) => {
                state = applied.state;
                moves.push(request);
                if ends_turn {
                    turns += 1;
                }
            }
            Err(err) => {
                tracing::error!(%err, seed, "engine rejected an AI move");
                return finish(seed, state, EndReason::NoLegalMove, turns, moves);
            }
        }
    }

    finish(seed, state, EndReason::Victory, turns, moves)
}

fn finish(
    seed: u64,
    final_state: GameState,
    reason: EndReason,
    turns: u32,
    moves: Vec<MoveRequest>,
) -> GameOutcome {
    tracing::debug!(seed, ?reason, turns, winner = ?final_state.winner(), "game over");
    GameOutcome {
        seed,
        winner: final_state.winner(),
        reason,
        turns,
        moves,
        final_state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nonaga_core::{Board, Hex, Piece};

    #[test]
    fn test_play_game_terminates() {
        let config = ArenaConfig::new(1).with_max_turns(40);
        let outcome = play_game(&config, 7);

        assert!(outcome.turns <= 40);
        assert!(!outcome.moves.is_empty());
        match outcome.reason {
            EndReason::Victory => {
                assert!(outcome.winner.is_some());
                assert_eq!(outcome.final_state.status(), Status::Finished);
            }
            EndReason::TurnLimit | EndReason::NoLegalMove => assert!(outcome.winner.is_none()),
        }
    }

    #[test]
    fn test_same_seed_same_game() {
        let config = ArenaConfig::new(1).with_max_turns(25);
        let a = play_game(&config, 3);
        let b = play_game(&config, 3);
        assert_eq!(a.moves, b.moves);
        assert_eq!(a.winner, b.winner);
    }

    #[test]
    fn test_stuck_position_stops_game() {
        // r b r b r b in one row: no slide, and every tile carries a piece
        let tiles = Board::new((0..6).map(|q| Hex::new(q, 0)).collect());
        let pieces = (0..6)
            .map(|q| {
                let (color, id) = if q % 2 == 0 {
                    (Color::Red, format!("r{}", q / 2 + 1))
                } else {
                    (Color::Blue, format!("b{}", q / 2 + 1))
                };
                Piece::new(id, color, Hex::new(q, 0))
            })
            .collect();
        let state = GameState::setup(HOST, GUEST, Color::Red, tiles, pieces, Color::Red).unwrap();

        let outcome = play_from(&ArenaConfig::new(1), 4, state.clone());
        assert_eq!(outcome.reason, EndReason::NoLegalMove);
        assert!(outcome.is_stalled());
        assert!(outcome.winner.is_none());
        assert!(outcome.moves.is_empty());
        assert_eq!(outcome.final_state, state);
    }

    #[test]
    fn test_zero_turn_cap() {
        let config = ArenaConfig::new(1).with_max_turns(0);
        let outcome = play_game(&config, 1);
        assert_eq!(outcome.reason, EndReason::TurnLimit);
        assert!(outcome.moves.is_empty());
        assert!(outcome.is_unfinished());
    }
}
