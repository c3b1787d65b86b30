//! Stalemate probe - random playouts looking for stuck positions
//!
//! The rules never declare a draw. This probe plays uniformly random legal
//! moves and records every position where the side to move has nothing
//! legal in the current phase, plus any position that breaks a board or
//! piece invariant.

use nonaga_core::{
    legal_relocations, legal_slides, Color, GameState, InvariantViolation, MoveRequest, Phase,
    Status,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game_runner::{GUEST, HOST};

/// A position where the side to move was stuck
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stalemate {
    pub seed: u64,
    pub half_move: u32,
    pub color: Color,
    pub phase: Phase,
    pub state: GameState,
}

/// A position that should be unreachable
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Violation {
    pub seed: u64,
    pub half_move: u32,
    pub reason: String,
    pub state: GameState,
}

/// Totals over all probe games
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProbeReport {
    pub games: u32,
    pub half_moves: u64,
    pub wins: u32,
    pub capped: u32,
    pub stalemates: Vec<Stalemate>,
    pub violations: Vec<Violation>,
}

impl ProbeReport {
    pub fn is_clean(&self) -> bool {
        self.stalemates.is_empty() && self.violations.is_empty()
    }
}

enum Ending {
    Won,
    Capped,
    Stuck(Stalemate),
    Broken(Violation),
}

struct Playout {
    half_moves: u32,
    ending: Ending,
}

/// Run `games` random playouts of at most `max_turns` full turns each,
/// seeded `seed`, `seed + 1`, ...
pub fn probe_stalemates(games: usize, seed: u64, max_turns: u32) -> ProbeReport {
    let playouts: Vec<Playout> = (0..games)
        .into_par_iter()
        .map(|i| random_playout(seed.wrapping_add(i as u64), max_turns))
        .collect();

    let mut report = ProbeReport {
        games: games as u32,
        ..ProbeReport::default()
    };
    for playout in playouts {
        report.half_moves += playout.half_moves as u64;
        match playout.ending {
            Ending::Won => report.wins += 1,
            Ending::Capped => report.capped += 1,
            Ending::Stuck(stalemate) => report.stalemates.push(stalemate),
            Ending::Broken(violation) => report.violations.push(violation),
        }
    }

    if !report.violations.is_empty() {
        tracing::error!(count = report.violations.len(), "probe reached invalid positions");
    }
    if !report.stalemates.is_empty() {
        tracing::warn!(count = report.stalemates.len(), "probe found stuck positions");
    }
    report
}

fn random_playout(seed: u64, max_turns: u32) -> Playout {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let waiting = GameState::start(HOST, &mut rng);
    let mut state = match waiting.join(GUEST) {
        Ok(state) => state,
        Err(err) => return broken(seed, 0, err.to_string(), waiting),
    };
    let max_half_moves = max_turns.saturating_mul(2);
    let mut half_move = 0u32;

    while state.status() == Status::Playing {
        if half_move >= max_half_moves {
            return Playout {
                half_moves: half_move,
                ending: Ending::Capped,
            };
        }

        let Some(request) = random_request(&state, &mut rng) else {
            return Playout {
                half_moves: half_move,
                ending: Ending::Stuck(Stalemate {
                    seed,
                    half_move,
                    color: state.turn(),
                    phase: state.phase(),
                    state,
                }),
            };
        };

        state = match state.apply(&request) {
            Ok(applied) => applied.state,
            Err(err) => return broken(seed, half_move, err.to_string(), state),
        };
        half_move += 1;

        if let Err(violation) = state.check_invariants() {
            return broken(seed, half_move, describe(&violation), state);
        }
    }

    Playout {
        half_moves: half_move,
        ending: Ending::Won,
    }
}

/// Uniformly random legal half-move for the side to move
fn random_request(state: &GameState, rng: &mut ChaCha8Rng) -> Option<MoveRequest> {
    let color = state.turn();
    let actor = state.player_for(color)?.to_string();
    match state.phase() {
        Phase::SlidePiece => {
            let mv = *legal_slides(state.board(), state.pieces(), color).choose(rng)?;
            let piece_id = state.pieces()[mv.piece].id.clone();
            Some(MoveRequest::piece(actor, piece_id, mv.to))
        }
        Phase::RelocateTile => {
            let mv = *legal_relocations(state.board(), state.pieces()).choose(rng)?;
            Some(MoveRequest::tile(actor, mv.tile, mv.to))
        }
        Phase::AwaitingOpponent | Phase::Ended => None,
    }
}

fn broken(seed: u64, half_move: u32, reason: String, state: GameState) -> Playout {
    Playout {
        half_moves: half_move,
        ending: Ending::Broken(Violation {
            seed,
            half_move,
            reason,
            state,
        }),
    }
}

fn describe(violation: &InvariantViolation) -> String {
    format!("invariant broken: {violation}")
}
