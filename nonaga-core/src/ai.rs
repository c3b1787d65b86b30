//! Greedy one-ply heuristic AI

use crate::board::{Board, Hex, TileId};
use crate::eval::{score_relocation, score_slide, Heuristics};
use crate::game::{GameState, Phase, Status};
use crate::pieces::{Color, Piece};
use crate::request::MoveRequest;
use crate::rules::{legal_relocations, legal_slides, SlideMove, TileMove};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;

// ============================================================================
// MOVE SELECTION
// ============================================================================

/// Highest-scoring slide for `color`. Ties keep the first in enumeration
/// order (pieces, then directions).
pub fn best_slide(
    board: &Board,
    pieces: &[Piece],
    color: Color,
    heuristics: &Heuristics,
) -> Option<SlideMove> {
    let mut best: Option<(SlideMove, f64)> = None;

    for mv in legal_slides(board, pieces, color) {
        let mut after = pieces.to_vec();
        after[mv.piece].position = mv.to;
        let score = score_slide(&after, color, mv.to, heuristics);

        if best.as_ref().map_or(true, |&(_, top)| score > top) {
            best = Some((mv, score));
        }
    }

    best.map(|(mv, _)| mv)
}

/// Highest-scoring legal relocation for `color`, with uniform jitter in
/// `[0, heuristics.jitter)` added to every candidate
pub fn best_relocation<R: Rng + ?Sized>(
    board: &Board,
    pieces: &[Piece],
    color: Color,
    heuristics: &Heuristics,
    rng: &mut R,
) -> Option<TileMove> {
    let mut best: Option<(TileMove, f64)> = None;

    for mv in legal_relocations(board, pieces) {
        let tiles_after: FxHashSet<Hex> = board
            .iter()
            .map(|(id, hex)| if id == mv.tile { mv.to } else { hex })
            .collect();
        let mut score = score_relocation(mv.from, mv.to, &tiles_after, pieces, color, heuristics);
        if heuristics.jitter > 0.0 {
            score += rng.gen_range(0.0..heuristics.jitter);
        }

        if best.as_ref().map_or(true, |&(_, top)| score > top) {
            best = Some((mv, score));
        }
    }

    best.map(|(mv, _)| mv)
}

// ============================================================================
// AI PLAYER
// ============================================================================

/// Move chosen by the AI for the current half-move
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AiMove {
    Slide { piece_id: String, from: Hex, to: Hex },
    Relocate { tile: TileId, from: Hex, to: Hex },
}

impl AiMove {
    pub fn from(&self) -> Hex {
        match self {
            AiMove::Slide { from, .. } | AiMove::Relocate { from, .. } => *from,
        }
    }

    pub fn to(&self) -> Hex {
        match self {
            AiMove::Slide { to, .. } | AiMove::Relocate { to, .. } => *to,
        }
    }

    /// Command submitting this move on behalf of `actor`
    pub fn into_request(self, actor: impl Into<String>) -> MoveRequest {
        match self {
            AiMove::Slide { piece_id, to, .. } => MoveRequest::piece(actor, piece_id, to),
            AiMove::Relocate { tile, to, .. } => MoveRequest::tile(actor, tile, to),
        }
    }
}

/// Heuristic AI player
pub struct HeuristicAI {
    pub heuristics: Heuristics,
    rng: ChaCha8Rng,
}

impl HeuristicAI {
    pub fn new(heuristics: Heuristics) -> Self {
        Self {
            heuristics,
            rng: ChaCha8Rng::seed_from_u64(42),
        }
    }

    pub fn with_seed(heuristics: Heuristics, seed: u64) -> Self {
        Self {
            heuristics,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn choose_slide(&self, board: &Board, pieces: &[Piece], color: Color) -> Option<SlideMove> {
        best_slide(board, pieces, color, &self.heuristics)
    }

    pub fn choose_relocation(
        &mut self,
        board: &Board,
        pieces: &[Piece],
        color: Color,
    ) -> Option<TileMove> {
        best_relocation(board, pieces, color, &self.heuristics, &mut self.rng)
    }

    /// Move for whichever half-move `state` is waiting on.
    ///
    /// `None` outside play, or when the side to move has no legal move at
    /// all, which the board invariants should rule out.
    pub fn next_move(&mut self, state: &GameState) -> Option<AiMove> {
        if state.status() != Status::Playing {
            return None;
        }
        let color = state.turn();

        let chosen = match state.phase() {
            Phase::SlidePiece => self
                .choose_slide(state.board(), state.pieces(), color)
                .map(|mv| AiMove::Slide {
                    piece_id: state.pieces()[mv.piece].id.clone(),
                    from: mv.from,
                    to: mv.to,
                }),
            Phase::RelocateTile => self
                .choose_relocation(state.board(), state.pieces(), color)
                .map(|mv| AiMove::Relocate {
                    tile: mv.tile,
                    from: mv.from,
                    to: mv.to,
                }),
            Phase::AwaitingOpponent | Phase::Ended => return None,
        };

        match &chosen {
            Some(mv) => tracing::debug!(%color, ?mv, "ai move"),
            None => tracing::error!(%color, phase = ?state.phase(), "no legal move for side to play"),
        }
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::opponent_can_win;
    use crate::layout::{initial_board, initial_pieces};

    fn hexes(coords: &[(i32, i32)]) -> Board {
        Board::new(coords.iter().map(|&(q, r)| Hex::new(q, r)).collect())
    }

    #[test]
    fn test_takes_immediate_win() {
        let board = hexes(&[(0, 0), (1, 0), (2, 0), (3, 0), (0, 1), (0, 2), (1, -1), (-1, 0)]);
        let pieces = vec![
            Piece::new("r1", Color::Red, Hex::new(0, 0)),
            Piece::new("r2", Color::Red, Hex::new(1, -1)),
            Piece::new("r3", Color::Red, Hex::new(3, 0)),
            Piece::new("b1", Color::Blue, Hex::new(0, 2)),
            Piece::new("b2", Color::Blue, Hex::new(-1, 0)),
            Piece::new("b3", Color::Blue, Hex::new(0, 1)),
        ];
        let mv = best_slide(&board, &pieces, Color::Red, &Heuristics::default()).unwrap();
        assert_eq!(mv.piece, 2);
        assert_eq!(mv.to, Hex::new(1, 0));
    }

    #[test]
    fn test_first_found_wins_ties() {
        // Zero weights make every slide score 0; the first enumerated is kept
        let h = Heuristics {
            pair_weight: 0.0,
            spread_weight: 0.0,
            centroid_weight: 0.0,
            enemy_pair_weight: 0.0,
            origin_weight: 0.0,
            ..Heuristics::default()
        };
        let board = initial_board();
        let pieces = initial_pieces();
        let first = legal_slides(&board, &pieces, Color::Red)[0];
        assert_eq!(best_slide(&board, &pieces, Color::Red, &h), Some(first));
    }

    #[test]
    fn test_relocation_is_legal() {
        let board = initial_board();
        let pieces = initial_pieces();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mv = best_relocation(&board, &pieces, Color::Red, &Heuristics::default(), &mut rng)
            .unwrap();
        assert!(crate::rules::is_valid_tile_move(mv.tile, mv.to, &board, &pieces));
    }

    #[test]
    fn test_relocation_avoids_handing_over_a_win() {
        // Blue b3 at (3,0) wins by sliding west to (1,0). Lifting (2,0)
        // breaks the path and the bridge through row -1 keeps the board whole.
        let board = hexes(&[
            (0, 0), (1, 0), (2, 0), (3, 0), (0, 1), (1, -1), (2, -1), (3, -1), (-1, 1),
        ]);
        let pieces = vec![
            Piece::new("r1", Color::Red, Hex::new(1, -1)),
            Piece::new("r2", Color::Red, Hex::new(3, -1)),
            Piece::new("r3", Color::Red, Hex::new(-1, 1)),
            Piece::new("b1", Color::Blue, Hex::new(0, 0)),
            Piece::new("b2", Color::Blue, Hex::new(0, 1)),
            Piece::new("b3", Color::Blue, Hex::new(3, 0)),
        ];
        assert!(opponent_can_win(&board.coord_set(), &pieces, Color::Red));

        let mut ai = HeuristicAI::with_seed(Heuristics::default(), 5);
        let mv = ai.choose_relocation(&board, &pieces, Color::Red).unwrap();
        assert!(legal_relocations(&board, &pieces).contains(&mv));

        let tiles_after: FxHashSet<Hex> = board
            .iter()
            .map(|(id, hex)| if id == mv.tile { mv.to } else { hex })
            .collect();
        assert!(!opponent_can_win(&tiles_after, &pieces, Color::Red));
    }

    #[test]
    fn test_seeded_ai_is_reproducible() {
        let board = initial_board();
        let pieces = initial_pieces();
        let mut a = HeuristicAI::with_seed(Heuristics::default(), 9);
        let mut b = HeuristicAI::with_seed(Heuristics::default(), 9);
        for _ in 0..5 {
            assert_eq!(
                a.choose_relocation(&board, &pieces, Color::Blue),
                b.choose_relocation(&board, &pieces, Color::Blue)
            );
        }
    }

    #[test]
    fn test_next_move_follows_phase() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut ai = HeuristicAI::new(Heuristics::default());

        let waiting = GameState::start("alice", &mut rng);
        assert_eq!(ai.next_move(&waiting), None);

        let game = waiting.join("bob").unwrap();
        let red = game.player_for(Color::Red).unwrap().to_string();
        let mv = ai.next_move(&game).unwrap();
        assert!(matches!(mv, AiMove::Slide { .. }));

        let game = game.apply(&mv.into_request(red.clone())).unwrap().state;
        let mv = ai.next_move(&game).unwrap();
        assert!(matches!(mv, AiMove::Relocate { .. }));
        let game = game.apply(&mv.into_request(red)).unwrap().state;
        assert_eq!(game.turn(), Color::Blue);
    }
}
