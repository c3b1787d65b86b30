//! Structural checks every reachable position satisfies

use crate::board::{Board, Hex};
use crate::pieces::{Color, Piece, PIECES_PER_COLOR};
use rustc_hash::FxHashSet;

/// Board or piece layout that no sequence of legal moves can produce
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("two tiles share cell {0}")]
    DuplicateTile(Hex),
    #[error("tiles do not form one connected region")]
    Disconnected,
    #[error("piece {0} is not on a tile")]
    PieceOffBoard(String),
    #[error("more than one piece on {0}")]
    StackedPieces(Hex),
    #[error("{color} has {count} pieces")]
    PieceCount { color: Color, count: usize },
}

pub fn check_invariants(board: &Board, pieces: &[Piece]) -> Result<(), InvariantViolation> {
    let mut seen = FxHashSet::default();
    for &hex in board.coords() {
        if !seen.insert(hex) {
            return Err(InvariantViolation::DuplicateTile(hex));
        }
    }
    if !board.is_connected() {
        return Err(InvariantViolation::Disconnected);
    }

    let mut stood = FxHashSet::default();
    for piece in pieces {
        if !seen.contains(&piece.position) {
            return Err(InvariantViolation::PieceOffBoard(piece.id.clone()));
        }
        if !stood.insert(piece.position) {
            return Err(InvariantViolation::StackedPieces(piece.position));
        }
    }

    for color in Color::ALL {
        let count = pieces.iter().filter(|p| p.owner == color).count();
        if count != PIECES_PER_COLOR {
            return Err(InvariantViolation::PieceCount { color, count });
        }
    }

    Ok(())
}
