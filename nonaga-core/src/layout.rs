//! Canonical starting layout
//!
//! Existing clients address tiles by index, so both the coordinates and
//! their order are part of the protocol and must not change.

use crate::board::{Board, Hex};
use crate::pieces::{Color, Piece};

/// The 19 starting tiles: a radius-2 hexagon, in protocol order
#[rustfmt::skip]
pub const INITIAL_TILES: [(i32, i32); 19] = [
    (0, 0),
    (1, 0), (-1, 0),
    (0, 1), (0, -1),
    (1, -1), (-1, 1),
    (2, 0), (-2, 0),
    (0, 2), (0, -2),
    (2, -1), (-2, 1),
    (1, 1), (-1, -1),
    (2, -2), (-2, 2),
    (1, -2), (-1, 2),
];

/// Starting pieces: alternating corners of the outer ring
pub const INITIAL_PIECES: [(&str, Color, (i32, i32)); 6] = [
    ("r1", Color::Red, (2, -2)),
    ("r2", Color::Red, (0, 2)),
    ("r3", Color::Red, (-2, 0)),
    ("b1", Color::Blue, (2, 0)),
    ("b2", Color::Blue, (-2, 2)),
    ("b3", Color::Blue, (0, -2)),
];

/// Color that moves first in every game
pub const FIRST_TURN: Color = Color::Red;

pub fn initial_board() -> Board {
    Board::new(
        INITIAL_TILES
            .iter()
            .map(|&(q, r)| Hex::new(q, r))
            .collect(),
    )
}

pub fn initial_pieces() -> Vec<Piece> {
    INITIAL_PIECES
        .iter()
        .map(|&(id, owner, (q, r))| Piece::new(id, owner, Hex::new(q, r)))
        .collect()
}
