//! NONAGA Core - Rules engine and AI
//!
//! This crate provides the core game logic for NONAGA:
//! - Board geometry (movable hex tiles with axial coordinates)
//! - Piece slides and tile relocations, with connectivity checks
//! - Victory detection
//! - Game state machine and its error taxonomy
//! - Greedy heuristic AI
//!
//! Everything here is synchronous and free of I/O. Randomness is always
//! passed in by the caller.

pub mod board;
pub mod pieces;
pub mod layout;
pub mod rules;
pub mod victory;
pub mod invariants;
pub mod error;
pub mod request;
pub mod game;
pub mod eval;
pub mod ai;

// Re-exports for convenient access
pub use board::{are_adjacent, is_connected, neighbors, Board, Hex, TileId, DIRECTIONS};
pub use pieces::{Color, Piece, PIECES_PER_COLOR};
pub use layout::{initial_board, initial_pieces, FIRST_TURN};
pub use rules::{
    check_tile_move, is_valid_piece_move, is_valid_tile_move, legal_relocations, legal_slides,
    slide_destination, slide_destinations, tile_destinations, SlideMove, TileMove, TileMoveError,
};
pub use victory::{adjacent_pairs, victory_cells};
pub use invariants::InvariantViolation;
pub use error::{ErrorKind, GameError};
pub use request::MoveRequest;
pub use game::{Applied, GameState, Motion, Phase, Status};
pub use eval::Heuristics;
pub use ai::{AiMove, HeuristicAI};
