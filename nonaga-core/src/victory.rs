//! Win detection

use crate::board::Hex;
use crate::pieces::{positions_of, Color, Piece, PIECES_PER_COLOR};

/// Number of adjacent pairs among `cells`
pub fn adjacent_pairs(cells: &[Hex]) -> usize {
    let mut count = 0;
    for (i, a) in cells.iter().enumerate() {
        for b in &cells[i + 1..] {
            if a.is_adjacent(*b) {
                count += 1;
            }
        }
    }
    count
}

/// Three cells are connected under hex adjacency iff at least two of the
/// three pairs touch. Covers the line, the triangle and the open V.
pub fn is_connected_triple(cells: &[Hex]) -> bool {
    cells.len() == PIECES_PER_COLOR && adjacent_pairs(cells) >= 2
}

/// Winning cells for `color`, or `None` if its pieces are not connected
pub fn victory_cells(pieces: &[Piece], color: Color) -> Option<[Hex; 3]> {
    let cells = positions_of(pieces, color);
    if !is_connected_triple(&cells) {
        return None;
    }
    Some([cells[0], cells[1], cells[2]])
}
