//! Move legality: piece slides and tile relocations
//!
//! Every caller (state machine, AI, presentation highlighting, probe) goes
//! through these functions. Nothing else in the workspace re-derives the
//! rules.

use crate::board::{is_connected, Board, Hex, TileId, DIRECTIONS};
use crate::pieces::{occupied, Color, Piece};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Minimum number of remaining tiles a relocated tile must touch
pub const MIN_TILE_CONTACTS: usize = 2;

// ============================================================================
// MOVE TYPES
// ============================================================================

/// A legal piece slide. `piece` indexes the pieces slice it was generated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlideMove {
    pub piece: usize,
    pub direction: usize,
    pub from: Hex,
    pub to: Hex,
}

/// A legal tile relocation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileMove {
    pub tile: TileId,
    pub from: Hex,
    pub to: Hex,
}

/// Why a tile relocation was refused, one variant per gate
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TileMoveError {
    #[error("tile {0} does not exist")]
    NoSuchTile(TileId),
    #[error("tile {0} carries a piece")]
    Occupied(TileId),
    #[error("a tile already sits at {0}")]
    DestinationTaken(Hex),
    #[error("lifting tile {0} would split the board")]
    WouldDisconnect(TileId),
    #[error("{0} touches fewer than two remaining tiles")]
    NotAnchored(Hex),
}

impl TileMoveError {
    /// Gate 1 failures are about what was picked, the rest about where it goes
    pub fn is_selection_error(&self) -> bool {
        matches!(self, TileMoveError::NoSuchTile(_) | TileMoveError::Occupied(_))
    }
}

// ============================================================================
// PIECE SLIDES
// ============================================================================

/// Farthest cell reachable from `from` along `direction`, or `None` when the
/// first step is already blocked. A cell blocks when it has no tile or holds
/// a piece.
pub fn slide_destination(
    from: Hex,
    direction: usize,
    tiles: &FxHashSet<Hex>,
    blockers: &FxHashSet<Hex>,
) -> Option<Hex> {
    let mut current = from;
    loop {
        let Some(next) = current.step(direction) else {
            break;
        };
        if !tiles.contains(&next) || blockers.contains(&next) {
            break;
        }
        current = next;
    }
    (current != from).then_some(current)
}

/// Destinations for `piece`, at most one per direction, in direction order
pub fn slide_destinations(piece: &Piece, board: &Board, pieces: &[Piece]) -> Vec<Hex> {
    let tiles = board.coord_set();
    let blockers = piece_set(pieces);
    (0..DIRECTIONS.len())
        .filter_map(|dir| slide_destination(piece.position, dir, &tiles, &blockers))
        .collect()
}

pub fn is_valid_piece_move(piece: &Piece, dest: Hex, board: &Board, pieces: &[Piece]) -> bool {
    slide_destinations(piece, board, pieces).contains(&dest)
}

/// Every legal slide for `color`: pieces in slice order, directions inner.
///
/// The AI keeps the first of equally scored slides, so this order decides
/// ties. Piece-major matches the play of the existing clients' AI; do not
/// swap the loops.
pub fn legal_slides(board: &Board, pieces: &[Piece], color: Color) -> Vec<SlideMove> {
    let tiles = board.coord_set();
    let blockers = piece_set(pieces);
    let mut moves = Vec::new();

    for (index, piece) in pieces.iter().enumerate() {
        if piece.owner != color {
            continue;
        }
        for direction in 0..DIRECTIONS.len() {
            if let Some(to) = slide_destination(piece.position, direction, &tiles, &blockers) {
                moves.push(SlideMove {
                    piece: index,
                    direction,
                    from: piece.position,
                    to,
                });
            }
        }
    }

    moves
}

// ============================================================================
// TILE RELOCATIONS
// ============================================================================

/// Empty cells touching at least two tiles once `selected` is lifted,
/// excluding the selected tile's own cell. Order is first-seen while
/// scanning remaining tiles and their neighbors.
///
/// Ignores pieces and connectivity; see [`check_tile_move`] for the full gate.
pub fn tile_destinations(selected: TileId, board: &Board) -> Vec<Hex> {
    let Some(origin) = board.position(selected) else {
        return Vec::new();
    };

    let remaining: FxHashSet<Hex> = board
        .iter()
        .filter(|&(id, _)| id != selected)
        .map(|(_, hex)| hex)
        .collect();

    let mut order = Vec::new();
    let mut contacts: FxHashMap<Hex, usize> = FxHashMap::default();

    for (id, hex) in board.iter() {
        if id == selected {
            continue;
        }
        for candidate in hex.neighbors() {
            if candidate == origin || remaining.contains(&candidate) {
                continue;
            }
            let count = contacts.entry(candidate).or_insert_with(|| {
                order.push(candidate);
                0
            });
            *count += 1;
        }
    }

    order
        .into_iter()
        .filter(|hex| contacts[hex] >= MIN_TILE_CONTACTS)
        .collect()
}

/// Run the four relocation gates in order, reporting the first that fails
pub fn check_tile_move(
    selected: TileId,
    dest: Hex,
    board: &Board,
    pieces: &[Piece],
) -> Result<(), TileMoveError> {
    let origin = board
        .position(selected)
        .ok_or(TileMoveError::NoSuchTile(selected))?;

    if occupied(pieces, origin) {
        return Err(TileMoveError::Occupied(selected));
    }

    if board.contains(dest) {
        return Err(TileMoveError::DestinationTaken(dest));
    }

    if !is_connected(board.coords(), Some(selected.index())) {
        return Err(TileMoveError::WouldDisconnect(selected));
    }

    let contacts = board
        .iter()
        .filter(|&(id, hex)| id != selected && hex.is_adjacent(dest))
        .count();
    if contacts < MIN_TILE_CONTACTS {
        return Err(TileMoveError::NotAnchored(dest));
    }

    Ok(())
}

pub fn is_valid_tile_move(selected: TileId, dest: Hex, board: &Board, pieces: &[Piece]) -> bool {
    check_tile_move(selected, dest, board, pieces).is_ok()
}

/// Destinations for a tile the player has picked up, for highlighting.
/// Fails when the pick itself is not allowed.
pub fn relocation_targets(
    selected: TileId,
    board: &Board,
    pieces: &[Piece],
) -> Result<Vec<Hex>, TileMoveError> {
    let origin = board
        .position(selected)
        .ok_or(TileMoveError::NoSuchTile(selected))?;
    if occupied(pieces, origin) {
        return Err(TileMoveError::Occupied(selected));
    }
    if !is_connected(board.coords(), Some(selected.index())) {
        return Err(TileMoveError::WouldDisconnect(selected));
    }
    Ok(tile_destinations(selected, board))
}

/// Every legal relocation: tiles in handle order, destinations in
/// [`tile_destinations`] order
pub fn legal_relocations(board: &Board, pieces: &[Piece]) -> Vec<TileMove> {
    let mut moves = Vec::new();
    for (tile, from) in board.iter() {
        let Ok(targets) = relocation_targets(tile, board, pieces) else {
            continue;
        };
        moves.extend(targets.into_iter().map(|to| TileMove { tile, from, to }));
    }
    moves
}

fn piece_set(pieces: &[Piece]) -> FxHashSet<Hex> {
    pieces.iter().map(|p| p.position).collect()
}
