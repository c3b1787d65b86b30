//! Game state and turn sequencing
//!
//! A turn is two half-moves by the same player: slide one of their pieces,
//! then relocate one empty tile. Every operation takes `&self` and returns a
//! new state, so a rejected command can never leave a half-applied game.

use crate::board::{Board, Hex, TileId};
use crate::error::GameError;
use crate::invariants::{check_invariants, InvariantViolation};
use crate::layout::{initial_board, initial_pieces, FIRST_TURN};
use crate::pieces::{Color, Piece};
use crate::request::MoveRequest;
use crate::rules::{
    check_tile_move, legal_relocations, legal_slides, relocation_targets, slide_destinations,
    TileMoveError,
};
use crate::victory::victory_cells;
use rand::Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Sub-turn step. Wire names match the existing clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "waiting")]
    AwaitingOpponent,
    #[serde(rename = "move_token")]
    SlidePiece,
    #[serde(rename = "move_tile")]
    RelocateTile,
    #[serde(rename = "ended")]
    Ended,
}

/// Lifecycle of a game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Waiting,
    Playing,
    Finished,
    Abandoned,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Finished | Status::Abandoned)
    }
}

/// Cell pair for animating a successful move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Motion {
    pub from: Hex,
    pub to: Hex,
}

/// Result of a successful move
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Applied {
    pub state: GameState,
    pub motion: Motion,
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Full state of one game (clone to mutate)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    #[serde(rename = "hostPlayerId")]
    host: String,
    #[serde(rename = "guestPlayerId", default, skip_serializing_if = "Option::is_none")]
    guest: Option<String>,
    host_color: Color,
    tiles: Board,
    pieces: Vec<Piece>,
    turn: Color,
    phase: Phase,
    status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    winner: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "victory_keys")]
    victory_line: Option<[Hex; 3]>,
}

/// `victoryLine` travels as three `"q,r"` keys, which is how clients match
/// cells against it
mod victory_keys {
    use crate::board::Hex;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        line: &Option<[Hex; 3]>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        line.map(|cells| cells.map(|hex| hex.key()))
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<[Hex; 3]>, D::Error> {
        let Some(keys) = Option::<[String; 3]>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let mut cells = [Hex::ORIGIN; 3];
        for (cell, key) in cells.iter_mut().zip(&keys) {
            *cell = key.parse().map_err(D::Error::custom)?;
        }
        Ok(Some(cells))
    }
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// New game waiting for an opponent. The host's color is a coin flip.
    pub fn start<R: Rng + ?Sized>(host: impl Into<String>, rng: &mut R) -> Self {
        Self {
            host: host.into(),
            guest: None,
            host_color: Color::random(rng),
            tiles: initial_board(),
            pieces: initial_pieces(),
            turn: FIRST_TURN,
            phase: Phase::AwaitingOpponent,
            status: Status::Waiting,
            winner: None,
            victory_line: None,
        }
    }

    /// Game in progress from an arbitrary position, `turn` to slide.
    /// The position must satisfy every board and piece invariant.
    pub fn setup(
        host: impl Into<String>,
        guest: impl Into<String>,
        host_color: Color,
        tiles: Board,
        pieces: Vec<Piece>,
        turn: Color,
    ) -> Result<Self, InvariantViolation> {
        let state = Self {
            host: host.into(),
            guest: Some(guest.into()),
            host_color,
            tiles,
            pieces,
            turn,
            phase: Phase::SlidePiece,
            status: Status::Playing,
            winner: None,
            victory_line: None,
        };
        state.check_invariants()?;
        Ok(state)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn guest(&self) -> Option<&str> {
        self.guest.as_deref()
    }

    pub fn host_color(&self) -> Color {
        self.host_color
    }

    pub fn board(&self) -> &Board {
        &self.tiles
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn victory_line(&self) -> Option<[Hex; 3]> {
        self.victory_line
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn piece(&self, id: &str) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter().filter(move |p| p.owner == color)
    }

    /// Color played by `actor`, if seated
    pub fn color_of(&self, actor: &str) -> Option<Color> {
        if self.host == actor {
            Some(self.host_color)
        } else if self.guest.as_deref() == Some(actor) {
            Some(self.host_color.opponent())
        } else {
            None
        }
    }

    /// Seated player ids, host first
    pub fn participants(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::once(self.host.as_str()).chain(self.guest.as_deref())
    }

    /// Player id seated as `color`
    pub fn player_for(&self, color: Color) -> Option<&str> {
        if color == self.host_color {
            Some(&self.host)
        } else {
            self.guest.as_deref()
        }
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        check_invariants(&self.tiles, &self.pieces)
    }

    // ========================================================================
    // READ-ONLY QUERIES (highlighting)
    // ========================================================================

    /// Slide targets for a piece; empty if the id is unknown
    pub fn piece_targets(&self, piece_id: &str) -> Vec<Hex> {
        self.piece(piece_id)
            .map(|piece| slide_destinations(piece, &self.tiles, &self.pieces))
            .unwrap_or_default()
    }

    /// Slide targets for every piece of `color`, in piece order, from one
    /// pass over the board. Pieces that cannot move get an empty list.
    pub fn slide_targets(&self, color: Color) -> Vec<(&Piece, Vec<Hex>)> {
        let slides = legal_slides(&self.tiles, &self.pieces, color);
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, piece)| piece.owner == color)
            .map(|(index, piece)| {
                let targets = slides
                    .iter()
                    .filter(|mv| mv.piece == index)
                    .map(|mv| mv.to)
                    .collect();
                (piece, targets)
            })
            .collect()
    }

    /// Drop targets for a tile, or why it cannot be picked up
    pub fn tile_targets(&self, tile: TileId) -> Result<Vec<Hex>, TileMoveError> {
        relocation_targets(tile, &self.tiles, &self.pieces)
    }

    /// Whether the side to move has anything to do in the current phase
    pub fn has_legal_move(&self) -> bool {
        match self.phase {
            Phase::SlidePiece => !legal_slides(&self.tiles, &self.pieces, self.turn).is_empty(),
            Phase::RelocateTile => !legal_relocations(&self.tiles, &self.pieces).is_empty(),
            Phase::AwaitingOpponent | Phase::Ended => false,
        }
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    pub fn join(&self, guest: impl Into<String>) -> Result<Self, GameError> {
        let guest = guest.into();
        if self.status != Status::Waiting {
            return Err(GameError::NotWaiting(self.status));
        }
        if guest == self.host {
            return Err(GameError::AlreadySeated(guest));
        }

        let mut next = self.clone();
        next.guest = Some(guest);
        next.status = Status::Playing;
        next.phase = Phase::SlidePiece;
        Ok(next)
    }

    /// `actor` leaves; the other color wins. Terminal games cannot be abandoned.
    pub fn abandon(&self, actor: &str) -> Result<Self, GameError> {
        let color = self
            .color_of(actor)
            .ok_or_else(|| GameError::UnknownActor(actor.to_string()))?;
        if self.is_terminal() {
            return Err(GameError::NotPlaying(self.status));
        }

        let mut next = self.clone();
        next.status = Status::Abandoned;
        next.phase = Phase::Ended;
        next.winner = Some(color.opponent());
        tracing::debug!(actor, %color, "game abandoned");
        Ok(next)
    }

    /// Fresh layout with the same players and newly drawn colors
    pub fn rematch<R: Rng + ?Sized>(&self, actor: &str, rng: &mut R) -> Result<Self, GameError> {
        if !self.is_terminal() {
            return Err(GameError::NotTerminal(self.status));
        }
        if self.color_of(actor).is_none() {
            return Err(GameError::UnknownActor(actor.to_string()));
        }

        let mut next = GameState::start(self.host.clone(), rng);
        if let Some(guest) = &self.guest {
            next.guest = Some(guest.clone());
            next.status = Status::Playing;
            next.phase = Phase::SlidePiece;
        }
        Ok(next)
    }

    // ========================================================================
    // APPLY MOVE
    // ========================================================================

    pub fn apply(&self, request: &MoveRequest) -> Result<Applied, GameError> {
        match request {
            MoveRequest::Piece { actor, piece_id, .. } => {
                self.apply_piece_move(actor, piece_id, request.destination())
            }
            MoveRequest::Tile { actor, tile, .. } => {
                self.apply_tile_move(actor, *tile, request.destination())
            }
        }
    }

    /// Slide half-move. On a win the game finishes; otherwise the same
    /// player must now relocate a tile.
    pub fn apply_piece_move(
        &self,
        actor: &str,
        piece_id: &str,
        dest: Hex,
    ) -> Result<Applied, GameError> {
        let color = self.authorize(actor, Phase::SlidePiece)?;

        let index = self
            .pieces
            .iter()
            .position(|p| p.id == piece_id)
            .ok_or_else(|| GameError::NoSuchPiece(piece_id.to_string()))?;
        let piece = &self.pieces[index];
        if piece.owner != color {
            return Err(GameError::WrongOwner {
                piece: piece_id.to_string(),
                owner: piece.owner,
            });
        }
        if !slide_destinations(piece, &self.tiles, &self.pieces).contains(&dest) {
            return Err(GameError::IllegalMove {
                to: dest,
                reason: format!("{} cannot slide there from {}", piece_id, piece.position),
            });
        }

        let from = piece.position;
        let mut next = self.clone();
        next.pieces[index].position = dest;

        if let Some(line) = victory_cells(&next.pieces, color) {
            next.status = Status::Finished;
            next.phase = Phase::Ended;
            next.winner = Some(color);
            next.victory_line = Some(line);
            tracing::info!(%color, piece = piece_id, "connected three, game over");
        } else {
            next.phase = Phase::RelocateTile;
        }

        tracing::debug!(%color, piece = piece_id, %from, to = %dest, "piece slid");
        Ok(Applied {
            state: next,
            motion: Motion { from, to: dest },
        })
    }

    /// Relocation half-move. Ends the turn.
    pub fn apply_tile_move(
        &self,
        actor: &str,
        tile: TileId,
        dest: Hex,
    ) -> Result<Applied, GameError> {
        let color = self.authorize(actor, Phase::RelocateTile)?;

        let from = self.tiles.position(tile).ok_or(GameError::NoSuchTile(tile))?;
        check_tile_move(tile, dest, &self.tiles, &self.pieces)
            .map_err(|err| GameError::from_tile(err, dest))?;
        let mut next = self.clone();
        next.tiles = self.tiles.with_relocated(tile, dest);
        next.phase = Phase::SlidePiece;
        next.turn = color.opponent();

        tracing::debug!(%color, %tile, %from, to = %dest, "tile relocated");
        Ok(Applied {
            state: next,
            motion: Motion { from, to: dest },
        })
    }

    /// Shared gating for both half-moves, in the order callers rely on:
    /// status, phase, seat, turn
    fn authorize(&self, actor: &str, expected: Phase) -> Result<Color, GameError> {
        if self.status != Status::Playing {
            return Err(GameError::NotPlaying(self.status));
        }
        if self.phase != expected {
            return Err(GameError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        let color = self
            .color_of(actor)
            .ok_or_else(|| GameError::UnknownActor(actor.to_string()))?;
        if color != self.turn {
            return Err(GameError::NotYourTurn {
                actor: color,
                turn: self.turn,
            });
        }
        Ok(color)
    }
}

// ============================================================================
// TESTS
// ============================================================================
