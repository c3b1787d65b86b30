//! Rejection reasons for state machine commands
//!
//! Every error here is an expected outcome of a caller acting on state it has
//! not fully synchronized. None of them is fatal; callers refetch and retry.

use crate::board::{Hex, TileId};
use crate::game::{Phase, Status};
use crate::pieces::Color;
use crate::rules::TileMoveError;
use serde::{Deserialize, Serialize};

/// Coarse taxonomy callers map to user-facing messages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Conflict,
    UnknownActor,
    NotYourTurn,
    WrongPhase,
    InvalidSelection,
    IllegalMove,
}

impl ErrorKind {
    /// Retrying after a refresh can succeed for everything except an actor
    /// who is not in the game at all
    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorKind::UnknownActor)
    }

    /// Short human message
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::Conflict => "The game is not in a state that allows this.",
            ErrorKind::UnknownActor => "You are not a player in this game.",
            ErrorKind::NotYourTurn => "It is not your turn.",
            ErrorKind::WrongPhase => "Wrong step: slide a piece first, then move a tile.",
            ErrorKind::InvalidSelection => "That piece or tile cannot be picked.",
            ErrorKind::IllegalMove => "That destination is not allowed.",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("game is not waiting for an opponent (status {0:?})")]
    NotWaiting(Status),
    #[error("game is not in progress (status {0:?})")]
    NotPlaying(Status),
    #[error("game has not ended (status {0:?})")]
    NotTerminal(Status),
    #[error("player {0} is already seated in this game")]
    AlreadySeated(String),
    #[error("player {0} is not in this game")]
    UnknownActor(String),
    #[error("it is {turn}'s turn, not {actor}'s")]
    NotYourTurn { actor: Color, turn: Color },
    #[error("expected phase {expected:?}, game is in {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error("no piece with id {0}")]
    NoSuchPiece(String),
    #[error("piece {piece} belongs to {owner}")]
    WrongOwner { piece: String, owner: Color },
    #[error("no tile {0}")]
    NoSuchTile(TileId),
    #[error("tile {0} carries a piece")]
    TileOccupied(TileId),
    #[error("cannot move to {to}: {reason}")]
    IllegalMove { to: Hex, reason: String },
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::NotWaiting(_)
            | GameError::NotPlaying(_)
            | GameError::NotTerminal(_)
            | GameError::AlreadySeated(_) => ErrorKind::Conflict,
            GameError::UnknownActor(_) => ErrorKind::UnknownActor,
            GameError::NotYourTurn { .. } => ErrorKind::NotYourTurn,
            GameError::WrongPhase { .. } => ErrorKind::WrongPhase,
            GameError::NoSuchPiece(_)
            | GameError::WrongOwner { .. }
            | GameError::NoSuchTile(_)
            | GameError::TileOccupied(_) => ErrorKind::InvalidSelection,
            GameError::IllegalMove { .. } => ErrorKind::IllegalMove,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    pub(crate) fn from_tile(err: TileMoveError, dest: Hex) -> Self {
        match err {
            TileMoveError::NoSuchTile(id) => GameError::NoSuchTile(id),
            TileMoveError::Occupied(id) => GameError::TileOccupied(id),
            other => GameError::IllegalMove {
                to: dest,
                reason: other.to_string(),
            },
        }
    }
}
