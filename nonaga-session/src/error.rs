//! Store errors

use crate::session::GameId;
use nonaga_core::{ErrorKind, GameError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no game with id {0}")]
    NotFound(GameId),
    #[error("game changed since it was read (expected version {expected}, now {actual})")]
    VersionConflict { expected: u64, actual: u64 },
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("bad snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl StoreError {
    /// Taxonomy kind for rejections that came from the rules engine.
    /// A stale version is reported as a conflict.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            StoreError::Game(err) => Some(err.kind()),
            StoreError::VersionConflict { .. } => Some(ErrorKind::Conflict),
            StoreError::NotFound(_) | StoreError::Snapshot(_) => None,
        }
    }

    /// Whether refetching the session and retrying can succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::VersionConflict { .. } => true,
            StoreError::Game(err) => err.is_retryable(),
            StoreError::NotFound(_) | StoreError::Snapshot(_) => false,
        }
    }
}
