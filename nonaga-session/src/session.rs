//! Stored game records

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use nonaga_core::GameState;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of a generated game id, in hex characters
pub const GAME_ID_LEN: usize = 16;

/// Opaque game identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Fresh random id of [`GAME_ID_LEN`] lowercase hex characters
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        GameId(format!("{:016x}", rng.gen::<u64>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GameId {
    fn from(s: &str) -> Self {
        GameId(s.to_string())
    }
}

impl From<String> for GameId {
    fn from(s: String) -> Self {
        GameId(s)
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One game as held by the store.
///
/// `version` increases by one on every accepted mutation and is the token
/// callers hand back for compare-and-swap updates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: GameId,
    pub version: u64,
    pub state: GameState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_move_at: Option<DateTime<Utc>>,
}

impl Session {
    pub(crate) fn new(id: GameId, state: GameState) -> Self {
        let now = Utc::now();
        Self {
            id,
            version: 0,
            state,
            created_at: now,
            updated_at: now,
            last_move_at: None,
        }
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }
}
