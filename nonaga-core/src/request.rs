//! Move commands as they arrive from a client

use crate::board::{Hex, TileId};
use serde::{Deserialize, Serialize};

/// One half-move submitted by a player.
///
/// Wire form: `{"type": "piece", "playerId", "pieceId", "toQ", "toR"}` or
/// `{"type": "tile", "playerId", "tileIndex", "toQ", "toR"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MoveRequest {
    Piece {
        #[serde(rename = "playerId")]
        actor: String,
        #[serde(rename = "pieceId")]
        piece_id: String,
        #[serde(rename = "toQ")]
        to_q: i32,
        #[serde(rename = "toR")]
        to_r: i32,
    },
    Tile {
        #[serde(rename = "playerId")]
        actor: String,
        #[serde(rename = "tileIndex")]
        tile: TileId,
        #[serde(rename = "toQ")]
        to_q: i32,
        #[serde(rename = "toR")]
        to_r: i32,
    },
}

impl MoveRequest {
    pub fn piece(actor: impl Into<String>, piece_id: impl Into<String>, to: Hex) -> Self {
        MoveRequest::Piece {
            actor: actor.into(),
            piece_id: piece_id.into(),
            to_q: to.q,
            to_r: to.r,
        }
    }

    pub fn tile(actor: impl Into<String>, tile: TileId, to: Hex) -> Self {
        MoveRequest::Tile {
            actor: actor.into(),
            tile,
            to_q: to.q,
            to_r: to.r,
        }
    }

    pub fn actor(&self) -> &str {
        match self {
            MoveRequest::Piece { actor, .. } | MoveRequest::Tile { actor, .. } => actor,
        }
    }

    pub fn destination(&self) -> Hex {
        match *self {
            MoveRequest::Piece { to_q, to_r, .. } | MoveRequest::Tile { to_q, to_r, .. } => {
                Hex::new(to_q, to_r)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_piece_request() {
        let json = r#"{"type":"piece","playerId":"p1","pieceId":"r2","toQ":1,"toR":-1}"#;
        let req: MoveRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req, MoveRequest::piece("p1", "r2", Hex::new(1, -1)));
        assert_eq!(req.actor(), "p1");
    }

    #[test]
    fn test_parse_tile_request() {
        let json = r#"{"type":"tile","playerId":"p2","tileIndex":7,"toQ":3,"toR":0}"#;
        let req: MoveRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req, MoveRequest::tile("p2", TileId(7), Hex::new(3, 0)));
        assert_eq!(req.destination(), Hex::new(3, 0));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let json = r#"{"type":"pass","playerId":"p1"}"#;
        assert!(serde_json::from_str::<MoveRequest>(json).is_err());
    }
}
