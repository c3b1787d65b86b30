//! Player colors and pieces

use crate::board::Hex;
use serde::{Deserialize, Serialize};

/// Number of pieces each color owns for the whole game
pub const PIECES_PER_COLOR: usize = 3;

/// Player color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::Red, Color::Blue];

    pub fn opponent(self) -> Self {
        match self {
            Color::Red => Color::Blue,
            Color::Blue => Color::Red,
        }
    }

    /// Uniform coin flip between the two colors
    pub fn random<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Color::Red
        } else {
            Color::Blue
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Red => write!(f, "red"),
            Color::Blue => write!(f, "blue"),
        }
    }
}

impl std::str::FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" | "r" => Ok(Color::Red),
            "blue" | "b" => Ok(Color::Blue),
            other => Err(format!("unknown color: {other}")),
        }
    }
}

/// A piece on the board. Serializes as `{id, player, q, r}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub id: String,
    #[serde(rename = "player")]
    pub owner: Color,
    #[serde(flatten)]
    pub position: Hex,
}

impl Piece {
    pub fn new(id: impl Into<String>, owner: Color, position: Hex) -> Self {
        Self {
            id: id.into(),
            owner,
            position,
        }
    }
}

/// Whether any piece stands on `hex`
pub fn occupied(pieces: &[Piece], hex: Hex) -> bool {
    pieces.iter().any(|p| p.position == hex)
}

/// Positions of the pieces owned by `color`, in slice order
pub fn positions_of(pieces: &[Piece], color: Color) -> Vec<Hex> {
    pieces
        .iter()
        .filter(|p| p.owner == color)
        .map(|p| p.position)
        .collect()
}
