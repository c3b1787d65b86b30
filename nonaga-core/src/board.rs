//! Hex board geometry with axial coordinates
//!
//! The board is not a fixed grid: it is whatever set of tiles is currently
//! on the table. Tiles live in an arena addressed by [`TileId`], so a tile
//! keeps its identity while its coordinate changes.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const ORIGIN: Hex = Hex::new(0, 0);

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Neighbor in direction (0-5), see [`DIRECTIONS`]. `None` past the
    /// edge of the coordinate range.
    pub fn step(&self, direction: usize) -> Option<Hex> {
        let (dq, dr) = DIRECTIONS[direction % 6];
        Some(Hex::new(self.q.checked_add(dq)?, self.r.checked_add(dr)?))
    }

    /// The neighbors, in [`DIRECTIONS`] order. Six except at the edge of the
    /// coordinate range.
    pub fn neighbors(&self) -> impl Iterator<Item = Hex> {
        let hex = *self;
        (0..DIRECTIONS.len()).filter_map(move |dir| hex.step(dir))
    }

    pub fn is_adjacent(&self, other: Hex) -> bool {
        let dq = i64::from(other.q) - i64::from(self.q);
        let dr = i64::from(other.r) - i64::from(self.r);
        DIRECTIONS
            .iter()
            .any(|&(q, r)| (i64::from(q), i64::from(r)) == (dq, dr))
    }

    /// Distance between two hexes
    pub fn distance_to(&self, other: Hex) -> i64 {
        let dq = (i64::from(self.q) - i64::from(other.q)).abs();
        let dr = (i64::from(self.r) - i64::from(other.r)).abs();
        let ds = (i64::from(self.q) + i64::from(self.r) - i64::from(other.q) - i64::from(other.r)).abs();
        (dq + dr + ds) / 2
    }

    /// |dq| + |dr|. Not a true hex metric; the AI weights were tuned against it.
    pub fn axial_manhattan(&self, other: Hex) -> i64 {
        (i64::from(self.q) - i64::from(other.q)).abs() + (i64::from(self.r) - i64::from(other.r)).abs()
    }
}

impl Hex {
    /// `"q,r"`, the form clients use to key cells
    pub fn key(&self) -> String {
        format!("{},{}", self.q, self.r)
    }
}

impl std::str::FromStr for Hex {
    type Err = String;

    /// Parses a [`Hex::key`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (q, r) = s
            .split_once(',')
            .ok_or_else(|| format!("not a cell key: {s}"))?;
        let coord = |part: &str| {
            part.trim()
                .parse::<i32>()
                .map_err(|_| format!("not a cell key: {s}"))
        };
        Ok(Hex::new(coord(q)?, coord(r)?))
    }
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.q, self.r)
    }
}

/// Direction vectors in axial coordinates (dq, dr).
///
/// The enumeration order is fixed: move generation walks directions in this
/// order and the AI breaks ties by first-found, so reordering changes play.
pub const DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
];

/// The neighbors of `c`, in [`DIRECTIONS`] order
pub fn neighbors(c: Hex) -> impl Iterator<Item = Hex> {
    c.neighbors()
}

pub fn are_adjacent(a: Hex, b: Hex) -> bool {
    a.is_adjacent(b)
}

/// Check that `tiles` (minus the tile at `excluding`, if any) forms one
/// connected region. An empty set is connected.
pub fn is_connected(tiles: &[Hex], excluding: Option<usize>) -> bool {
    let remaining: Vec<Hex> = tiles
        .iter()
        .enumerate()
        .filter(|&(i, _)| Some(i) != excluding)
        .map(|(_, &hex)| hex)
        .collect();

    let Some(&start) = remaining.first() else {
        return true;
    };

    let present: FxHashSet<Hex> = remaining.iter().copied().collect();
    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for next in current.neighbors() {
            if present.contains(&next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    visited.len() == present.len()
}

// ============================================================================
// TILE ARENA
// ============================================================================

/// Stable handle for a tile.
///
/// Equal to the tile's index in the external protocol. Tiles are never added
/// or removed during a game, only relocated, so the handle never shifts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub usize);

impl TileId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The set of tiles currently on the table
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    tiles: Vec<Hex>,
}

impl Board {
    pub fn new(tiles: Vec<Hex>) -> Self {
        Self { tiles }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Coordinates in handle order
    pub fn coords(&self) -> &[Hex] {
        &self.tiles
    }

    pub fn position(&self, id: TileId) -> Option<Hex> {
        self.tiles.get(id.index()).copied()
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.tiles.contains(&hex)
    }

    /// Handle of the tile at `hex`
    pub fn tile_at(&self, hex: Hex) -> Option<TileId> {
        self.tiles.iter().position(|&t| t == hex).map(TileId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileId, Hex)> + '_ {
        self.tiles.iter().enumerate().map(|(i, &hex)| (TileId(i), hex))
    }

    /// Coordinate set for O(1) membership tests
    pub fn coord_set(&self) -> FxHashSet<Hex> {
        self.tiles.iter().copied().collect()
    }

    pub fn is_connected(&self) -> bool {
        is_connected(&self.tiles, None)
    }

    /// Same board with one tile moved. No legality checks.
    pub(crate) fn with_relocated(&self, id: TileId, dest: Hex) -> Board {
        let mut tiles = self.tiles.clone();
        tiles[id.index()] = dest;
        Board { tiles }
    }

    pub fn has_duplicates(&self) -> bool {
        self.coord_set().len() != self.tiles.len()
    }
}

impl From<Vec<Hex>> for Board {
    fn from(tiles: Vec<Hex>) -> Self {
        Board::new(tiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: i32) -> Vec<Hex> {
        (0..n).map(|q| Hex::new(q, 0)).collect()
    }

    #[test]
    fn test_neighbors_order() {
        let n: Vec<Hex> = neighbors(Hex::ORIGIN).collect();
        assert_eq!(n.len(), 6);
        assert_eq!(n[0], Hex::new(1, 0));
        assert_eq!(n[3], Hex::new(-1, 0));
        assert_eq!(n[5], Hex::new(0, 1));
        assert!(n.iter().all(|&h| are_adjacent(Hex::ORIGIN, h)));
    }

    #[test]
    fn test_adjacency() {
        let a = Hex::new(2, -1);
        assert!(a.is_adjacent(Hex::new(1, 0)));
        assert!(a.is_adjacent(Hex::new(2, -2)));
        assert!(!a.is_adjacent(a));
        // (1,1) is a diagonal in offset terms, not a hex neighbor
        assert!(!Hex::ORIGIN.is_adjacent(Hex::new(1, 1)));
        assert!(!Hex::ORIGIN.is_adjacent(Hex::new(2, 0)));
    }

    #[test]
    fn test_coordinate_range_edge() {
        let far = Hex::new(i32::MAX, 0);
        assert_eq!(far.step(0), None);
        assert_eq!(far.step(3), Some(Hex::new(i32::MAX - 1, 0)));
        assert_eq!(far.neighbors().count(), 4);
        assert!(!far.is_adjacent(Hex::new(i32::MIN, 0)));
        assert!(!Hex::new(i32::MIN, 0).is_adjacent(Hex::ORIGIN));
        assert_eq!(Hex::new(i32::MIN, 0).distance_to(far), 2 * i64::from(i32::MAX) + 1);
    }

    #[test]
    fn test_cell_keys() {
        assert_eq!(Hex::new(1, -1).key(), "1,-1");
        assert_eq!("1,-1".parse::<Hex>(), Ok(Hex::new(1, -1)));
        assert_eq!(" -2, 0".parse::<Hex>(), Ok(Hex::new(-2, 0)));
        assert!("1;2".parse::<Hex>().is_err());
        assert!("1,x".parse::<Hex>().is_err());
    }

    #[test]
    fn test_distance() {
        assert_eq!(Hex::ORIGIN.distance_to(Hex::new(2, -1)), 2);
        assert_eq!(Hex::ORIGIN.distance_to(Hex::new(2, -2)), 2);
        assert_eq!(Hex::ORIGIN.axial_manhattan(Hex::new(2, -2)), 4);
    }

    #[test]
    fn test_connected_line() {
        assert!(is_connected(&line(5), None));
        // Removing an interior tile splits the line
        assert!(!is_connected(&line(5), Some(2)));
        // Removing an end keeps it whole
        assert!(is_connected(&line(5), Some(4)));
    }

    #[test]
    fn test_connected_empty_and_single() {
        assert!(is_connected(&[], None));
        assert!(is_connected(&[Hex::ORIGIN], None));
        assert!(is_connected(&[Hex::ORIGIN], Some(0)));
    }

    #[test]
    fn test_disconnected() {
        let tiles = vec![Hex::new(0, 0), Hex::new(1, 0), Hex::new(5, 5)];
        assert!(!is_connected(&tiles, None));
        assert!(is_connected(&tiles, Some(2)));
    }

    #[test]
    fn test_board_handles() {
        let board = Board::new(line(3));
        assert_eq!(board.tile_at(Hex::new(2, 0)), Some(TileId(2)));
        assert_eq!(board.position(TileId(1)), Some(Hex::new(1, 0)));
        assert_eq!(board.position(TileId(3)), None);

        // Relocation keeps every other handle where it was
        let moved = board.with_relocated(TileId(0), Hex::new(1, -1));
        assert_eq!(moved.position(TileId(0)), Some(Hex::new(1, -1)));
        assert_eq!(moved.position(TileId(2)), Some(Hex::new(2, 0)));
        assert!(moved.is_connected());
    }
}
