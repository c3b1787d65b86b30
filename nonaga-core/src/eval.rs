//! Move scoring for the heuristic AI
//!
//! Both half-moves are scored one ply deep. A slide is judged by the piece
//! layout it produces; a relocation by whether it hands the opponent a
//! winning slide, then by how it spreads the two sides.

use crate::board::{Hex, DIRECTIONS};
use crate::pieces::{positions_of, Color, Piece};
use crate::rules::slide_destination;
use crate::victory::adjacent_pairs;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Weights for slide and relocation scoring.
///
/// Distances are axial Manhattan (|dq| + |dr|); the defaults were tuned
/// against that metric rather than true hex distance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Flat score for a slide that wins on the spot
    pub win_score: f64,
    /// Per adjacent pair among own pieces
    pub pair_weight: f64,
    /// Per unit of the closest own pair's distance
    pub spread_weight: f64,
    /// Per unit of own pieces' total distance to their centroid
    pub centroid_weight: f64,
    /// Per adjacent pair among opponent pieces
    pub enemy_pair_weight: f64,
    /// Per unit of the moved piece's distance from the origin
    pub origin_weight: f64,

    /// Relocation pulls the tile out from under a threatening piece
    pub kidnap_bonus: f64,
    /// Relocation leaves the opponent a winning slide
    pub threat_penalty: f64,
    /// Per unit of opponent spread gained by moving their tile
    pub scatter_weight: f64,
    /// Extra scatter weight once the opponent already has a pair
    pub racing_weight: f64,
    /// Per unit of distance from the new cell to own pieces, when moving own tile
    pub own_reach_weight: f64,
    /// Per unit of summed pairwise distance among own pieces
    pub cohesion_weight: f64,
    /// Upper bound of the uniform tie-break noise
    pub jitter: f64,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            win_score: 10000.0,
            pair_weight: 500.0,
            spread_weight: 30.0,
            centroid_weight: 20.0,
            enemy_pair_weight: 200.0,
            origin_weight: 5.0,
            kidnap_bonus: 15000.0,
            threat_penalty: 5000.0,
            scatter_weight: 100.0,
            racing_weight: 200.0,
            own_reach_weight: 50.0,
            cohesion_weight: 10.0,
            jitter: 3.0,
        }
    }
}

impl Heuristics {
    /// Load weights from JSON. Missing fields keep their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let heuristics = serde_json::from_str(&content)?;
        Ok(heuristics)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ============================================================================
// DISTANCE HELPERS
// ============================================================================

fn manhattan(a: Hex, b: Hex) -> f64 {
    a.axial_manhattan(b) as f64
}

/// Smallest distance between any two cells, 0 with fewer than two
fn closest_pair(cells: &[Hex]) -> f64 {
    let mut best: Option<f64> = None;
    for (i, &a) in cells.iter().enumerate() {
        for &b in &cells[i + 1..] {
            let d = manhattan(a, b);
            best = Some(best.map_or(d, |cur| cur.min(d)));
        }
    }
    best.unwrap_or(0.0)
}

fn pairwise_sum(cells: &[Hex]) -> f64 {
    let mut total = 0.0;
    for (i, &a) in cells.iter().enumerate() {
        for &b in &cells[i + 1..] {
            total += manhattan(a, b);
        }
    }
    total
}

/// Sum of |q - cq| + |r - cr| about the fractional centroid
fn centroid_spread(cells: &[Hex]) -> f64 {
    if cells.is_empty() {
        return 0.0;
    }
    let n = cells.len() as f64;
    let cq = cells.iter().map(|h| h.q as f64).sum::<f64>() / n;
    let cr = cells.iter().map(|h| h.r as f64).sum::<f64>() / n;
    cells
        .iter()
        .map(|h| (h.q as f64 - cq).abs() + (h.r as f64 - cr).abs())
        .sum()
}

fn mean_distance(from: Hex, cells: &[Hex]) -> f64 {
    if cells.is_empty() {
        return 0.0;
    }
    cells.iter().map(|&c| manhattan(from, c)).sum::<f64>() / cells.len() as f64
}

// ============================================================================
// SLIDE SCORING
// ============================================================================

/// Score the layout after `color` slid a piece to `moved_to`.
/// `pieces` is the full piece list with the slide already applied.
pub fn score_slide(pieces: &[Piece], color: Color, moved_to: Hex, h: &Heuristics) -> f64 {
    let own = positions_of(pieces, color);
    let pairs = adjacent_pairs(&own);
    if pairs >= 2 {
        return h.win_score;
    }

    let enemy = positions_of(pieces, color.opponent());

    let mut score = h.pair_weight * pairs as f64;
    score -= h.spread_weight * closest_pair(&own);
    score -= h.centroid_weight * centroid_spread(&own);
    score -= h.enemy_pair_weight * adjacent_pairs(&enemy) as f64;
    score -= h.origin_weight * manhattan(moved_to, Hex::ORIGIN);
    score
}

// ============================================================================
// RELOCATION SCORING
// ============================================================================

/// Whether the opponent of `color` has a slide on `tiles` that connects all
/// three of their pieces. Every piece blocks, as it would next turn.
pub fn opponent_can_win(tiles: &FxHashSet<Hex>, pieces: &[Piece], color: Color) -> bool {
    let enemy = color.opponent();
    let blockers: FxHashSet<Hex> = pieces.iter().map(|p| p.position).collect();
    let cells = positions_of(pieces, enemy);

    for (slot, &start) in cells.iter().enumerate() {
        for direction in 0..DIRECTIONS.len() {
            let Some(to) = slide_destination(start, direction, tiles, &blockers) else {
                continue;
            };
            let mut after = cells.clone();
            after[slot] = to;
            if adjacent_pairs(&after) >= 2 {
                return true;
            }
        }
    }
    false
}

/// Deterministic part of a relocation score for `color` lifting the tile at
/// `from` and dropping it on `to`. `tiles_after` is the tile set with the
/// relocation applied.
///
/// The kidnap and displaced-opponent terms only fire when a piece stands on
/// `from`. Legal relocations always lift an empty tile, so in play they
/// stay dormant.
pub fn score_relocation(
    from: Hex,
    to: Hex,
    tiles_after: &FxHashSet<Hex>,
    pieces: &[Piece],
    color: Color,
    h: &Heuristics,
) -> f64 {
    let own = positions_of(pieces, color);
    let enemy = positions_of(pieces, color.opponent());
    let rider = pieces.iter().find(|p| p.position == from);
    let enemy_rider = rider.filter(|p| p.owner != color);

    let mut score = 0.0;

    if opponent_can_win(tiles_after, pieces, color) {
        if enemy_rider.is_some() {
            score += h.kidnap_bonus;
        } else {
            score -= h.threat_penalty;
        }
    }

    if enemy_rider.is_some() {
        let others: Vec<Hex> = enemy.iter().copied().filter(|&c| c != from).collect();
        if !others.is_empty() {
            let gain = mean_distance(to, &others) - mean_distance(from, &others);
            score += h.scatter_weight * gain;
            if adjacent_pairs(&enemy) >= 1 {
                score += h.racing_weight * gain;
            }
        }
    }

    match rider {
        Some(p) if p.owner == color => {
            let others: Vec<Hex> = own.iter().copied().filter(|&c| c != from).collect();
            score -= h.own_reach_weight * mean_distance(to, &others);
        }
        _ => {
            score -= h.cohesion_weight * pairwise_sum(&own);
        }
    }

    score
}
