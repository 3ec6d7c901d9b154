//! Player standings across the loaded field.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Deck, Rank};

use super::scoring::PlacementWeights;

/// One leaderboard row. `points` always uses placement weights, whatever
/// the caller's display mode is.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerStat {
    pub player: String,
    pub wins: u32,
    pub top2: u32,
    pub top4: u32,
    pub top8: u32,
    pub points: f64,
    pub deck_count: u32,
}

impl PlayerStat {
    fn new(player: String) -> Self {
        Self {
            player,
            wins: 0,
            top2: 0,
            top4: 0,
            top8: 0,
            points: 0.0,
            deck_count: 0,
        }
    }
}

/// Per-player finish counts and points, sorted by wins then points.
///
/// `canonicalize` merges name variants into one bucket (alias handling);
/// pass the identity for raw names. Blank players bucket under
/// `"(unknown)"` before canonicalization.
pub fn player_leaderboard(
    decks: &[Deck],
    weights: &PlacementWeights,
    canonicalize: impl Fn(&str) -> String,
) -> Vec<PlayerStat> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<PlayerStat> = Vec::new();

    for deck in decks {
        let raw = if deck.player.is_empty() {
            "(unknown)"
        } else {
            deck.player.as_str()
        };
        let player = canonicalize(raw);
        let i = *index.entry(player.clone()).or_insert_with(|| {
            rows.push(PlayerStat::new(player.clone()));
            rows.len() - 1
        });

        let stat = &mut rows[i];
        stat.deck_count += 1;
        stat.points += weights.weight(deck.rank);
        if deck.rank == Rank::First {
            stat.wins += 1;
        }
        if deck.rank.within_top(2) {
            stat.top2 += 1;
        }
        if deck.rank.within_top(4) {
            stat.top4 += 1;
        }
        if deck.rank.within_top(8) {
            stat.top8 += 1;
        }
    }

    rows.sort_by(|a, b| {
        b.wins.cmp(&a.wins).then_with(|| {
            b.points
                .partial_cmp(&a.points)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });
    rows
}
