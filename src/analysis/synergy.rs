//! Card pairs that recur across decks.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::Deck;

use super::lands::LandTables;

/// A co-occurring pair. Names are ordered `card_a < card_b`.
#[derive(Debug, Clone, Serialize)]
pub struct CardPair {
    pub card_a: String,
    pub card_b: String,
    pub decks: u32,
}

/// Count mainboard pairs across the field: for each deck take its distinct
/// mainboard names (basics excluded; all land names excluded when
/// `ignore_lands`), then count every unordered pair. Pairs seen in at
/// least `min_decks` decks rank by descending count, capped at `top_n`.
pub fn card_synergy(
    decks: &[Deck],
    min_decks: u32,
    top_n: usize,
    lands: &LandTables,
    ignore_lands: bool,
) -> Vec<CardPair> {
    let mut order: Vec<(&str, &str)> = Vec::new();
    let mut counts: HashMap<(&str, &str), u32> = HashMap::new();

    for deck in decks {
        let unique: HashSet<&str> = deck
            .mainboard
            .iter()
            .map(|l| l.card.as_str())
            .filter(|card| !lands.is_basic(card) && !(ignore_lands && lands.is_land_name(card)))
            .collect();
        let mut cards: Vec<&str> = unique.into_iter().collect();
        cards.sort_unstable();

        for i in 0..cards.len() {
            for j in (i + 1)..cards.len() {
                let key = (cards[i], cards[j]);
                let count = counts.entry(key).or_insert(0);
                if *count == 0 {
                    order.push(key);
                }
                *count += 1;
            }
        }
    }

    // Stable sort keeps first-seen order between equal counts
    order.sort_by(|a, b| {
        let ca = counts.get(a).copied().unwrap_or(0);
        let cb = counts.get(b).copied().unwrap_or(0);
        cb.cmp(&ca)
    });

    order
        .into_iter()
        .filter_map(|key| {
            let count = counts.get(&key).copied().unwrap_or(0);
            (count >= min_decks).then(|| CardPair {
                card_a: key.0.to_string(),
                card_b: key.1.to_string(),
                decks: count,
            })
        })
        .take(top_n)
        .collect()
}
