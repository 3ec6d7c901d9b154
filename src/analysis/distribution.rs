//! Commander and archetype popularity.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::Deck;

use super::round1;
use super::scoring::Scoring;

/// One commander row. `count` is the (possibly weighted) score, `pct` its
/// share of the total.
#[derive(Debug, Clone, Serialize)]
pub struct CommanderShare {
    pub commander: String,
    pub count: f64,
    pub pct: f64,
}

/// One archetype row.
#[derive(Debug, Clone, Serialize)]
pub struct ArchetypeShare {
    pub archetype: String,
    pub count: f64,
    pub pct: f64,
}

/// Score and field share per commander pairing, heaviest first.
/// Partner pairings group under one sorted key; decks without a commander
/// group under `"(no commander)"`.
pub fn commander_distribution(decks: &[Deck], scoring: Scoring) -> Vec<CommanderShare> {
    keyed_shares(decks, scoring, |d| d.commander_key())
        .into_iter()
        .map(|(commander, count, pct)| CommanderShare {
            commander,
            count,
            pct,
        })
        .collect()
}

/// Score and field share per archetype, heaviest first. Decks without a
/// label group under `"(unknown)"`.
pub fn archetype_distribution(decks: &[Deck], scoring: Scoring) -> Vec<ArchetypeShare> {
    keyed_shares(decks, scoring, |d| d.archetype_label().to_string())
        .into_iter()
        .map(|(archetype, count, pct)| ArchetypeShare {
            archetype,
            count,
            pct,
        })
        .collect()
}

/// Accumulate scores per key and convert to (key, rounded score, rounded
/// pct) rows sorted by descending score. Ties keep first-seen order.
fn keyed_shares(
    decks: &[Deck],
    scoring: Scoring,
    key_fn: impl Fn(&Deck) -> String,
) -> Vec<(String, f64, f64)> {
    let mut order: Vec<String> = Vec::new();
    let mut scores: HashMap<String, f64> = HashMap::new();

    for deck in decks {
        let key = key_fn(deck);
        if !scores.contains_key(&key) {
            order.push(key.clone());
        }
        *scores.entry(key).or_insert(0.0) += scoring.score(deck);
    }

    let total: f64 = scores.values().sum();
    let total = if total == 0.0 { 1.0 } else { total };

    order.sort_by(|a, b| {
        let sa = scores.get(a).copied().unwrap_or(0.0);
        let sb = scores.get(b).copied().unwrap_or(0.0);
        sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
    });

    order
        .into_iter()
        .map(|key| {
            let score = scores.get(&key).copied().unwrap_or(0.0);
            let pct = round1(100.0 * score / total);
            (key, round1(score), pct)
        })
        .collect()
}
