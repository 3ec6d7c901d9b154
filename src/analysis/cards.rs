//! Card play rates and copy counts.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::{CardLine, Deck};

use super::lands::LandTables;
use super::round1;
use super::scoring::Scoring;

const TOP_CARDS_LIMIT: usize = 100;

/// Usage row for one card. `decks` is how many distinct decks ran it,
/// `total_copies` the (possibly weighted) copy count across the field.
#[derive(Debug, Clone, Serialize)]
pub struct CardUsage {
    pub card: String,
    pub decks: usize,
    pub play_rate_pct: f64,
    pub total_copies: f64,
}

/// Top mainboard cards by weighted copies. Basic lands never rank;
/// `ignore_lands` additionally drops every known land name.
pub fn top_cards_main(
    decks: &[Deck],
    scoring: Scoring,
    lands: &LandTables,
    ignore_lands: bool,
) -> Vec<CardUsage> {
    collect_usage(
        decks,
        scoring,
        |d| d.mainboard.as_slice(),
        |card| lands.is_basic(card) || (ignore_lands && lands.is_land_name(card)),
    )
}

/// Top sideboard cards by weighted copies. No land filtering applies.
pub fn top_cards_sideboard(decks: &[Deck], scoring: Scoring) -> Vec<CardUsage> {
    collect_usage(decks, scoring, |d| d.sideboard.as_slice(), |_| false)
}

fn collect_usage(
    decks: &[Deck],
    scoring: Scoring,
    board: impl Fn(&Deck) -> &[CardLine],
    skip: impl Fn(&str) -> bool,
) -> Vec<CardUsage> {
    let deck_count = decks.len();
    let mut order: Vec<String> = Vec::new();
    let mut deck_sets: HashMap<String, HashSet<u64>> = HashMap::new();
    let mut copies: HashMap<String, f64> = HashMap::new();

    for deck in decks {
        let weight = scoring.score(deck);
        for line in board(deck) {
            if skip(&line.card) {
                continue;
            }
            if !deck_sets.contains_key(&line.card) {
                order.push(line.card.clone());
            }
            deck_sets
                .entry(line.card.clone())
                .or_default()
                .insert(deck.deck_id);
            *copies.entry(line.card.clone()).or_insert(0.0) += f64::from(line.qty) * weight;
        }
    }

    // Stable sort keeps first-seen order between equal copy counts
    order.sort_by(|a, b| {
        let ca = copies.get(a).copied().unwrap_or(0.0);
        let cb = copies.get(b).copied().unwrap_or(0.0);
        cb.partial_cmp(&ca).unwrap_or(std::cmp::Ordering::Equal)
    });
    order.truncate(TOP_CARDS_LIMIT);

    order
        .into_iter()
        .map(|card| {
            let in_decks = deck_sets.get(&card).map(HashSet::len).unwrap_or(0);
            CardUsage {
                decks: in_decks,
                play_rate_pct: round1(100.0 * in_decks as f64 / deck_count as f64),
                total_copies: round1(copies.get(&card).copied().unwrap_or(0.0)),
                card,
            }
        })
        .collect()
}
