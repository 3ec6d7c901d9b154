//! Deck similarity by mainboard card overlap.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::{Deck, Rank};

use super::round1;

/// A similar deck with its Jaccard overlap as a percentage.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarDeck {
    pub deck_id: u64,
    pub name: String,
    pub player: String,
    pub event_name: String,
    pub date: String,
    pub rank: Rank,
    pub similarity: f64,
}

/// The `limit` most similar decks to `deck` from `pool`, by Jaccard
/// similarity on distinct mainboard names. Quantities are ignored. The
/// deck itself (by id) and empty mainboards never match.
pub fn similar_decks(deck: &Deck, pool: &[Deck], limit: usize) -> Vec<SimilarDeck> {
    let deck_cards: HashSet<&str> = deck.mainboard.iter().map(|l| l.card.as_str()).collect();
    if deck_cards.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(f64, &Deck)> = Vec::new();
    for other in pool {
        if other.deck_id == deck.deck_id {
            continue;
        }
        let other_cards: HashSet<&str> = other.mainboard.iter().map(|l| l.card.as_str()).collect();
        if other_cards.is_empty() {
            continue;
        }
        let intersection = deck_cards.intersection(&other_cards).count();
        let union = deck_cards.union(&other_cards).count();
        let sim = if union == 0 {
            0.0
        } else {
            intersection as f64 / union as f64
        };
        scored.push((sim, other));
    }

    // Stable sort keeps pool order between equal scores
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);

    scored
        .into_iter()
        .map(|(sim, d)| SimilarDeck {
            deck_id: d.deck_id,
            name: d.name.clone(),
            player: d.player.clone(),
            event_name: d.event_name.clone(),
            date: d.date.clone(),
            rank: d.rank,
            similarity: round1(sim * 100.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardLine;

    fn deck(id: u64, cards: &[&str]) -> Deck {
        Deck {
            deck_id: id,
            event_id: 1,
            format_id: "EDH".to_string(),
            name: format!("deck {id}"),
            player: "p".to_string(),
            event_name: "e".to_string(),
            date: "15/02/26".to_string(),
            rank: Rank::Unranked,
            player_count: 0,
            mainboard: cards.iter().map(|c| CardLine::new(1, *c)).collect(),
            sideboard: vec![],
            commanders: vec![],
            archetype: None,
        }
    }

    #[test]
    fn test_jaccard_two_of_four() {
        // Overlap {b, c} of union {a, b, c, d} = 50%
        let target = deck(1, &["a", "b", "c"]);
        let pool = vec![deck(2, &["b", "c", "d"])];
        let rows = similar_decks(&target, &pool, 10);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].deck_id, 2);
        assert_eq!(rows[0].similarity, 50.0);
    }

    #[test]
    fn test_identical_mainboards_score_100() {
        let target = deck(1, &["a", "b"]);
        let pool = vec![deck(2, &["a", "b"])];
        assert_eq!(similar_decks(&target, &pool, 10)[0].similarity, 100.0);
    }

    #[test]
    fn test_quantities_do_not_matter() {
        let mut target = deck(1, &["a"]);
        target.mainboard = vec![CardLine::new(4, "a")];
        let pool = vec![deck(2, &["a"])];
        assert_eq!(similar_decks(&target, &pool, 10)[0].similarity, 100.0);
    }

    #[test]
    fn test_self_and_empty_mainboards_excluded() {
        let target = deck(1, &["a", "b"]);
        let pool = vec![deck(1, &["a", "b"]), deck(2, &[]), deck(3, &["a"])];
        let rows = similar_decks(&target, &pool, 10);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].deck_id, 3);
    }

    #[test]
    fn test_empty_target_returns_nothing() {
        let target = deck(1, &[]);
        let pool = vec![deck(2, &["a"])];
        assert!(similar_decks(&target, &pool, 10).is_empty());
    }

    #[test]
    fn test_sorted_and_limited() {
        let target = deck(1, &["a", "b", "c", "d"]);
        let pool = vec![
            deck(2, &["a"]),
            deck(3, &["a", "b", "c", "d"]),
            deck(4, &["a", "b"]),
        ];
        let rows = similar_decks(&target, &pool, 2);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].deck_id, 3);
        assert_eq!(rows[1].deck_id, 4);
    }
}
