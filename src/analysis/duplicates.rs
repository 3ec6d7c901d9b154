//! Duplicate deck detection over mainboard signatures.

use std::collections::{BTreeMap, HashMap};

use crate::models::Deck;

/// Group decks whose mainboards are identical as multisets of
/// `(qty, card)` lines. Each group maps its numerically smallest deck id
/// to the remaining ids in ascending order; singleton groups are omitted.
pub fn find_duplicate_decks(decks: &[Deck]) -> BTreeMap<u64, Vec<u64>> {
    let mut by_signature: HashMap<Vec<(u32, String)>, Vec<u64>> = HashMap::new();

    for deck in decks {
        let mut signature: Vec<(u32, String)> = deck
            .mainboard
            .iter()
            .map(|l| (l.qty, l.card.clone()))
            .collect();
        signature.sort_unstable();
        by_signature.entry(signature).or_default().push(deck.deck_id);
    }

    let mut groups = BTreeMap::new();
    for ids in by_signature.into_values() {
        if ids.len() < 2 {
            continue;
        }
        let mut ids = ids;
        ids.sort_unstable();
        let primary = ids.remove(0);
        groups.insert(primary, ids);
    }
    groups
}
