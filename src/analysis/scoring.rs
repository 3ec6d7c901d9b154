//! Placement weighting shared by every score-based statistic.

use std::collections::HashMap;

use crate::models::{Deck, Rank};

/// Weight per finishing bracket. Ranks missing from the table (including
/// unranked) fall back to 1.0, so every deck always scores something.
#[derive(Debug, Clone)]
pub struct PlacementWeights {
    weights: HashMap<Rank, f64>,
    fallback: f64,
}

impl Default for PlacementWeights {
    fn default() -> Self {
        let weights = HashMap::from([
            (Rank::First, 8.0),
            (Rank::Second, 6.0),
            (Rank::TopFour, 4.0),
            (Rank::TopEight, 2.0),
            (Rank::TopSixteen, 1.0),
            (Rank::TopThirtyTwo, 0.5),
        ]);
        Self {
            weights,
            fallback: 1.0,
        }
    }
}

impl PlacementWeights {
    /// The weight for one bracket.
    pub fn weight(&self, rank: Rank) -> f64 {
        self.weights.get(&rank).copied().unwrap_or(self.fallback)
    }
}

/// How a deck contributes to a tally.
#[derive(Debug, Clone, Copy)]
pub enum Scoring<'a> {
    /// Every deck counts once.
    Uniform,
    /// Decks count by their finishing bracket's weight.
    Weighted(&'a PlacementWeights),
}

impl Scoring<'_> {
    /// This deck's contribution.
    pub fn score(&self, deck: &Deck) -> f64 {
        match self {
            Scoring::Uniform => 1.0,
            Scoring::Weighted(weights) => weights.weight(deck.rank),
        }
    }
}
