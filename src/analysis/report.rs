//! Composed metagame report.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::Deck;

use super::cards::{top_cards_main, CardUsage};
use super::distribution::{
    archetype_distribution, commander_distribution, ArchetypeShare, CommanderShare,
};
use super::lands::LandTables;
use super::scoring::{PlacementWeights, Scoring};
use super::synergy::{card_synergy, CardPair};

/// Synergy pairs are only meaningful with a few decks to cross-reference.
const SYNERGY_MIN_POOL: usize = 3;
const SYNERGY_MIN_SHARED_DECKS: u32 = 2;
const SYNERGY_TOP_PAIRS: usize = 30;

/// Headline counts for a deck pool.
#[derive(Debug, Clone, Serialize)]
pub struct DiversitySummary {
    pub total_decks: usize,
    /// Distinct commander pairings, counting only decks that have one
    pub unique_commanders: usize,
    /// Distinct archetype labels; unlabeled decks pool under one label
    pub unique_archetypes: usize,
}

/// Report knobs plus the shared weight and land tables.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions<'a> {
    pub placement_weighted: bool,
    pub ignore_lands: bool,
    pub include_card_synergy: bool,
    pub weights: &'a PlacementWeights,
    pub lands: &'a LandTables,
}

impl<'a> ReportOptions<'a> {
    pub fn new(weights: &'a PlacementWeights, lands: &'a LandTables) -> Self {
        Self {
            placement_weighted: false,
            ignore_lands: false,
            include_card_synergy: true,
            weights,
            lands,
        }
    }

    pub fn with_placement_weighted(mut self, on: bool) -> Self {
        self.placement_weighted = on;
        self
    }

    pub fn with_ignore_lands(mut self, on: bool) -> Self {
        self.ignore_lands = on;
        self
    }

    pub fn with_card_synergy(mut self, on: bool) -> Self {
        self.include_card_synergy = on;
        self
    }
}

/// The full report shape, written to disk and served over the API.
#[derive(Debug, Clone, Serialize)]
pub struct MetagameReport {
    pub summary: DiversitySummary,
    pub commander_distribution: Vec<CommanderShare>,
    pub archetype_distribution: Vec<ArchetypeShare>,
    pub top_cards_main: Vec<CardUsage>,
    /// Echoes of the options the report was built with
    pub placement_weighted: bool,
    pub ignore_lands: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_synergy: Option<Vec<CardPair>>,
}

/// Headline diversity counts.
pub fn deck_diversity(decks: &[Deck]) -> DiversitySummary {
    let commanders: HashSet<String> = decks
        .iter()
        .filter(|d| !d.commanders.is_empty())
        .map(|d| d.commander_key())
        .collect();
    let archetypes: HashSet<String> = decks
        .iter()
        .map(|d| d.archetype_label().to_string())
        .collect();
    DiversitySummary {
        total_decks: decks.len(),
        unique_commanders: commanders.len(),
        unique_archetypes: archetypes.len(),
    }
}

/// Build the metagame report for a deck pool.
pub fn analyze(decks: &[Deck], options: &ReportOptions<'_>) -> MetagameReport {
    let scoring = if options.placement_weighted {
        Scoring::Weighted(options.weights)
    } else {
        Scoring::Uniform
    };

    let synergy = (options.include_card_synergy && decks.len() >= SYNERGY_MIN_POOL).then(|| {
        card_synergy(
            decks,
            SYNERGY_MIN_SHARED_DECKS,
            SYNERGY_TOP_PAIRS,
            options.lands,
            options.ignore_lands,
        )
    });

    MetagameReport {
        summary: deck_diversity(decks),
        commander_distribution: commander_distribution(decks, scoring),
        archetype_distribution: archetype_distribution(decks, scoring),
        top_cards_main: top_cards_main(decks, scoring, options.lands, options.ignore_lands),
        placement_weighted: options.placement_weighted,
        ignore_lands: options.ignore_lands,
        card_synergy: synergy,
    }
}
