//! Card metadata models backing composition analysis.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The Scryfall projection this service keeps per card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardDetails {
    /// Canonical card name as Scryfall reports it
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub mana_cost: String,

    /// Converted mana cost; fractional values exist (un-sets)
    #[serde(default)]
    pub cmc: f64,

    #[serde(default)]
    pub type_line: String,

    /// Printed colors (single letters W/U/B/R/G)
    #[serde(default)]
    pub colors: Vec<String>,

    /// Color identity, superset of printed colors
    #[serde(default)]
    pub color_identity: Vec<String>,

    /// Image URI map, passed through untouched for the frontend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uris: Option<serde_json::Value>,
}

/// Lookup result for a single card name.
///
/// Cards the metadata source never resolved are `Unknown`; callers must
/// branch on this explicitly instead of treating absence as empty fields,
/// because several composition rules differ for unknown cards.
#[derive(Debug, Clone, Copy)]
pub enum CardMetadata<'a> {
    Known(&'a CardDetails),
    Unknown,
}

impl<'a> CardMetadata<'a> {
    /// The details, when this card resolved.
    pub fn known(&self) -> Option<&'a CardDetails> {
        match self {
            CardMetadata::Known(details) => Some(details),
            CardMetadata::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, CardMetadata::Known(_))
    }
}

/// Name-keyed card metadata table for one analysis pass.
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    entries: HashMap<String, CardDetails>,
}

impl CardCatalog {
    /// Build a catalog from a name-to-details map.
    pub fn from_map(entries: HashMap<String, CardDetails>) -> Self {
        Self { entries }
    }

    /// Look up a card by its deck-list name.
    pub fn get(&self, name: &str) -> CardMetadata<'_> {
        match self.entries.get(name) {
            Some(details) => CardMetadata::Known(details),
            None => CardMetadata::Unknown,
        }
    }

    /// Add or replace one entry.
    pub fn insert(&mut self, name: impl Into<String>, details: CardDetails) {
        self.entries.insert(name.into(), details);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
