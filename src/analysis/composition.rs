//! Per-deck composition breakdowns backed by card metadata.
//!
//! Metadata is best-effort: cards the lookup never resolved still appear
//! in every grouping, with land detection falling back to the name tables
//! and everything else falling to the documented defaults.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{CardCatalog, CardDetails, Deck};

use super::lands::LandTables;
use super::round1;

/// Primary card type precedence. A type line containing several of these
/// takes the first match, so "Land Creature" groups as Land.
const TYPE_ORDER: [&str; 7] = [
    "Land",
    "Creature",
    "Instant",
    "Sorcery",
    "Enchantment",
    "Artifact",
    "Planeswalker",
];

/// Color group display order: the five colors, colorless, multicolor,
/// then the land bucket.
const COLOR_ORDER: [&str; 8] = ["W", "U", "B", "R", "G", "C", "M", "Land"];

fn type_rank(t: &str) -> usize {
    TYPE_ORDER.iter().position(|x| *x == t).unwrap_or(99)
}

fn color_rank(c: &str) -> usize {
    COLOR_ORDER.iter().position(|x| *x == c).unwrap_or(99)
}

/// Primary type from a Scryfall type line; no match falls to "Other".
fn primary_type(type_line: &str) -> &'static str {
    let upper = type_line.to_uppercase();
    TYPE_ORDER
        .iter()
        .find(|t| upper.contains(&t.to_uppercase()))
        .copied()
        .unwrap_or("Other")
}

/// Single-letter color group for one card: W/U/B/R/G mono, M multicolor,
/// C colorless. Printed colors win over identity for the group label.
fn color_group(details: &CardDetails) -> &'static str {
    let colors = if !details.colors.is_empty() {
        &details.colors
    } else {
        &details.color_identity
    };
    match colors.len() {
        0 => "C",
        1 => match colors[0].as_str() {
            "W" => "W",
            "U" => "U",
            "B" => "B",
            "R" => "R",
            "G" => "G",
            "M" => "M",
            _ => "C",
        },
        _ => "M",
    }
}

/// Map key ordered by type precedence, then name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TypeKey(pub String);

impl From<&str> for TypeKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        type_rank(&self.0)
            .cmp(&type_rank(&other.0))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for TypeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Map key ordered by color wheel order, then name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColorKey(pub String);

impl From<&str> for ColorKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Ord for ColorKey {
    fn cmp(&self, other: &Self) -> Ordering {
        color_rank(&self.0)
            .cmp(&color_rank(&other.0))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ColorKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Deck lines echoed into a group, in list order, as (qty, name) pairs.
pub type GroupedLines = Vec<(u32, String)>;

/// Pip share per color group. All six fields are always present.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ColorShares {
    #[serde(rename = "W")]
    pub white: f64,
    #[serde(rename = "U")]
    pub blue: f64,
    #[serde(rename = "B")]
    pub black: f64,
    #[serde(rename = "R")]
    pub red: f64,
    #[serde(rename = "G")]
    pub green: f64,
    #[serde(rename = "C")]
    pub colorless: f64,
}

/// Land versus nonland card counts.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LandsSplit {
    pub lands: u32,
    pub nonlands: u32,
}

/// Averaged land counts for a deck group.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LandsSplitAverage {
    pub lands: f64,
    pub nonlands: f64,
}

/// Metadata echoed per known card for display.
#[derive(Debug, Clone, Serialize)]
pub struct CardMetaEntry {
    pub mana_cost: String,
    pub cmc: f64,
    pub type_line: String,
    pub colors: Vec<String>,
}

/// Full composition breakdown for one deck.
#[derive(Debug, Clone, Serialize)]
pub struct DeckComposition {
    pub mana_curve: BTreeMap<u32, u32>,
    pub color_distribution: ColorShares,
    pub lands_distribution: LandsSplit,
    pub type_distribution: BTreeMap<TypeKey, u32>,
    pub grouped_by_type: BTreeMap<TypeKey, GroupedLines>,
    pub grouped_by_type_sideboard: BTreeMap<TypeKey, GroupedLines>,
    pub grouped_by_cmc: BTreeMap<u32, GroupedLines>,
    pub grouped_by_cmc_sideboard: BTreeMap<u32, GroupedLines>,
    pub grouped_by_color: BTreeMap<ColorKey, GroupedLines>,
    pub grouped_by_color_sideboard: BTreeMap<ColorKey, GroupedLines>,
    pub card_meta: BTreeMap<String, CardMetaEntry>,
}

/// Composition stats averaged per deck over a group.
#[derive(Debug, Clone, Serialize)]
pub struct ArchetypeComposition {
    pub mana_curve: BTreeMap<u32, f64>,
    pub color_distribution: ColorShares,
    pub lands_distribution: LandsSplitAverage,
    pub type_distribution: BTreeMap<TypeKey, f64>,
}

/// One deck line resolved against the catalog.
struct LineClass<'a> {
    details: Option<&'a CardDetails>,
    is_land: bool,
    primary: &'static str,
    cmc_bucket: u32,
    color: &'static str,
}

fn classify<'a>(card: &str, catalog: &'a CardCatalog, lands: &LandTables) -> LineClass<'a> {
    let details = catalog.get(card).known();
    // Known cards decide landness from the type line alone; unknown cards
    // fall back to the exact-name tables.
    let is_land = match details {
        Some(d) => d.type_line.to_uppercase().contains("LAND"),
        None => lands.is_land_name(card),
    };
    let primary = match details {
        Some(d) => primary_type(&d.type_line),
        None => {
            if is_land {
                "Land"
            } else {
                "Other"
            }
        }
    };
    let cmc_bucket = details.map(|d| d.cmc as u32).unwrap_or(0);
    let color = if is_land {
        "Land"
    } else {
        match details {
            Some(d) => color_group(d),
            None => "C",
        }
    };
    LineClass {
        details,
        is_land,
        primary,
        cmc_bucket,
        color,
    }
}

#[derive(Debug, Default)]
struct ColorCounts {
    w: u32,
    u: u32,
    b: u32,
    r: u32,
    g: u32,
    c: u32,
}

impl ColorCounts {
    fn add(&mut self, letter: &str, qty: u32) {
        match letter {
            "W" => self.w += qty,
            "U" => self.u += qty,
            "B" => self.b += qty,
            "R" => self.r += qty,
            "G" => self.g += qty,
            "C" => self.c += qty,
            _ => {}
        }
    }

    fn total(&self) -> u32 {
        self.w + self.u + self.b + self.r + self.g + self.c
    }

    fn shares(&self) -> ColorShares {
        let total = self.total();
        if total == 0 {
            return ColorShares::default();
        }
        let total = f64::from(total);
        ColorShares {
            white: round1(100.0 * f64::from(self.w) / total),
            blue: round1(100.0 * f64::from(self.u) / total),
            black: round1(100.0 * f64::from(self.b) / total),
            red: round1(100.0 * f64::from(self.r) / total),
            green: round1(100.0 * f64::from(self.g) / total),
            colorless: round1(100.0 * f64::from(self.c) / total),
        }
    }
}

/// Mainboard stat counters shared by the per-deck and aggregate passes.
#[derive(Default)]
struct StatCounters {
    curve: BTreeMap<u32, u32>,
    colors: ColorCounts,
    lands: u32,
    nonlands: u32,
    types: BTreeMap<TypeKey, u32>,
}

impl StatCounters {
    fn add_line(&mut self, class: &LineClass, qty: u32) {
        *self.types.entry(TypeKey::from(class.primary)).or_insert(0) += qty;

        if class.is_land {
            self.lands += qty;
        } else {
            self.nonlands += qty;
            // Curve covers nonland cards with known cost, cmc truncated
            if class.details.is_some() {
                *self.curve.entry(class.cmc_bucket).or_insert(0) += qty;
            }
        }

        // Pip counting prefers color identity over printed colors, the
        // reverse of the group label. Colorless cards with metadata count
        // as C; unknown cards contribute no pips at all.
        if let Some(details) = class.details {
            let colors = if !details.color_identity.is_empty() {
                &details.color_identity
            } else {
                &details.colors
            };
            if colors.is_empty() {
                self.colors.c += qty;
            } else {
                for letter in colors {
                    self.colors.add(letter, qty);
                }
            }
        }
    }
}

fn record_meta(out: &mut BTreeMap<String, CardMetaEntry>, card: &str, details: Option<&CardDetails>) {
    if let Some(d) = details {
        if !out.contains_key(card) {
            out.insert(
                card.to_string(),
                CardMetaEntry {
                    mana_cost: d.mana_cost.clone(),
                    cmc: d.cmc,
                    type_line: d.type_line.clone(),
                    colors: d.colors.clone(),
                },
            );
        }
    }
}

/// Full composition breakdown for one deck: curve, color pips, land
/// split, type counts, and grouped views of both boards.
pub fn deck_composition(deck: &Deck, catalog: &CardCatalog, lands: &LandTables) -> DeckComposition {
    let mut stats = StatCounters::default();
    let mut grouped_by_type: BTreeMap<TypeKey, GroupedLines> = BTreeMap::new();
    let mut grouped_by_cmc: BTreeMap<u32, GroupedLines> = BTreeMap::new();
    let mut grouped_by_color: BTreeMap<ColorKey, GroupedLines> = BTreeMap::new();
    let mut card_meta: BTreeMap<String, CardMetaEntry> = BTreeMap::new();

    for line in &deck.mainboard {
        let class = classify(&line.card, catalog, lands);
        stats.add_line(&class, line.qty);
        grouped_by_type
            .entry(TypeKey::from(class.primary))
            .or_default()
            .push((line.qty, line.card.clone()));
        grouped_by_cmc
            .entry(class.cmc_bucket)
            .or_default()
            .push((line.qty, line.card.clone()));
        grouped_by_color
            .entry(ColorKey::from(class.color))
            .or_default()
            .push((line.qty, line.card.clone()));
        record_meta(&mut card_meta, &line.card, class.details);
    }

    let mut grouped_by_type_sideboard: BTreeMap<TypeKey, GroupedLines> = BTreeMap::new();
    let mut grouped_by_cmc_sideboard: BTreeMap<u32, GroupedLines> = BTreeMap::new();
    let mut grouped_by_color_sideboard: BTreeMap<ColorKey, GroupedLines> = BTreeMap::new();

    for line in &deck.sideboard {
        let class = classify(&line.card, catalog, lands);
        grouped_by_type_sideboard
            .entry(TypeKey::from(class.primary))
            .or_default()
            .push((line.qty, line.card.clone()));
        grouped_by_cmc_sideboard
            .entry(class.cmc_bucket)
            .or_default()
            .push((line.qty, line.card.clone()));
        grouped_by_color_sideboard
            .entry(ColorKey::from(class.color))
            .or_default()
            .push((line.qty, line.card.clone()));
        record_meta(&mut card_meta, &line.card, class.details);
    }

    DeckComposition {
        mana_curve: stats.curve,
        color_distribution: stats.colors.shares(),
        lands_distribution: LandsSplit {
            lands: stats.lands,
            nonlands: stats.nonlands,
        },
        type_distribution: stats.types,
        grouped_by_type,
        grouped_by_type_sideboard,
        grouped_by_cmc,
        grouped_by_cmc_sideboard,
        grouped_by_color,
        grouped_by_color_sideboard,
        card_meta,
    }
}

/// Composition stats averaged per deck across a group, for archetype
/// pages. Sideboards are excluded; the color pie is recomputed over the
/// pooled pips.
pub fn archetype_composition(
    decks: &[Deck],
    catalog: &CardCatalog,
    lands: &LandTables,
) -> ArchetypeComposition {
    let mut stats = StatCounters::default();
    for deck in decks {
        for line in &deck.mainboard {
            let class = classify(&line.card, catalog, lands);
            stats.add_line(&class, line.qty);
        }
    }

    let n = decks.len().max(1) as f64;
    ArchetypeComposition {
        mana_curve: stats
            .curve
            .into_iter()
            .map(|(k, v)| (k, round1(f64::from(v) / n)))
            .collect(),
        color_distribution: stats.colors.shares(),
        lands_distribution: LandsSplitAverage {
            lands: round1(f64::from(stats.lands) / n),
            nonlands: round1(f64::from(stats.nonlands) / n),
        },
        type_distribution: stats
            .types
            .into_iter()
            .map(|(k, v)| (k, round1(f64::from(v) / n)))
            .collect(),
    }
}
