//! Deck record and tournament rank models.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One line of a deck list: a quantity and a card name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardLine {
    pub qty: u32,
    pub card: String,
}

impl CardLine {
    /// Create a new card line.
    pub fn new(qty: u32, card: impl Into<String>) -> Self {
        Self {
            qty,
            card: card.into(),
        }
    }
}

/// Finishing bracket as reported by mtgtop8.
///
/// The site only ever reports these brackets; anything else on the wire
/// collapses to `Unranked`, which serializes back as an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Rank {
    First,
    Second,
    TopFour,
    TopEight,
    TopSixteen,
    TopThirtyTwo,
    #[default]
    Unranked,
}

impl Rank {
    /// The site's string form for this bracket.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::First => "1",
            Rank::Second => "2",
            Rank::TopFour => "3-4",
            Rank::TopEight => "5-8",
            Rank::TopSixteen => "9-16",
            Rank::TopThirtyTwo => "17-32",
            Rank::Unranked => "",
        }
    }

    /// Parse the site's string form. Unknown strings are unranked.
    pub fn parse(s: &str) -> Self {
        match s {
            "1" => Rank::First,
            "2" => Rank::Second,
            "3-4" => Rank::TopFour,
            "5-8" => Rank::TopEight,
            "9-16" => Rank::TopSixteen,
            "17-32" => Rank::TopThirtyTwo,
            _ => Rank::Unranked,
        }
    }

    /// Ordering key: better finishes sort first, unranked last.
    pub fn sort_order(&self) -> u32 {
        match self {
            Rank::First => 0,
            Rank::Second => 1,
            Rank::TopFour => 2,
            Rank::TopEight => 3,
            Rank::TopSixteen => 4,
            Rank::TopThirtyTwo => 5,
            Rank::Unranked => 99,
        }
    }

    /// True when this bracket is at least as good as the `n` cutoff
    /// (top 2, top 4, top 8).
    pub fn within_top(&self, n: u32) -> bool {
        let cutoff = match n {
            2 => 1,
            4 => 2,
            8 => 3,
            _ => return false,
        };
        self.sort_order() <= cutoff
    }
}

impl From<String> for Rank {
    fn from(s: String) -> Self {
        Rank::parse(&s)
    }
}

impl From<Rank> for String {
    fn from(r: Rank) -> Self {
        r.as_str().to_string()
    }
}

/// A single tournament deck as scraped from mtgtop8.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    /// Site-wide deck id
    pub deck_id: u64,

    /// Event the deck was played in
    pub event_id: u64,

    /// Format code (e.g. "EDH", "MO")
    #[serde(default)]
    pub format_id: String,

    /// Deck title
    #[serde(default = "default_unknown")]
    pub name: String,

    /// Pilot name as listed
    #[serde(default = "default_unknown")]
    pub player: String,

    /// Event title
    #[serde(default = "default_unknown")]
    pub event_name: String,

    /// Event date in DD/MM/YY, empty when the site omits it
    #[serde(default)]
    pub date: String,

    /// Finishing bracket
    #[serde(default)]
    pub rank: Rank,

    /// Field size, 0 when unknown
    #[serde(default)]
    pub player_count: u32,

    /// Main deck, in list order; names may repeat
    #[serde(default)]
    pub mainboard: Vec<CardLine>,

    /// Sideboard plus companion, in list order
    #[serde(default)]
    pub sideboard: Vec<CardLine>,

    /// Commander zone cards (Commander formats only)
    #[serde(default)]
    pub commanders: Vec<String>,

    /// Site archetype label
    #[serde(default)]
    pub archetype: Option<String>,
}

fn default_unknown() -> String {
    "Unknown".to_string()
}

impl Deck {
    /// Canonical commander grouping key: the commander names sorted and
    /// joined with `" / "`, or `"(no commander)"` when the zone is empty.
    pub fn commander_key(&self) -> String {
        if self.commanders.is_empty() {
            return "(no commander)".to_string();
        }
        let mut names: Vec<&str> = self.commanders.iter().map(String::as_str).collect();
        names.sort_unstable();
        names.join(" / ")
    }

    /// Archetype label with the missing/blank sentinel applied.
    pub fn archetype_label(&self) -> &str {
        match self.archetype.as_deref() {
            Some(a) if !a.is_empty() => a,
            _ => "(unknown)",
        }
    }

    /// Rewrite single-slash split card names in both boards to the
    /// canonical `"A // B"` form.
    pub fn normalize_card_names(&mut self) {
        for line in self.mainboard.iter_mut().chain(self.sideboard.iter_mut()) {
            line.card = normalize_split_name(&line.card);
        }
    }
}

/// Canonicalize a split card name: `"Fire / Ice"` becomes `"Fire // Ice"`.
/// Names already in double-slash form pass through untouched.
pub fn normalize_split_name(name: &str) -> String {
    if name.contains(" // ") {
        return name.to_string();
    }
    let re = Regex::new(r"\s+/\s+").unwrap();
    re.replace_all(name, " // ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_deck() -> Deck {
        Deck {
            deck_id: 811597,
            event_id: 80455,
            format_id: "EDH".to_string(),
            name: "Spider-man 2099".to_string(),
            player: "Jeremy Lb".to_string(),
            event_name: "CR PdLL MTGAnjou @ Angers (France)".to_string(),
            date: "15/02/26".to_string(),
            rank: Rank::First,
            player_count: 128,
            mainboard: vec![
                CardLine::new(1, "Spider-Man 2099"),
                CardLine::new(2, "Lightning Bolt"),
                CardLine::new(38, "Lands"),
            ],
            sideboard: vec![CardLine::new(1, "Soul-Guide Lantern")],
            commanders: vec!["Spider-Man 2099".to_string()],
            archetype: Some("UR Aggro".to_string()),
        }
    }

    #[test]
    fn test_rank_round_trip() {
        for (s, r) in [
            ("1", Rank::First),
            ("2", Rank::Second),
            ("3-4", Rank::TopFour),
            ("5-8", Rank::TopEight),
            ("9-16", Rank::TopSixteen),
            ("17-32", Rank::TopThirtyTwo),
            ("", Rank::Unranked),
        ] {
            assert_eq!(Rank::parse(s), r);
            assert_eq!(r.as_str(), s);
        }
    }

    #[test]
    fn test_rank_unknown_string_is_unranked() {
        assert_eq!(Rank::parse("7"), Rank::Unranked);
        let r: Rank = serde_json::from_str("\"totally-bogus\"").unwrap();
        assert_eq!(r, Rank::Unranked);
    }

    #[test]
    fn test_rank_serde_uses_site_strings() {
        let json = serde_json::to_string(&Rank::TopFour).unwrap();
        assert_eq!(json, "\"3-4\"");
        let back: Rank = serde_json::from_str("\"3-4\"").unwrap();
        assert_eq!(back, Rank::TopFour);
    }

    #[test]
    fn test_rank_ordering_and_cutoffs() {
        assert!(Rank::First.sort_order() < Rank::Second.sort_order());
        assert!(Rank::TopThirtyTwo.sort_order() < Rank::Unranked.sort_order());
        assert!(Rank::Second.within_top(2));
        assert!(!Rank::TopFour.within_top(2));
        assert!(Rank::TopFour.within_top(4));
        assert!(Rank::TopEight.within_top(8));
        assert!(!Rank::TopSixteen.within_top(8));
    }

    #[test]
    fn test_commander_key_sorts_names() {
        let mut deck = sample_deck();
        deck.commanders = vec!["Thrasios".to_string(), "Kraum".to_string()];
        assert_eq!(deck.commander_key(), "Kraum / Thrasios");
    }

    #[test]
    fn test_commander_key_empty() {
        let mut deck = sample_deck();
        deck.commanders.clear();
        assert_eq!(deck.commander_key(), "(no commander)");
    }

    #[test]
    fn test_archetype_label_sentinel() {
        let mut deck = sample_deck();
        assert_eq!(deck.archetype_label(), "UR Aggro");
        deck.archetype = None;
        assert_eq!(deck.archetype_label(), "(unknown)");
        deck.archetype = Some(String::new());
        assert_eq!(deck.archetype_label(), "(unknown)");
    }

    #[test]
    fn test_normalize_split_name() {
        assert_eq!(normalize_split_name("Fire / Ice"), "Fire // Ice");
        assert_eq!(normalize_split_name("Fire // Ice"), "Fire // Ice");
        assert_eq!(normalize_split_name("Lightning Bolt"), "Lightning Bolt");
    }

    #[test]
    fn test_deck_normalize_card_names() {
        let mut deck = sample_deck();
        deck.mainboard.push(CardLine::new(1, "Life / Death"));
        deck.sideboard.push(CardLine::new(1, "Wear / Tear"));
        deck.normalize_card_names();
        assert_eq!(deck.mainboard.last().unwrap().card, "Life // Death");
        assert_eq!(deck.sideboard.last().unwrap().card, "Wear // Tear");
        // Untouched names survive as-is
        assert_eq!(deck.mainboard[1].card, "Lightning Bolt");
    }

    #[test]
    fn test_deck_serde_defaults() {
        let json = r#"{"deck_id": 1, "event_id": 2, "format_id": "EDH"}"#;
        let deck: Deck = serde_json::from_str(json).unwrap();
        assert_eq!(deck.name, "Unknown");
        assert_eq!(deck.player, "Unknown");
        assert_eq!(deck.rank, Rank::Unranked);
        assert!(deck.mainboard.is_empty());
        assert!(deck.archetype.is_none());
    }

    #[test]
    fn test_deck_serialization_round_trip() {
        let deck = sample_deck();
        let json = serde_json::to_string(&deck).unwrap();
        assert!(json.contains("\"rank\":\"1\""));
        assert!(json.contains("\"qty\":38"));
        let back: Deck = serde_json::from_str(&json).unwrap();
        assert_eq!(back.deck_id, deck.deck_id);
        assert_eq!(back.rank, Rank::First);
        assert_eq!(back.mainboard, deck.mainboard);
    }
}
