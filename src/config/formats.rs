//! mtgtop8 format codes and meta filter presets.

/// Format codes the site uses, with display names.
pub const FORMATS: [(&str, &str); 17] = [
    ("ST", "Standard"),
    ("PI", "Pioneer"),
    ("MO", "Modern"),
    ("LE", "Legacy"),
    ("VI", "Vintage"),
    ("PAU", "Pauper"),
    ("cEDH", "cEDH"),
    ("EDH", "Duel Commander"),
    ("PREM", "Premodern"),
    ("EXP", "Explorer"),
    ("HI", "Historic"),
    ("ALCH", "Alchemy"),
    ("PEA", "Peasant"),
    ("BL", "Block"),
    ("EX", "Extended"),
    ("HIGH", "Highlander"),
    ("CHL", "Canadian Highlander"),
];

/// Meta presets for the Commander formats, as (label, meta id).
const META_EDH: [(&str, u32); 13] = [
    ("Last 7 Days", 328),
    ("Last 2 Weeks", 115),
    ("Last 2 Months", 121),
    ("MTGO Last 2 Months", 306),
    ("Paper Last 2 Months", 308),
    ("Last Major Events (3 Months)", 130),
    ("Last 6 Months", 209),
    ("All 2026 Decks", 343),
    ("All 2025 Decks", 310),
    ("All 2024 Decks", 283),
    ("All 2023 Decks", 252),
    ("Major Events", 196),
    ("All Commander decks", 56),
];

/// Meta presets for Standard.
const META_ST: [(&str, u32); 3] = [
    ("Last 2 Weeks", 50),
    ("Last 2 Months", 52),
    ("All 2026 Decks", 341),
];

/// The period used when none is requested.
pub const DEFAULT_PERIOD: &str = "Last 2 Weeks";

/// Meta id for [`DEFAULT_PERIOD`] in the Commander table.
pub const DEFAULT_META: u32 = 115;

/// Display name for a format code.
pub fn format_name(format_id: &str) -> Option<&'static str> {
    FORMATS
        .iter()
        .find(|(id, _)| *id == format_id)
        .map(|(_, name)| *name)
}

/// Meta presets applicable to a format. The Commander table covers both
/// EDH and cEDH and doubles as the fallback for unlisted formats.
pub fn meta_presets(format_id: &str) -> &'static [(&'static str, u32)] {
    match format_id {
        "ST" => &META_ST,
        _ => &META_EDH,
    }
}

/// Resolve a period label to its meta id for a format.
pub fn meta_value(format_id: &str, period: &str) -> Option<u32> {
    meta_presets(format_id)
        .iter()
        .find(|(label, _)| *label == period)
        .map(|(_, value)| *value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_name_lookup() {
        assert_eq!(format_name("EDH"), Some("Duel Commander"));
        assert_eq!(format_name("ST"), Some("Standard"));
        assert_eq!(format_name("CHL"), Some("Canadian Highlander"));
        assert_eq!(format_name("XX"), None);
    }

    #[test]
    fn test_meta_value_per_format() {
        assert_eq!(meta_value("EDH", "Last 2 Weeks"), Some(115));
        assert_eq!(meta_value("cEDH", "Last 2 Weeks"), Some(115));
        assert_eq!(meta_value("ST", "Last 2 Weeks"), Some(50));
        assert_eq!(meta_value("EDH", "Major Events"), Some(196));
        assert_eq!(meta_value("ST", "Major Events"), None);
    }

    #[test]
    fn test_unknown_format_uses_commander_presets() {
        assert_eq!(meta_value("MO", "Last 7 Days"), Some(328));
    }

    #[test]
    fn test_default_period_resolves() {
        assert_eq!(meta_value("EDH", DEFAULT_PERIOD), Some(DEFAULT_META));
    }
}
