//! Land name tables used to filter manabases out of card statistics.
//!
//! Matching is on exact full names only. Deck lists on the source site
//! often collapse the manabase into a literal "Lands" line, which is why
//! that placeholder sits in the nonbasic table.

use std::collections::HashSet;

const BASIC_LAND_NAMES: &[&str] = &[
    "Plains",
    "Island",
    "Swamp",
    "Mountain",
    "Forest",
    "Snow-Covered Plains",
    "Snow-Covered Island",
    "Snow-Covered Swamp",
    "Snow-Covered Mountain",
    "Snow-Covered Forest",
    "Wastes",
];

const NONBASIC_LAND_NAMES: &[&str] = &[
    "Land",
    "Lands",
    "Command Tower",
    // Original duals
    "Tundra",
    "Underground Sea",
    "Badlands",
    "Taiga",
    "Savannah",
    "Scrubland",
    "Volcanic Island",
    "Bayou",
    "Plateau",
    "Tropical Island",
    // Fetchlands
    "Arid Mesa",
    "Marsh Flats",
    "Misty Rainforest",
    "Scalding Tarn",
    "Verdant Catacombs",
    "Flooded Strand",
    "Polluted Delta",
    "Windswept Heath",
    "Wooded Foothills",
    "Bloodstained Mire",
    // Shocklands
    "Hallowed Fountain",
    "Temple Garden",
    "Sacred Foundry",
    "Stomping Ground",
    "Breeding Pool",
    "Godless Shrine",
    "Steam Vents",
    "Overgrown Tomb",
    "Blood Crypt",
    "Watery Grave",
    // Pathways (MDFC lands)
    "Barkchannel Pathway",
    "Blightstep Pathway",
    "Boulderloft Pathway",
    "Branchloft Pathway",
    "Brightclimb Pathway",
    "Clearwater Pathway",
    "Cragcrown Pathway",
    "Darkbore Pathway",
    "Grimclimb Pathway",
    "Hengegate Pathway",
    "Ice Tunnel Pathway",
    "Lavaglide Pathway",
    "Mistgate Pathway",
    "Murkwater Pathway",
    "Needleverge Pathway",
    "Pillarverge Pathway",
    "Riverglide Pathway",
    "Searstep Pathway",
    "Shadowgrange Pathway",
    "Silvergill Pathway",
    "Skyclave Pathway",
    "Slitherbore Pathway",
    "Sundown Pass",
    "Tidechannel Pathway",
    "Timbercrown Pathway",
    "Vineglimmer Pathway",
    // Fast lands
    "Razorverge Thicket",
    "Copperline Gorge",
    "Blackcleave Cliffs",
    "Seachrome Coast",
    "Darkslick Shores",
    "Concealed Courtyard",
    "Inspiring Vantage",
    "Spirebluff Canal",
    "Botanical Sanctum",
    "Blooming Marsh",
];

/// The two land name sets card statistics filter on.
///
/// Basics are always excluded from mainboard rankings; the nonbasic set
/// only applies when a caller opts into ignoring lands, and it can be
/// swapped wholesale for a runtime-edited list.
#[derive(Debug, Clone)]
pub struct LandTables {
    basics: HashSet<String>,
    nonbasics: HashSet<String>,
}

impl Default for LandTables {
    fn default() -> Self {
        Self {
            basics: BASIC_LAND_NAMES.iter().map(|s| s.to_string()).collect(),
            nonbasics: NONBASIC_LAND_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LandTables {
    /// Default tables with the nonbasic set replaced entirely.
    pub fn with_nonbasics<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nonbasics: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// The default nonbasic list, sorted, for the settings endpoint.
    pub fn default_nonbasics_sorted() -> Vec<String> {
        let mut names: Vec<String> = NONBASIC_LAND_NAMES.iter().map(|s| s.to_string()).collect();
        names.sort();
        names
    }

    pub fn is_basic(&self, card: &str) -> bool {
        self.basics.contains(card)
    }

    /// True for any card in either table.
    pub fn is_land_name(&self, card: &str) -> bool {
        self.basics.contains(card) || self.nonbasics.contains(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basics() {
        let tables = LandTables::default();
        assert!(tables.is_basic("Plains"));
        assert!(tables.is_basic("Snow-Covered Island"));
        assert!(tables.is_basic("Wastes"));
        assert!(!tables.is_basic("Command Tower"));
        assert!(!tables.is_basic("Lightning Bolt"));
    }

    #[test]
    fn test_nonbasics_exact_match_only() {
        let tables = LandTables::default();
        assert!(tables.is_land_name("Lands"));
        assert!(tables.is_land_name("Command Tower"));
        assert!(tables.is_land_name("Scalding Tarn"));
        assert!(tables.is_land_name("Clearwater Pathway"));
        // No substring or suffix matching
        assert!(!tables.is_land_name("Scalding Tarn Expedition"));
        assert!(!tables.is_land_name("Pathway"));
    }

    #[test]
    fn test_replaced_nonbasics() {
        let tables = LandTables::with_nonbasics(["Lands", "Maze of Ith"]);
        assert!(tables.is_land_name("Maze of Ith"));
        assert!(!tables.is_land_name("Command Tower"));
        // Basics are untouched by the replacement
        assert!(tables.is_basic("Forest"));
        assert!(tables.is_land_name("Forest"));
    }

    #[test]
    fn test_default_nonbasics_sorted() {
        let names = LandTables::default_nonbasics_sorted();
        assert_eq!(names.len(), NONBASIC_LAND_NAMES.len());
        assert!(names.windows(2).all(|w| w[0] <= w[1]));
        assert!(names.contains(&"Lands".to_string()));
    }
}
