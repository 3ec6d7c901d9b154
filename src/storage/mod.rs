//! Filesystem persistence.
//!
//! All durable state lives as JSON files under one data directory:
//! - `decks.json`: the deck collection, a JSON array
//! - `player_aliases.json`: alias to canonical player name map
//! - `ignore_lands_cards.json`: the editable nonbasic land list
//! - `scryfall_cache.json`: card metadata cache
//!
//! Reports are written wherever the caller points them.

mod repository;

pub use repository::DeckRepository;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::analysis::LandTables;
use crate::models::Deck;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn decks_path(&self) -> PathBuf {
        self.data_dir.join("decks.json")
    }

    pub fn aliases_path(&self) -> PathBuf {
        self.data_dir.join("player_aliases.json")
    }

    pub fn ignored_lands_path(&self) -> PathBuf {
        self.data_dir.join("ignore_lands_cards.json")
    }

    pub fn card_cache_path(&self) -> PathBuf {
        self.data_dir.join("scryfall_cache.json")
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Read a deck collection. A missing file is an empty collection.
/// Card names are normalized on the way in, so split cards always carry
/// the canonical " // " separator.
pub fn read_decks(path: &Path) -> Result<Vec<Deck>, StorageError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)?;
    let mut decks: Vec<Deck> = serde_json::from_str(&raw)?;
    for deck in &mut decks {
        deck.normalize_card_names();
    }
    debug!("Read {} decks from {:?}", decks.len(), path);
    Ok(decks)
}

/// Write a deck collection as a pretty-printed JSON array.
pub fn write_decks(path: &Path, decks: &[Deck]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(decks)?;
    fs::write(path, json)?;
    info!("Wrote {} decks to {:?}", decks.len(), path);
    Ok(())
}

/// Write any serializable report as pretty-printed JSON.
pub fn write_report<T: Serialize>(path: &Path, report: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    info!("Wrote report to {:?}", path);
    Ok(())
}

/// Read the player alias map. A missing file means no aliases.
pub fn read_aliases(config: &StorageConfig) -> Result<HashMap<String, String>, StorageError> {
    let path = config.aliases_path();
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let raw = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Persist the player alias map.
pub fn write_aliases(
    config: &StorageConfig,
    aliases: &HashMap<String, String>,
) -> Result<(), StorageError> {
    config.ensure_dir()?;
    let json = serde_json::to_string_pretty(aliases)?;
    fs::write(config.aliases_path(), json)?;
    Ok(())
}

/// On-disk shape of the nonbasic land list.
#[derive(Debug, Serialize, Deserialize)]
struct IgnoredLandsFile {
    #[serde(default)]
    cards: Vec<String>,
}

/// Read the editable nonbasic land list. The file stores the complete
/// list; a missing file yields the built-in default.
pub fn read_ignored_lands(config: &StorageConfig) -> Result<Vec<String>, StorageError> {
    let path = config.ignored_lands_path();
    if !path.exists() {
        return Ok(LandTables::default_nonbasics_sorted());
    }
    let raw = fs::read_to_string(&path)?;
    let file: IgnoredLandsFile = serde_json::from_str(&raw)?;
    Ok(clean_card_list(file.cards))
}

/// Persist the nonbasic land list and return the cleaned copy that was
/// actually stored.
pub fn write_ignored_lands(
    config: &StorageConfig,
    cards: Vec<String>,
) -> Result<Vec<String>, StorageError> {
    config.ensure_dir()?;
    let cards = clean_card_list(cards);
    let json = serde_json::to_string_pretty(&IgnoredLandsFile {
        cards: cards.clone(),
    })?;
    fs::write(config.ignored_lands_path(), json)?;
    info!("Wrote {} ignored land cards", cards.len());
    Ok(cards)
}

fn clean_card_list(cards: Vec<String>) -> Vec<String> {
    let mut cards: Vec<String> = cards
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    cards.sort();
    cards.dedup();
    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardLine;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> StorageConfig {
        StorageConfig::new(temp_dir.path().to_path_buf())
    }

    fn sample_deck() -> Deck {
        Deck {
            deck_id: 811597,
            event_id: 80455,
            format_id: "EDH".to_string(),
            name: "Spider-man 2099".to_string(),
            player: "Jeremy Lb".to_string(),
            event_name: "CR PdLL MTGAnjou @ Angers (France)".to_string(),
            date: "15/02/26".to_string(),
            rank: crate::models::Rank::First,
            player_count: 128,
            mainboard: vec![CardLine::new(2, "Lightning Bolt")],
            sideboard: Vec::new(),
            commanders: vec!["Spider-Man 2099".to_string()],
            archetype: Some("UR Aggro".to_string()),
        }
    }

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(config.decks_path(), PathBuf::from("/data/decks.json"));
        assert_eq!(
            config.aliases_path(),
            PathBuf::from("/data/player_aliases.json")
        );
        assert_eq!(
            config.ignored_lands_path(),
            PathBuf::from("/data/ignore_lands_cards.json")
        );
        assert_eq!(
            config.card_cache_path(),
            PathBuf::from("/data/scryfall_cache.json")
        );
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_read_decks_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let decks = read_decks(&temp_dir.path().join("absent.json")).unwrap();
        assert!(decks.is_empty());
    }

    #[test]
    fn test_write_and_read_decks() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("decks.json");

        write_decks(&path, &[sample_deck()]).unwrap();
        let decks = read_decks(&path).unwrap();

        assert_eq!(decks.len(), 1);
        assert_eq!(decks[0].deck_id, 811597);
        assert_eq!(decks[0].mainboard[0].card, "Lightning Bolt");
    }

    #[test]
    fn test_read_decks_normalizes_split_names() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("decks.json");

        let mut deck = sample_deck();
        deck.mainboard = vec![CardLine::new(1, "Fire / Ice")];
        write_decks(&path, &[deck]).unwrap();

        let decks = read_decks(&path).unwrap();
        assert_eq!(decks[0].mainboard[0].card, "Fire // Ice");
    }

    #[test]
    fn test_read_decks_rejects_bad_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("decks.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(read_decks(&path), Err(StorageError::Json(_))));
    }

    #[test]
    fn test_write_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("report.json");

        write_report(&path, &serde_json::json!({"total_decks": 3})).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("total_decks"));
    }

    #[test]
    fn test_aliases_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        assert!(read_aliases(&config).unwrap().is_empty());

        let mut aliases = HashMap::new();
        aliases.insert("J. Lb".to_string(), "Jeremy Lb".to_string());
        write_aliases(&config, &aliases).unwrap();

        let read = read_aliases(&config).unwrap();
        assert_eq!(read.get("J. Lb").map(String::as_str), Some("Jeremy Lb"));
    }

    #[test]
    fn test_ignored_lands_default_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let cards = read_ignored_lands(&config).unwrap();
        assert!(cards.contains(&"Command Tower".to_string()));
        let mut sorted = cards.clone();
        sorted.sort();
        assert_eq!(cards, sorted);
    }

    #[test]
    fn test_ignored_lands_roundtrip_cleans_input() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let stored = write_ignored_lands(
            &config,
            vec![
                "  Steam Vents ".to_string(),
                "Command Tower".to_string(),
                "Steam Vents".to_string(),
                "".to_string(),
            ],
        )
        .unwrap();
        assert_eq!(stored, vec!["Command Tower", "Steam Vents"]);

        let read = read_ignored_lands(&config).unwrap();
        assert_eq!(read, stored);
    }
}
