//! Scryfall card metadata lookup with a disk cache.
//!
//! Metadata is fetched through the collection endpoint in batches and
//! cached as one JSON file, including negative entries for names the API
//! does not know. The cache is disposable; deleting it only costs
//! re-fetching.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{CardCatalog, CardDetails};
use crate::storage::StorageConfig;

const SCRYFALL_COLLECTION_URL: &str = "https://api.scryfall.com/cards/collection";

/// Scryfall caps collection requests at 75 identifiers.
const CHUNK_SIZE: usize = 75;

/// Courtesy pause between collection requests.
const CHUNK_DELAY: Duration = Duration::from_millis(100);

/// Errors that can occur during card lookup.
#[derive(Debug, Error)]
pub enum CardLookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One disk cache entry: resolved details or a negative marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum CacheEntry {
    NotFound { error: String },
    Card(CardDetails),
}

#[derive(Debug, Serialize)]
struct CollectionRequest<'a> {
    identifiers: Vec<Identifier<'a>>,
}

#[derive(Debug, Serialize)]
struct Identifier<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    #[serde(default)]
    data: Vec<serde_json::Value>,
    #[serde(default)]
    not_found: Vec<serde_json::Value>,
}

/// Scryfall lookup client backed by the shared disk cache.
pub struct CardLookup {
    client: Client,
    base_url: String,
    cache_path: PathBuf,
    cache: HashMap<String, CacheEntry>,
}

impl CardLookup {
    pub fn new(storage: &StorageConfig) -> Result<Self, CardLookupError> {
        Self::with_base_url(storage, SCRYFALL_COLLECTION_URL)
    }

    /// Same as [`CardLookup::new`] with the collection endpoint
    /// overridden, for tests.
    pub fn with_base_url(
        storage: &StorageConfig,
        base_url: impl Into<String>,
    ) -> Result<Self, CardLookupError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        let cache_path = storage.card_cache_path();
        let cache = load_cache(&cache_path)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            cache_path,
            cache,
        })
    }

    /// Number of cached entries, negatives included.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Resolve metadata for the given names. Cached entries are served
    /// directly; the rest are fetched in batches and cached, with
    /// unresolvable names remembered so they are not re-requested.
    /// Names that stay unresolved are absent from the result.
    pub async fn lookup(&mut self, names: &[String]) -> HashMap<String, CardDetails> {
        let mut seen = HashSet::new();
        let missing: Vec<String> = names
            .iter()
            .filter(|n| !self.cache.contains_key(*n) && seen.insert(n.as_str()))
            .cloned()
            .collect();

        if !missing.is_empty() {
            self.fetch_missing(&missing).await;
            if let Err(e) = self.save_cache() {
                warn!("Failed to persist card cache: {}", e);
            }
        }

        let mut out = HashMap::new();
        for name in names {
            if let Some(CacheEntry::Card(details)) = self.cache.get(name) {
                out.insert(name.clone(), details.clone());
            }
        }
        out
    }

    /// Resolve names into a catalog for composition analysis.
    pub async fn catalog(&mut self, names: &[String]) -> CardCatalog {
        CardCatalog::from_map(self.lookup(names).await)
    }

    async fn fetch_missing(&mut self, names: &[String]) {
        for (i, chunk) in names.chunks(CHUNK_SIZE).enumerate() {
            if i > 0 {
                tokio::time::sleep(CHUNK_DELAY).await;
            }
            if let Err(e) = self.fetch_chunk(chunk).await {
                // Leave the chunk uncached so a later run can retry
                warn!("Scryfall collection request failed: {}", e);
            }
        }
    }

    async fn fetch_chunk(&mut self, requested: &[String]) -> Result<(), CardLookupError> {
        let request = CollectionRequest {
            identifiers: requested
                .iter()
                .map(|n| Identifier {
                    name: front_face(n),
                })
                .collect(),
        };

        debug!("Requesting {} cards from Scryfall", request.identifiers.len());
        let response = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        let body: CollectionResponse = response.json().await?;

        // Requested names grouped by lowercased front face, so responses
        // match back case-insensitively.
        let mut by_front: HashMap<String, Vec<&String>> = HashMap::new();
        for name in requested {
            by_front
                .entry(front_face(name).to_lowercase())
                .or_default()
                .push(name);
        }

        for value in body.data {
            let Some(details) = card_from_value(value) else {
                continue;
            };
            if let Some(requested_names) = by_front.get(&front_face(&details.name).to_lowercase()) {
                for name in requested_names {
                    self.cache
                        .insert((*name).clone(), CacheEntry::Card(details.clone()));
                }
            }
            // Canonical name too, so later lookups under it are hits
            self.cache
                .entry(details.name.clone())
                .or_insert_with(|| CacheEntry::Card(details.clone()));
        }

        for ident in body.not_found {
            let Some(front) = ident.get("name").and_then(|v| v.as_str()) else {
                continue;
            };
            if let Some(requested_names) = by_front.get(&front.to_lowercase()) {
                for name in requested_names {
                    self.cache.insert(
                        (*name).clone(),
                        CacheEntry::NotFound {
                            error: "not_found".to_string(),
                        },
                    );
                }
            }
        }

        Ok(())
    }

    fn save_cache(&self) -> Result<(), CardLookupError> {
        if let Some(parent) = self.cache_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.cache_path, serde_json::to_string(&self.cache)?)?;
        Ok(())
    }
}

fn load_cache(path: &Path) -> Result<HashMap<String, CacheEntry>, CardLookupError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let raw = std::fs::read_to_string(path)?;
    match serde_json::from_str(&raw) {
        Ok(cache) => Ok(cache),
        Err(e) => {
            warn!("Discarding unreadable card cache: {}", e);
            Ok(HashMap::new())
        }
    }
}

/// Scryfall identifiers want the front face of split and double-faced
/// names.
fn front_face(name: &str) -> &str {
    name.split(" // ").next().unwrap_or(name)
}

/// Project one Scryfall card object. Cards with no image at all are not
/// cached; double-faced cards borrow the front face image.
fn card_from_value(mut value: serde_json::Value) -> Option<CardDetails> {
    let obj = value.as_object_mut()?;
    if !obj.contains_key("image_uris") {
        let face_images = obj
            .get("card_faces")
            .and_then(|faces| faces.get(0))
            .and_then(|face| face.get("image_uris"))
            .cloned()?;
        obj.insert("image_uris".to_string(), face_images);
    }
    serde_json::from_value(value).ok()
}
