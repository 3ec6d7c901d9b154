use std::collections::HashMap;
use std::sync::Arc;

use crate::api::routes::auth::AuthKeys;
use crate::api::routes::scrape::ScrapeState;
use crate::cards::CardLookup;
use crate::config::AppConfig;
use crate::storage::{DeckRepository, StorageConfig};

/// Shared state handed to every handler.
///
/// The scrape job state sits behind a blocking mutex because the scraper
/// reports progress through a synchronous callback; every critical
/// section is a handful of field writes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: Arc<StorageConfig>,
    pub repository: Arc<DeckRepository>,
    pub aliases: Arc<tokio::sync::RwLock<HashMap<String, String>>>,
    pub ignored_lands: Arc<tokio::sync::RwLock<Vec<String>>>,
    pub cards: Arc<tokio::sync::Mutex<CardLookup>>,
    pub auth: Arc<AuthKeys>,
    pub scrape_state: Arc<std::sync::Mutex<ScrapeState>>,
}
