//! In-memory deck repository shared by the API handlers.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::analysis::MetagameReport;
use crate::models::Deck;

/// Shared deck collection plus a cache for the default report.
///
/// Handlers take cheap snapshots of the collection; loads replace it
/// wholesale and drop the cached report.
#[derive(Debug, Default)]
pub struct DeckRepository {
    decks: RwLock<Arc<Vec<Deck>>>,
    report: RwLock<Option<Arc<MetagameReport>>>,
}

impl DeckRepository {
    pub fn new(decks: Vec<Deck>) -> Self {
        Self {
            decks: RwLock::new(Arc::new(decks)),
            report: RwLock::new(None),
        }
    }

    /// Handle to the current collection. Cloning the Arc, not the decks.
    pub async fn snapshot(&self) -> Arc<Vec<Deck>> {
        self.decks.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.decks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.decks.read().await.is_empty()
    }

    /// Replace the whole collection and drop the cached report.
    pub async fn replace(&self, decks: Vec<Deck>) -> usize {
        let count = decks.len();
        *self.decks.write().await = Arc::new(decks);
        self.invalidate().await;
        debug!("Repository replaced with {} decks", count);
        count
    }

    /// The cached default report, when one is stored.
    pub async fn cached_report(&self) -> Option<Arc<MetagameReport>> {
        self.report.read().await.clone()
    }

    /// Cache the default report for reuse.
    pub async fn store_report(&self, report: Arc<MetagameReport>) {
        *self.report.write().await = Some(report);
    }

    /// Drop the cached report so the next request recomputes it.
    pub async fn invalidate(&self) {
        *self.report.write().await = None;
    }
}
