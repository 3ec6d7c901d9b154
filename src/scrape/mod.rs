//! MTGTop8 scraper.
//!
//! Walks format listing pages to discover events, then pulls each deck
//! page and parses it into a [`Deck`]. HTTP specifics (user agent,
//! retries, request pacing, the site's windows-1252 encoding) live here;
//! the HTML itself is handled by [`parse`].

mod parse;

pub use parse::{parse_deck_page, parse_event_page, parse_format_page};
pub use parse::{DeckPage, FormatPage};

use std::collections::HashSet;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{meta_value, ScrapeConfig, DEFAULT_META};
use crate::models::{Deck, Event};

/// User agent sent with every request.
const SCRAPER_USER_AGENT: &str = "MTGTop8Scraper/1.0";

/// Errors that can occur while scraping.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// What to scrape.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    /// Format code (EDH, ST, MO, ...)
    pub format_id: String,

    /// Meta period label, resolved via the format's preset table
    pub period: Option<String>,

    /// Raw meta value. Takes precedence over `period`.
    pub meta: Option<u32>,

    /// Keep only events whose name contains this substring
    pub store: Option<String>,

    /// Scrape exactly these events, skipping the format listing
    pub event_ids: Vec<u64>,
}

/// MTGTop8 HTTP client.
///
/// Paces requests and retries transient failures with exponential
/// backoff. The site serves windows-1252, not UTF-8.
pub struct ScrapeClient {
    client: reqwest::Client,
    base_url: String,
    delay: Duration,
    max_retries: u32,
}

impl ScrapeClient {
    /// Create a new client from scrape settings.
    pub fn new(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(SCRAPER_USER_AGENT));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            delay: Duration::from_millis(config.delay_ms),
            max_retries: config.max_retries.max(1),
        })
    }

    /// Fetch a page, decode it, and pause before the next request.
    async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        let html = self.fetch_with_retries(url).await?;
        tokio::time::sleep(self.delay).await;
        Ok(html)
    }

    async fn fetch_with_retries(&self, url: &str) -> Result<String, ScrapeError> {
        let mut attempt = 0u32;
        loop {
            match self.fetch_once(url).await {
                Ok(html) => return Ok(html),
                Err(err) if attempt + 1 < self.max_retries => {
                    warn!("Fetch failed for {} (attempt {}): {}", url, attempt + 1, err);
                    tokio::time::sleep(Duration::from_secs(1 << attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, ScrapeError> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text_with_charset("windows-1252").await?)
    }

    /// Walk the format listing and return matching events.
    ///
    /// Pagination stops when a page contributes no unseen events or no
    /// next-page link exists. The store filter applies after page
    /// bookkeeping so a fully filtered page still advances.
    pub async fn events_from_format(
        &self,
        format_id: &str,
        meta: u32,
        store_filter: Option<&str>,
    ) -> Result<Vec<Event>, ScrapeError> {
        let mut events = Vec::new();
        let mut seen: HashSet<u64> = HashSet::new();
        let mut page = 1u32;

        loop {
            let mut url = format!("{}/format?f={}&meta={}", self.base_url, format_id, meta);
            if page > 1 {
                url.push_str(&format!("&cp={}", page));
            }
            let html = self.fetch_page(&url).await?;
            let parsed = parse_format_page(&html, format_id, page + 1);

            let mut page_has_events = false;
            for event in parsed.events {
                if !seen.insert(event.event_id) {
                    continue;
                }
                page_has_events = true;
                if let Some(filter) = store_filter {
                    if !event.name.to_lowercase().contains(&filter.to_lowercase()) {
                        continue;
                    }
                }
                events.push(event);
            }

            if !page_has_events || !parsed.has_next {
                break;
            }
            page += 1;
        }

        Ok(events)
    }

    /// Fetch an event page and return its deck ids.
    pub async fn deck_ids_from_event(
        &self,
        event_id: u64,
        format_id: &str,
    ) -> Result<Vec<u64>, ScrapeError> {
        let url = format!("{}/event?e={}&f={}", self.base_url, event_id, format_id);
        let html = self.fetch_page(&url).await?;
        Ok(parse_event_page(&html, event_id))
    }

    /// Fetch and parse a single deck page.
    pub async fn deck(
        &self,
        event_id: u64,
        deck_id: u64,
        format_id: &str,
    ) -> Result<Deck, ScrapeError> {
        let url = format!(
            "{}/event?e={}&d={}&f={}",
            self.base_url, event_id, deck_id, format_id
        );
        let html = self.fetch_page(&url).await?;
        Ok(parse_deck_page(&html).into_deck(deck_id, event_id, format_id))
    }

    /// Scrape decks per `options`, reporting progress as it goes.
    ///
    /// When explicit event ids are given the format listing is skipped
    /// entirely. Deck pages sometimes omit the event name and date, in
    /// which case the listing row fills them in.
    pub async fn scrape(
        &self,
        options: &ScrapeOptions,
        mut on_progress: impl FnMut(&str),
    ) -> Result<Vec<Deck>, ScrapeError> {
        let meta = resolve_meta(options);

        let events: Vec<Event> = if options.event_ids.is_empty() {
            on_progress("Fetching events from format page...");
            let store_filter = options.store.as_deref().filter(|s| !s.is_empty());
            let events = self
                .events_from_format(&options.format_id, meta, store_filter)
                .await?;
            on_progress(&format!("Found {} events", events.len()));
            events
        } else {
            options
                .event_ids
                .iter()
                .map(|&event_id| Event::new(event_id, options.format_id.as_str()))
                .collect()
        };

        let mut decks = Vec::new();
        for (i, event) in events.iter().enumerate() {
            let label = if event.name.is_empty() {
                format!("event {}", event.event_id)
            } else {
                event.name.clone()
            };
            on_progress(&format!(
                "[{}/{}] Fetching decks from {}...",
                i + 1,
                events.len(),
                label
            ));

            let deck_ids = self
                .deck_ids_from_event(event.event_id, &options.format_id)
                .await?;
            on_progress(&format!("  Found {} decks", deck_ids.len()));

            for (j, &deck_id) in deck_ids.iter().enumerate() {
                on_progress(&format!(
                    "  Parsing deck {}/{} (id={})...",
                    j + 1,
                    deck_ids.len(),
                    deck_id
                ));
                let mut deck = self.deck(event.event_id, deck_id, &options.format_id).await?;
                if !event.name.is_empty() && deck.event_name == "Unknown" {
                    deck.event_name = event.name.clone();
                    if deck.date.is_empty() {
                        deck.date = event.date.clone();
                    }
                }
                decks.push(deck);
            }
        }

        on_progress(&format!(
            "Done. Total: {} decks from {} events.",
            decks.len(),
            events.len()
        ));
        Ok(decks)
    }
}

/// Pick the meta value: explicit override, then the period preset for
/// the format, then the site default.
fn resolve_meta(options: &ScrapeOptions) -> u32 {
    options
        .meta
        .or_else(|| {
            options
                .period
                .as_deref()
                .and_then(|period| meta_value(&options.format_id, period))
        })
        .unwrap_or(DEFAULT_META)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ScrapeClient::new(&ScrapeConfig::default()).unwrap();
        assert_eq!(client.base_url, "https://www.mtgtop8.com");
        assert_eq!(client.max_retries, 3);
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let config = ScrapeConfig {
            base_url: "http://127.0.0.1:9/".to_string(),
            ..Default::default()
        };
        let client = ScrapeClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9");
    }

    #[test]
    fn test_resolve_meta_override_wins() {
        let options = ScrapeOptions {
            format_id: "EDH".to_string(),
            period: Some("Last 2 Months".to_string()),
            meta: Some(42),
            ..Default::default()
        };
        assert_eq!(resolve_meta(&options), 42);
    }

    #[test]
    fn test_resolve_meta_from_period() {
        let options = ScrapeOptions {
            format_id: "EDH".to_string(),
            period: Some("Last 2 Months".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_meta(&options), 121);
    }

    #[test]
    fn test_resolve_meta_unknown_period_falls_back() {
        let options = ScrapeOptions {
            format_id: "EDH".to_string(),
            period: Some("Not A Real Period".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_meta(&options), DEFAULT_META);
    }

    #[test]
    fn test_resolve_meta_default() {
        let options = ScrapeOptions {
            format_id: "EDH".to_string(),
            ..Default::default()
        };
        assert_eq!(resolve_meta(&options), 115);
    }
}
