//! Scrape job control.
//!
//! One scrape runs at a time. Starting returns 202 immediately and the
//! job reports through `/api/scrape/status`; completion swaps the scraped
//! decks into the repository.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::round1;
use crate::api::routes::auth::require_admin;
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::config::ScrapeConfig;
use crate::scrape::{ScrapeClient, ScrapeOptions};
use crate::storage::DeckRepository;

// ── Types ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScrapeState {
    pub status: ScrapeStatus,
    /// Last progress line from the scraper
    pub message: String,
    /// Estimated completion percentage
    pub pct: f64,
    pub decks_loaded: u32,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// Event ids arrive either as a CSV string or a plain list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EventIds {
    Csv(String),
    List(Vec<u64>),
}

impl EventIds {
    fn into_ids(self) -> Vec<u64> {
        match self {
            EventIds::Csv(raw) => raw
                .split(',')
                .filter_map(|part| part.trim().parse().ok())
                .collect(),
            EventIds::List(ids) => ids,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub format: Option<String>,
    pub period: Option<String>,
    pub store: Option<String>,
    pub event_ids: Option<EventIds>,
}

// ── Progress estimation ──────────────────────────────────────────

/// Derives a completion percentage from the scraper's progress lines.
/// The event counter carries the coarse position and the deck counter
/// fills in the fraction within the current event.
#[derive(Debug, Default)]
struct ProgressTracker {
    total_events: u32,
    current_event: u32,
    total_decks: u32,
    current_deck: u32,
}

impl ProgressTracker {
    fn observe(&mut self, message: &str) -> f64 {
        if let Some(caps) = Regex::new(r"^\[(\d+)/(\d+)\]").unwrap().captures(message) {
            self.current_event = caps[1].parse().unwrap_or(0);
            self.total_events = caps[2].parse().unwrap_or(0);
        } else if let Some(caps) = Regex::new(r"Found (\d+) events").unwrap().captures(message) {
            self.total_events = caps[1].parse().unwrap_or(0);
        } else if let Some(caps) = Regex::new(r"Found (\d+) decks").unwrap().captures(message) {
            self.total_decks = caps[1].parse().unwrap_or(0);
            self.current_deck = 0;
        } else if let Some(caps) = Regex::new(r"Parsing deck (\d+)/(\d+)")
            .unwrap()
            .captures(message)
        {
            self.current_deck = caps[1].parse().unwrap_or(0);
            self.total_decks = caps[2].parse().unwrap_or(0);
        }
        self.pct()
    }

    fn pct(&self) -> f64 {
        if self.total_events == 0 {
            return 0.0;
        }
        let event_pct = if self.current_event > 0 {
            (self.current_event - 1) as f64 / self.total_events as f64 * 100.0
        } else {
            0.0
        };
        let deck_pct = if self.total_decks > 0 && self.current_deck > 0 {
            self.current_deck as f64 / self.total_decks as f64
                * (100.0 / self.total_events as f64)
        } else {
            0.0
        };
        round1((event_pct + deck_pct).min(99.0))
    }
}

// ── Handlers ─────────────────────────────────────────────────────

pub async fn start_scrape(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ScrapeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;

    let options = ScrapeOptions {
        format_id: body.format.unwrap_or_else(|| "EDH".to_string()),
        period: body.period,
        meta: None,
        store: body.store,
        event_ids: body.event_ids.map(EventIds::into_ids).unwrap_or_default(),
    };

    let snapshot = {
        let mut job = state.scrape_state.lock().unwrap();
        if job.status == ScrapeStatus::Running {
            return Err(ApiError::Conflict("Scrape already running".to_string()));
        }
        *job = ScrapeState {
            status: ScrapeStatus::Running,
            message: "Starting scrape...".to_string(),
            pct: 0.0,
            decks_loaded: 0,
            error: None,
            started_at: Some(Utc::now()),
            completed_at: None,
        };
        job.clone()
    };

    let job_state = state.scrape_state.clone();
    let repository = state.repository.clone();
    let scrape_config = state.config.scrape.clone();
    tokio::spawn(async move {
        run_scrape_job(job_state, repository, scrape_config, options).await;
    });

    Ok((StatusCode::ACCEPTED, Json(snapshot)))
}

pub async fn scrape_status(State(state): State<AppState>) -> Json<ScrapeState> {
    let current = state.scrape_state.lock().unwrap().clone();
    Json(current)
}

// ── Background job ───────────────────────────────────────────────

async fn run_scrape_job(
    job: Arc<std::sync::Mutex<ScrapeState>>,
    repository: Arc<DeckRepository>,
    config: ScrapeConfig,
    options: ScrapeOptions,
) {
    let client = match ScrapeClient::new(&config) {
        Ok(client) => client,
        Err(err) => {
            warn!("Could not build scrape client: {}", err);
            let mut state = job.lock().unwrap();
            state.status = ScrapeStatus::Failed;
            state.error = Some(err.to_string());
            state.completed_at = Some(Utc::now());
            return;
        }
    };

    let mut tracker = ProgressTracker::default();
    let result = client
        .scrape(&options, |message| {
            let pct = tracker.observe(message);
            let mut state = job.lock().unwrap();
            state.message = message.to_string();
            state.pct = pct;
        })
        .await;

    match result {
        Ok(decks) => {
            let loaded = repository.replace(decks).await as u32;
            info!("Scrape finished, {} decks loaded", loaded);
            let mut state = job.lock().unwrap();
            state.status = ScrapeStatus::Completed;
            state.pct = 100.0;
            state.decks_loaded = loaded;
            state.completed_at = Some(Utc::now());
        }
        Err(err) => {
            warn!("Scrape failed: {}", err);
            let mut state = job.lock().unwrap();
            state.status = ScrapeStatus::Failed;
            state.error = Some(err.to_string());
            state.completed_at = Some(Utc::now());
        }
    }
}
