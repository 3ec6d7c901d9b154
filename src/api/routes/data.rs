//! Bulk data in and out: load decks from JSON, export the loaded set.

use std::path::PathBuf;

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::routes::auth::require_admin;
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::Deck;
use crate::storage;

#[derive(Debug, Deserialize)]
pub struct LoadBody {
    pub decks: Option<Vec<Deck>>,
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub loaded: usize,
    pub message: String,
}

/// Replace the in-memory deck set from an inline array or a JSON file.
/// Nothing is written back to disk; `path` resolves against the data
/// dir unless absolute.
pub async fn load_decks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoadBody>,
) -> Result<Json<LoadResponse>, ApiError> {
    require_admin(&state, &headers)?;

    let decks = if let Some(mut decks) = body.decks {
        for deck in &mut decks {
            deck.normalize_card_names();
        }
        decks
    } else if let Some(path) = body.path {
        let candidate = PathBuf::from(&path);
        let resolved = if candidate.is_absolute() {
            candidate
        } else {
            state.storage.data_dir.join(candidate)
        };
        if !resolved.exists() {
            return Err(ApiError::NotFound(format!("File not found: {}", path)));
        }
        storage::read_decks(&resolved).map_err(|e| ApiError::Internal(e.to_string()))?
    } else {
        return Err(ApiError::BadRequest(
            "Provide 'decks' array or 'path'".to_string(),
        ));
    };

    let loaded = state.repository.replace(decks).await;
    info!(loaded, "deck set replaced via /api/load");
    Ok(Json(LoadResponse {
        loaded,
        message: format!("Loaded {} decks", loaded),
    }))
}

/// The loaded decks as a pretty-printed JSON download.
pub async fn export_decks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;

    let snapshot = state.repository.snapshot().await;
    if snapshot.is_empty() {
        return Err(ApiError::NotFound(
            "No data to export. Scrape or load data first.".to_string(),
        ));
    }
    let json =
        serde_json::to_string_pretty(&*snapshot).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"decks.json\"",
            ),
        ],
        json,
    ))
}
