//! REST API endpoints.
//!
//! Axum-based HTTP API over the loaded deck pool: deck queries, metagame
//! reports, player statistics, admin data management, and scrape job
//! control.

mod state;

pub mod routes;

pub use state::AppState;

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("Unknown API route".to_string())
}

/// Assemble the full application router.
///
/// All endpoints live under `/api`. When `{data_dir}/static/index.html`
/// exists the rest of the path space serves the bundled SPA, with unknown
/// files falling back to the index so client-side routing works.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/me", get(routes::auth::me))
        .route("/api/cards/lookup", post(routes::cards::lookup_cards))
        .route("/api/decks", get(routes::decks::list_decks))
        .route("/api/decks/compare", get(routes::decks::compare_decks))
        .route("/api/decks/duplicates", get(routes::decks::list_duplicates))
        .route("/api/decks/:deck_id", get(routes::decks::get_deck))
        .route("/api/decks/:deck_id/similar", get(routes::decks::get_similar))
        .route(
            "/api/decks/:deck_id/analysis",
            get(routes::decks::get_deck_analysis),
        )
        .route(
            "/api/archetypes/:archetype/analysis",
            get(routes::decks::get_archetype_analysis),
        )
        .route("/api/events", get(routes::events::list_events))
        .route("/api/date-range", get(routes::events::date_range))
        .route("/api/format-info", get(routes::events::format_info))
        .route("/api/metagame", get(routes::metagame::get_metagame))
        .route("/api/analyze", post(routes::metagame::trigger_analysis))
        .route(
            "/api/settings/ignore-lands-cards",
            get(routes::settings::get_ignored_lands).put(routes::settings::put_ignored_lands),
        )
        .route(
            "/api/player-aliases",
            get(routes::players::list_aliases).post(routes::players::add_alias),
        )
        .route(
            "/api/player-aliases/:alias",
            delete(routes::players::delete_alias),
        )
        .route("/api/players", get(routes::players::list_players))
        .route("/api/players/similar", get(routes::players::similar_players))
        .route("/api/players/:name", get(routes::players::get_player))
        .route("/api/load", post(routes::data::load_decks))
        .route("/api/export", get(routes::data::export_decks))
        .route("/api/scrape", post(routes::scrape::start_scrape))
        .route("/api/scrape/status", get(routes::scrape::scrape_status))
        .route("/api/*rest", any(api_not_found));

    let static_dir = state.config.data_dir.join("static");
    if static_dir.join("index.html").is_file() {
        let spa = ServeDir::new(&static_dir)
            .not_found_service(ServeFile::new(static_dir.join("index.html")));
        router = router.fallback_service(spa);
    }

    let cors = cors_layer(&state.config.server.allowed_origins);
    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Permissive CORS unless the config lists explicit origins.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Lowercase with common Latin accents folded to their base letter, for
/// accent-insensitive substring matching on names.
pub(crate) fn normalize_search(value: &str) -> String {
    value.to_lowercase().chars().map(fold_accent).collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' | 'ą' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'ī' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ō' | 'ő' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'ñ' | 'ń' | 'ň' => 'n',
        'ç' | 'ć' | 'č' => 'c',
        'ś' | 'š' => 's',
        'ź' | 'ż' | 'ž' => 'z',
        'ř' => 'r',
        'ď' => 'd',
        'ť' => 't',
        _ => c,
    }
}

/// Display name for a player: trimmed, blank mapped to `"(unknown)"`,
/// then resolved through the alias table.
pub(crate) fn canonical_player(
    aliases: &std::collections::HashMap<String, String>,
    name: &str,
) -> String {
    let name = name.trim();
    if name.is_empty() {
        return "(unknown)".to_string();
    }
    aliases.get(name).cloned().unwrap_or_else(|| name.to_string())
}
