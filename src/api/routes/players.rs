//! Player leaderboard, name search, and alias management.

use std::collections::{HashMap, HashSet};

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::analysis::{player_leaderboard, PlacementWeights, PlayerStat};
use crate::api::routes::auth::require_admin;
use crate::api::state::AppState;
use crate::api::{canonical_player, normalize_search, ApiError};
use crate::models::{date_in_range, sortkey_value, Deck, Rank};
use crate::storage;

// ── Leaderboard ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PlayersParams {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlayersResponse {
    pub players: Vec<PlayerStat>,
}

pub async fn list_players(
    State(state): State<AppState>,
    Query(params): Query<PlayersParams>,
) -> Json<PlayersResponse> {
    let snapshot = state.repository.snapshot().await;
    let aliases = state.aliases.read().await;

    let filtered: Vec<Deck>;
    let pool: &[Deck] = if params.date_from.is_some() || params.date_to.is_some() {
        filtered = snapshot
            .iter()
            .filter(|d| {
                date_in_range(&d.date, params.date_from.as_deref(), params.date_to.as_deref())
            })
            .cloned()
            .collect();
        &filtered
    } else {
        &snapshot
    };

    let weights = PlacementWeights::default();
    let players = player_leaderboard(pool, &weights, |name| canonical_player(&aliases, name));
    Json(PlayersResponse { players })
}

// ── Name search ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SimilarPlayersParams {
    pub name: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SimilarPlayersResponse {
    pub similar: Vec<String>,
}

/// Match quality between two normalized names; lower is better. Exact
/// beats containment beats word overlap; disjoint names are out.
fn name_score(query: &str, candidate: &str) -> Option<i32> {
    if candidate == query {
        return Some(0);
    }
    if candidate.contains(query) || query.contains(candidate) {
        return Some(1);
    }
    let query_words: HashSet<&str> = query.split_whitespace().collect();
    let shared = candidate
        .split_whitespace()
        .collect::<HashSet<_>>()
        .intersection(&query_words)
        .count();
    if shared > 0 {
        Some(10 - shared as i32)
    } else {
        None
    }
}

pub async fn similar_players(
    State(state): State<AppState>,
    Query(params): Query<SimilarPlayersParams>,
) -> Result<Json<SimilarPlayersResponse>, ApiError> {
    let name = params
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("name query parameter required".to_string()))?;
    let limit = params.limit.unwrap_or(10).clamp(1, 50);
    let query = normalize_search(name);

    let snapshot = state.repository.snapshot().await;
    let names: HashSet<&str> = snapshot
        .iter()
        .map(|d| d.player.trim())
        .filter(|p| !p.is_empty())
        .collect();

    let mut scored: Vec<(i32, String)> = names
        .into_iter()
        .filter_map(|candidate| {
            name_score(&query, &normalize_search(candidate)).map(|s| (s, candidate.to_string()))
        })
        .collect();
    scored.sort();

    Ok(Json(SimilarPlayersResponse {
        similar: scored.into_iter().take(limit).map(|(_, n)| n).collect(),
    }))
}

// ── Player detail ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PlayerDeckRow {
    pub deck_id: u64,
    pub name: String,
    pub event_name: String,
    pub date: String,
    pub rank: Rank,
}

#[derive(Debug, Serialize)]
pub struct PlayerDetail {
    pub player: String,
    pub wins: u32,
    pub top2: u32,
    pub top4: u32,
    pub top8: u32,
    pub points: f64,
    pub deck_count: u32,
    pub decks: Vec<PlayerDeckRow>,
}

pub async fn get_player(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PlayerDetail>, ApiError> {
    let snapshot = state.repository.snapshot().await;
    let aliases = state.aliases.read().await;

    let canonical = canonical_player(&aliases, name.trim());
    let owned: Vec<Deck> = snapshot
        .iter()
        .filter(|d| canonical_player(&aliases, &d.player) == canonical)
        .cloned()
        .collect();
    if owned.is_empty() {
        return Err(ApiError::NotFound("Player not found".to_string()));
    }

    let weights = PlacementWeights::default();
    let stat = player_leaderboard(&owned, &weights, |n| canonical_player(&aliases, n))
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound("Player not found".to_string()))?;

    let mut rows: Vec<&Deck> = owned.iter().collect();
    rows.sort_by_key(|d| (-sortkey_value(&d.date), d.rank.sort_order()));
    let decks = rows
        .into_iter()
        .map(|d| PlayerDeckRow {
            deck_id: d.deck_id,
            name: d.name.clone(),
            event_name: d.event_name.clone(),
            date: d.date.clone(),
            rank: d.rank,
        })
        .collect();

    Ok(Json(PlayerDetail {
        player: stat.player,
        wins: stat.wins,
        top2: stat.top2,
        top4: stat.top4,
        top8: stat.top8,
        points: stat.points,
        deck_count: stat.deck_count,
        decks,
    }))
}

// ── Aliases ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AliasesResponse {
    pub aliases: HashMap<String, String>,
}

pub async fn list_aliases(State(state): State<AppState>) -> Json<AliasesResponse> {
    let aliases = state.aliases.read().await;
    Json(AliasesResponse {
        aliases: aliases.clone(),
    })
}

#[derive(Debug, Deserialize)]
pub struct AliasBody {
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub canonical: String,
}

pub async fn add_alias(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AliasBody>,
) -> Result<Json<AliasesResponse>, ApiError> {
    require_admin(&state, &headers)?;
    let alias = body.alias.trim();
    let canonical = body.canonical.trim();
    if alias.is_empty() || canonical.is_empty() {
        return Err(ApiError::BadRequest(
            "alias and canonical required".to_string(),
        ));
    }

    let mut aliases = state.aliases.write().await;
    aliases.insert(alias.to_string(), canonical.to_string());
    storage::write_aliases(&state.storage, &aliases)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(AliasesResponse {
        aliases: aliases.clone(),
    }))
}

pub async fn delete_alias(
    State(state): State<AppState>,
    Path(alias): Path<String>,
    headers: HeaderMap,
) -> Result<Json<AliasesResponse>, ApiError> {
    require_admin(&state, &headers)?;

    let mut aliases = state.aliases.write().await;
    aliases.remove(alias.trim());
    storage::write_aliases(&state.storage, &aliases)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(AliasesResponse {
        aliases: aliases.clone(),
    }))
}
