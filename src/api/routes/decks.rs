//! Deck queries, duplicates, similarity, and composition analysis.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::analysis::{
    archetype_composition, deck_composition, find_duplicate_decks, similar_decks,
    ArchetypeComposition, DeckComposition, LandTables, SimilarDeck,
};
use crate::api::state::AppState;
use crate::api::{canonical_player, normalize_search, ApiError};
use crate::models::{sortkey_value, Deck};

/// Parse a CSV of ids, dropping blanks and junk. `None` when nothing
/// usable remains, so callers can fall back to the next filter.
pub(crate) fn parse_id_csv(raw: Option<&str>) -> Option<HashSet<u64>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let ids: HashSet<u64> = raw
        .split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

fn search_needle(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(normalize_search)
}

fn rank_order(deck: &Deck) -> i64 {
    i64::from(deck.rank.sort_order())
}

fn date_value(deck: &Deck) -> i64 {
    sortkey_value(&deck.date)
}

fn cmp_ci(a: &str, b: &str, descending: bool) -> Ordering {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    if descending {
        b.cmp(&a)
    } else {
        a.cmp(&b)
    }
}

/// Deck list ordering. Date and rank sorts embed the direction in the
/// key and keep a fixed tie-break (rank within a date, newest within a
/// rank); player and name sorts flip the comparator instead.
fn sort_decks(decks: &mut [&Deck], sort: Option<&str>, order: Option<&str>) {
    let sort = match sort {
        Some(s @ ("date" | "rank" | "player" | "name")) => s,
        _ => "date",
    };
    let descending = !matches!(order, Some("asc"));

    match sort {
        "rank" => {
            if descending {
                decks.sort_by_key(|d| (-rank_order(d), -date_value(d)));
            } else {
                decks.sort_by_key(|d| (rank_order(d), -date_value(d)));
            }
        }
        "player" => decks.sort_by(|a, b| cmp_ci(&a.player, &b.player, descending)),
        "name" => decks.sort_by(|a, b| cmp_ci(&a.name, &b.name, descending)),
        _ => {
            if descending {
                decks.sort_by_key(|d| (-date_value(d), rank_order(d)));
            } else {
                decks.sort_by_key(|d| (date_value(d), rank_order(d)));
            }
        }
    }
}

// ── List ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeckListParams {
    pub event_id: Option<u64>,
    pub event_ids: Option<String>,
    pub commander: Option<String>,
    pub deck_name: Option<String>,
    pub archetype: Option<String>,
    pub player: Option<String>,
    pub card: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DeckListResponse {
    pub decks: Vec<Deck>,
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
}

pub async fn list_decks(
    State(state): State<AppState>,
    Query(params): Query<DeckListParams>,
) -> Json<DeckListResponse> {
    let snapshot = state.repository.snapshot().await;
    let aliases = state.aliases.read().await;

    let mut filtered: Vec<&Deck> = snapshot.iter().collect();

    if let Some(ids) = parse_id_csv(params.event_ids.as_deref()) {
        filtered.retain(|d| ids.contains(&d.event_id));
    } else if let Some(event_id) = params.event_id {
        filtered.retain(|d| d.event_id == event_id);
    }

    if let Some(needle) = search_needle(params.commander.as_deref()) {
        filtered.retain(|d| {
            d.commanders
                .iter()
                .any(|c| normalize_search(c).contains(&needle))
        });
    }
    if let Some(needle) = search_needle(params.deck_name.as_deref()) {
        filtered.retain(|d| normalize_search(&d.name).contains(&needle));
    }
    if let Some(needle) = search_needle(params.archetype.as_deref()) {
        filtered
            .retain(|d| normalize_search(d.archetype.as_deref().unwrap_or("")).contains(&needle));
    }
    if let Some(needle) = search_needle(params.player.as_deref()) {
        // Matches the raw scraped name or the aliased display name
        filtered.retain(|d| {
            normalize_search(&d.player).contains(&needle)
                || normalize_search(&canonical_player(&aliases, &d.player)).contains(&needle)
        });
    }
    if let Some(needle) = search_needle(params.card.as_deref()) {
        filtered.retain(|d| {
            d.commanders
                .iter()
                .any(|c| normalize_search(c).contains(&needle))
                || d.mainboard
                    .iter()
                    .any(|l| normalize_search(&l.card).contains(&needle))
                || d.sideboard
                    .iter()
                    .any(|l| normalize_search(&l.card).contains(&needle))
        });
    }

    sort_decks(&mut filtered, params.sort.as_deref(), params.order.as_deref());

    let total = filtered.len();
    let skip = params.skip.unwrap_or(0);
    let limit = params.limit.unwrap_or(50).clamp(1, 200);

    let decks: Vec<Deck> = filtered
        .into_iter()
        .skip(skip)
        .take(limit)
        .map(|d| {
            let mut deck = d.clone();
            deck.player = canonical_player(&aliases, &deck.player);
            deck
        })
        .collect();

    Json(DeckListResponse {
        decks,
        total,
        skip,
        limit,
    })
}

// ── Compare ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub ids: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub decks: Vec<Deck>,
}

pub async fn compare_decks(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> Result<Json<CompareResponse>, ApiError> {
    let raw = params.ids.unwrap_or_default();
    let parsed: Result<Vec<u64>, _> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect();
    let ids = parsed.map_err(|_| ApiError::BadRequest("Invalid deck IDs".to_string()))?;
    if !(2..=4).contains(&ids.len()) {
        return Err(ApiError::BadRequest("Provide 2 to 4 deck IDs".to_string()));
    }

    let snapshot = state.repository.snapshot().await;
    let aliases = state.aliases.read().await;

    let mut decks = Vec::with_capacity(ids.len());
    for id in ids {
        let deck = snapshot
            .iter()
            .find(|d| d.deck_id == id)
            .ok_or_else(|| ApiError::NotFound(format!("Deck {} not found", id)))?;
        let mut deck = deck.clone();
        deck.player = canonical_player(&aliases, &deck.player);
        decks.push(deck);
    }
    Ok(Json(CompareResponse { decks }))
}

// ── Duplicates ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DuplicatesParams {
    pub event_ids: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DuplicateEntry {
    pub deck_id: u64,
    pub name: String,
    pub player: String,
    pub event_name: String,
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct DuplicateGroup {
    pub primary_deck_id: u64,
    pub primary_name: String,
    pub primary_player: String,
    pub primary_event: String,
    pub primary_date: String,
    pub duplicate_deck_ids: Vec<u64>,
    pub duplicates: Vec<DuplicateEntry>,
}

#[derive(Debug, Serialize)]
pub struct DuplicatesResponse {
    pub duplicates: Vec<DuplicateGroup>,
}

pub async fn list_duplicates(
    State(state): State<AppState>,
    Query(params): Query<DuplicatesParams>,
) -> Json<DuplicatesResponse> {
    let snapshot = state.repository.snapshot().await;

    let filtered: Vec<Deck>;
    let pool: &[Deck] = if let Some(ids) = parse_id_csv(params.event_ids.as_deref()) {
        filtered = snapshot
            .iter()
            .filter(|d| ids.contains(&d.event_id))
            .cloned()
            .collect();
        &filtered
    } else {
        &snapshot
    };

    let by_id: HashMap<u64, &Deck> = snapshot.iter().map(|d| (d.deck_id, d)).collect();

    let mut groups = Vec::new();
    for (primary_id, dup_ids) in find_duplicate_decks(pool) {
        let Some(primary) = by_id.get(&primary_id) else {
            continue;
        };
        let duplicates: Vec<DuplicateEntry> = dup_ids
            .iter()
            .filter_map(|id| by_id.get(id))
            .map(|d| DuplicateEntry {
                deck_id: d.deck_id,
                name: d.name.clone(),
                player: d.player.clone(),
                event_name: d.event_name.clone(),
                date: d.date.clone(),
            })
            .collect();
        groups.push(DuplicateGroup {
            primary_deck_id: primary_id,
            primary_name: primary.name.clone(),
            primary_player: primary.player.clone(),
            primary_event: primary.event_name.clone(),
            primary_date: primary.date.clone(),
            duplicate_deck_ids: dup_ids,
            duplicates,
        });
    }
    Json(DuplicatesResponse { duplicates: groups })
}

// ── Detail ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DuplicateInfo {
    pub is_duplicate: bool,
    pub duplicate_of: Option<u64>,
    pub same_mainboard_ids: Vec<u64>,
}

#[derive(Debug, Serialize)]
pub struct DeckDetail {
    #[serde(flatten)]
    pub deck: Deck,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_info: Option<DuplicateInfo>,
}

pub async fn get_deck(
    State(state): State<AppState>,
    Path(deck_id): Path<u64>,
) -> Result<Json<DeckDetail>, ApiError> {
    let snapshot = state.repository.snapshot().await;
    let aliases = state.aliases.read().await;

    let deck = snapshot
        .iter()
        .find(|d| d.deck_id == deck_id)
        .ok_or_else(|| ApiError::NotFound("Deck not found".to_string()))?;

    // Duplicate membership is judged against the whole pool, whatever
    // the caller was browsing
    let groups = find_duplicate_decks(&snapshot);
    let duplicate_info = if let Some(dups) = groups.get(&deck_id) {
        Some(DuplicateInfo {
            is_duplicate: false,
            duplicate_of: None,
            same_mainboard_ids: dups.clone(),
        })
    } else {
        groups
            .iter()
            .find(|(_, dups)| dups.contains(&deck_id))
            .map(|(primary, dups)| DuplicateInfo {
                is_duplicate: true,
                duplicate_of: Some(*primary),
                same_mainboard_ids: std::iter::once(*primary)
                    .chain(dups.iter().copied().filter(|id| *id != deck_id))
                    .collect(),
            })
    };

    let mut deck = deck.clone();
    deck.player = canonical_player(&aliases, &deck.player);
    Ok(Json(DeckDetail {
        deck,
        duplicate_info,
    }))
}

// ── Similar ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SimilarParams {
    pub limit: Option<usize>,
    pub event_ids: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SimilarResponse {
    pub similar: Vec<SimilarDeck>,
}

pub async fn get_similar(
    State(state): State<AppState>,
    Path(deck_id): Path<u64>,
    Query(params): Query<SimilarParams>,
) -> Result<Json<SimilarResponse>, ApiError> {
    let snapshot = state.repository.snapshot().await;
    let deck = snapshot
        .iter()
        .find(|d| d.deck_id == deck_id)
        .ok_or_else(|| ApiError::NotFound("Deck not found".to_string()))?;
    let limit = params.limit.unwrap_or(10).clamp(1, 20);

    let filtered: Vec<Deck>;
    let pool: &[Deck] = if let Some(ids) = parse_id_csv(params.event_ids.as_deref()) {
        filtered = snapshot
            .iter()
            .filter(|d| ids.contains(&d.event_id))
            .cloned()
            .collect();
        &filtered
    } else {
        &snapshot
    };

    Ok(Json(SimilarResponse {
        similar: similar_decks(deck, pool, limit),
    }))
}

// ── Composition analysis ─────────────────────────────────────────

fn distinct_names<'a, I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a crate::models::CardLine>,
{
    let mut seen = HashSet::new();
    lines
        .into_iter()
        .map(|l| l.card.clone())
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

async fn runtime_lands(state: &AppState) -> LandTables {
    let ignored = state.ignored_lands.read().await;
    LandTables::with_nonbasics(ignored.iter().cloned())
}

pub async fn get_deck_analysis(
    State(state): State<AppState>,
    Path(deck_id): Path<u64>,
) -> Result<Json<DeckComposition>, ApiError> {
    let snapshot = state.repository.snapshot().await;
    let deck = snapshot
        .iter()
        .find(|d| d.deck_id == deck_id)
        .ok_or_else(|| ApiError::NotFound("Deck not found".to_string()))?;

    let names = distinct_names(deck.mainboard.iter().chain(deck.sideboard.iter()));
    let catalog = {
        let mut cards = state.cards.lock().await;
        cards.catalog(&names).await
    };
    let lands = runtime_lands(&state).await;

    Ok(Json(deck_composition(deck, &catalog, &lands)))
}

pub async fn get_archetype_analysis(
    State(state): State<AppState>,
    Path(archetype): Path<String>,
) -> Result<Json<ArchetypeComposition>, ApiError> {
    let snapshot = state.repository.snapshot().await;
    let want = normalize_search(archetype.trim());
    let pool: Vec<Deck> = snapshot
        .iter()
        .filter(|d| normalize_search(&d.archetype_label()) == want)
        .cloned()
        .collect();
    if pool.is_empty() {
        return Err(ApiError::NotFound("Archetype not found".to_string()));
    }

    let names = distinct_names(pool.iter().flat_map(|d| d.mainboard.iter()));
    let catalog = {
        let mut cards = state.cards.lock().await;
        cards.catalog(&names).await
    };
    let lands = runtime_lands(&state).await;

    Ok(Json(archetype_composition(&pool, &catalog, &lands)))
}
