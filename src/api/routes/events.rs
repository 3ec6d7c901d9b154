//! Event listing and dataset-wide date and format summaries.

use std::collections::HashSet;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::config::format_name;
use crate::models::sortkey_value;

#[derive(Debug, Serialize)]
pub struct EventRow {
    pub event_id: u64,
    pub event_name: String,
    pub date: String,
    pub format_id: String,
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub events: Vec<EventRow>,
}

/// Events represented in the loaded data, first-seen order. A row per
/// distinct (id, name) pair; the site occasionally reuses an id.
pub async fn list_events(State(state): State<AppState>) -> Json<EventListResponse> {
    let snapshot = state.repository.snapshot().await;

    let mut seen = HashSet::new();
    let mut events = Vec::new();
    for deck in snapshot.iter() {
        if seen.insert((deck.event_id, deck.event_name.as_str())) {
            events.push(EventRow {
                event_id: deck.event_id,
                event_name: deck.event_name.clone(),
                date: deck.date.clone(),
                format_id: deck.format_id.clone(),
            });
        }
    }
    Json(EventListResponse { events })
}

#[derive(Debug, Serialize)]
pub struct DateRangeResponse {
    pub min_date: Option<String>,
    pub max_date: Option<String>,
    pub last_event_date: Option<String>,
}

/// Oldest and newest event dates across the loaded decks. Decks whose
/// date does not parse are left out; all fields are null when nothing
/// parses.
pub async fn date_range(State(state): State<AppState>) -> Json<DateRangeResponse> {
    let snapshot = state.repository.snapshot().await;

    let mut min: Option<(i64, &str)> = None;
    let mut max: Option<(i64, &str)> = None;
    for deck in snapshot.iter() {
        let key = sortkey_value(&deck.date);
        if key == 0 {
            continue;
        }
        if min.map_or(true, |(k, _)| key < k) {
            min = Some((key, &deck.date));
        }
        if max.map_or(true, |(k, _)| key > k) {
            max = Some((key, &deck.date));
        }
    }

    let max_date = max.map(|(_, d)| d.to_string());
    Json(DateRangeResponse {
        min_date: min.map(|(_, d)| d.to_string()),
        last_event_date: max_date.clone(),
        max_date,
    })
}

#[derive(Debug, Serialize)]
pub struct FormatInfoResponse {
    pub format_id: Option<String>,
    pub format_name: Option<String>,
}

/// The format of the loaded data: the single format's code and display
/// name, a "Multiple Formats" marker for mixed data, nulls when empty.
pub async fn format_info(State(state): State<AppState>) -> Json<FormatInfoResponse> {
    let snapshot = state.repository.snapshot().await;

    let ids: HashSet<&str> = snapshot.iter().map(|d| d.format_id.as_str()).collect();
    let response = match ids.len() {
        0 => FormatInfoResponse {
            format_id: None,
            format_name: None,
        },
        1 => {
            let id = ids.into_iter().next().unwrap_or_default();
            FormatInfoResponse {
                format_id: Some(id.to_string()),
                format_name: Some(format_name(id).unwrap_or(id).to_string()),
            }
        }
        _ => FormatInfoResponse {
            format_id: None,
            format_name: Some("Multiple Formats".to_string()),
        },
    };
    Json(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::LandTables;
    use crate::api::build_router;
    use crate::api::routes::auth::AuthKeys;
    use crate::api::routes::scrape::ScrapeState;
    use crate::cards::CardLookup;
    use crate::config::AppConfig;
    use crate::models::Deck;
    use crate::storage::{DeckRepository, StorageConfig};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn deck(id: u64, event_id: u64, event_name: &str, date: &str, format_id: &str) -> Deck {
        serde_json::from_value(json!({
            "deck_id": id, "event_id": event_id, "format_id": format_id,
            "name": format!("deck {id}"), "player": "p",
            "event_name": event_name, "date": date
        }))
        .unwrap()
    }

    fn setup_state(dir: &std::path::Path, decks: Vec<Deck>) -> AppState {
        let storage = StorageConfig::new(dir.to_path_buf());
        let cards =
            CardLookup::with_base_url(&storage, "http://127.0.0.1:1/cards/collection").unwrap();
        AppState {
            config: Arc::new(AppConfig {
                data_dir: dir.to_path_buf(),
                ..AppConfig::default()
            }),
            storage: Arc::new(storage),
            repository: Arc::new(DeckRepository::new(decks)),
            aliases: Arc::new(tokio::sync::RwLock::new(std::collections::HashMap::new())),
            ignored_lands: Arc::new(tokio::sync::RwLock::new(
                LandTables::default_nonbasics_sorted(),
            )),
            cards: Arc::new(tokio::sync::Mutex::new(cards)),
            auth: Arc::new(AuthKeys {
                password: Some("hunter2".to_string()),
                secret: "test-secret".to_string(),
            }),
            scrape_state: Arc::new(std::sync::Mutex::new(ScrapeState::default())),
        }
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_list_events_dedupes_in_first_seen_order() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(setup_state(
            dir.path(),
            vec![
                deck(1, 80455, "Angers", "15/02/26", "EDH"),
                deck(2, 80455, "Angers", "15/02/26", "EDH"),
                deck(3, 80460, "Madrid", "01/03/26", "EDH"),
            ],
        ));

        let (status, json) = get_json(app, "/api/events").await;
        assert_eq!(status, StatusCode::OK);
        let events = json["events"].as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event_id"], 80455);
        assert_eq!(events[0]["event_name"], "Angers");
        assert_eq!(events[0]["date"], "15/02/26");
        assert_eq!(events[1]["event_id"], 80460);
    }

    #[tokio::test]
    async fn test_list_events_same_id_different_name_kept() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(setup_state(
            dir.path(),
            vec![
                deck(1, 80455, "Angers", "15/02/26", "EDH"),
                deck(2, 80455, "Angers (side event)", "15/02/26", "EDH"),
            ],
        ));

        let (_, json) = get_json(app, "/api/events").await;
        assert_eq!(json["events"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_date_range_skips_unparseable_dates() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(setup_state(
            dir.path(),
            vec![
                deck(1, 1, "a", "15/02/26", "EDH"),
                deck(2, 2, "b", "01/03/26", "EDH"),
                deck(3, 3, "c", "", "EDH"),
                deck(4, 4, "d", "someday", "EDH"),
            ],
        ));

        let (status, json) = get_json(app, "/api/date-range").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["min_date"], "15/02/26");
        assert_eq!(json["max_date"], "01/03/26");
        assert_eq!(json["last_event_date"], "01/03/26");
    }

    #[tokio::test]
    async fn test_date_range_empty_data() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(setup_state(dir.path(), Vec::new()));

        let (_, json) = get_json(app, "/api/date-range").await;
        assert!(json["min_date"].is_null());
        assert!(json["max_date"].is_null());
        assert!(json["last_event_date"].is_null());
    }

    #[tokio::test]
    async fn test_format_info_single_format() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(setup_state(
            dir.path(),
            vec![
                deck(1, 1, "a", "15/02/26", "EDH"),
                deck(2, 2, "b", "16/02/26", "EDH"),
            ],
        ));

        let (_, json) = get_json(app, "/api/format-info").await;
        assert_eq!(json["format_id"], "EDH");
        assert_eq!(json["format_name"], "Duel Commander");
    }

    #[tokio::test]
    async fn test_format_info_unknown_code_echoes_code() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(setup_state(
            dir.path(),
            vec![deck(1, 1, "a", "15/02/26", "XYZ")],
        ));

        let (_, json) = get_json(app, "/api/format-info").await;
        assert_eq!(json["format_id"], "XYZ");
        assert_eq!(json["format_name"], "XYZ");
    }

    #[tokio::test]
    async fn test_format_info_mixed_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(setup_state(
            dir.path(),
            vec![
                deck(1, 1, "a", "15/02/26", "EDH"),
                deck(2, 2, "b", "16/02/26", "MO"),
            ],
        ));
        let (_, json) = get_json(app, "/api/format-info").await;
        assert!(json["format_id"].is_null());
        assert_eq!(json["format_name"], "Multiple Formats");

        let dir2 = tempfile::tempdir().unwrap();
        let app = build_router(setup_state(dir2.path(), Vec::new()));
        let (_, json) = get_json(app, "/api/format-info").await;
        assert!(json["format_id"].is_null());
        assert!(json["format_name"].is_null());
    }
}
