//! Runtime-editable settings, currently just the ignored-lands list.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::routes::auth::require_admin;
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::storage;

#[derive(Debug, Serialize)]
pub struct IgnoredLandsResponse {
    pub cards: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct IgnoredLandsBody {
    #[serde(default)]
    pub cards: Vec<String>,
}

pub async fn get_ignored_lands(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<IgnoredLandsResponse>, ApiError> {
    require_admin(&state, &headers)?;
    let cards = state.ignored_lands.read().await;
    Ok(Json(IgnoredLandsResponse {
        cards: cards.clone(),
    }))
}

/// Replace the list wholesale. The stored form is what comes back:
/// trimmed, de-duplicated, sorted.
pub async fn put_ignored_lands(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<IgnoredLandsBody>,
) -> Result<Json<IgnoredLandsResponse>, ApiError> {
    require_admin(&state, &headers)?;

    let stored = storage::write_ignored_lands(&state.storage, body.cards)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let mut cards = state.ignored_lands.write().await;
    *cards = stored.clone();
    Ok(Json(IgnoredLandsResponse { cards: stored }))
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
    use crate::storage::{DeckRepository, StorageConfig};
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn setup_state(dir: &std::path::Path) -> AppState {
        let storage = StorageConfig::new(dir.to_path_buf());
        let cards =
            CardLookup::with_base_url(&storage, "http://127.0.0.1:1/cards/collection").unwrap();
        AppState {
            config: Arc::new(AppConfig {
                data_dir: dir.to_path_buf(),
                ..AppConfig::default()
            }),
            storage: Arc::new(storage),
            repository: Arc::new(DeckRepository::new(Vec::new())),
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

    async fn send_json(
        app: axum::Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn admin_token(app: axum::Router) -> String {
        let (status, json) = send_json(
            app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"password": "hunter2"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        json["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_get_requires_admin() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(setup_state(dir.path()));

        let (status, _) = send_json(
            app,
            Method::GET,
            "/api/settings/ignore-lands-cards",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_get_returns_default_nonbasics() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(setup_state(dir.path()));
        let token = admin_token(app.clone()).await;

        let (status, json) = send_json(
            app,
            Method::GET,
            "/api/settings/ignore-lands-cards",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let cards = json["cards"].as_array().unwrap();
        assert!(cards.iter().any(|c| c == "Command Tower"));
    }

    #[tokio::test]
    async fn test_put_cleans_persists_and_updates_memory() {
        let dir = tempfile::tempdir().unwrap();
        let state = setup_state(dir.path());
        let storage = state.storage.clone();
        let app = build_router(state.clone());
        let token = admin_token(app.clone()).await;

        let (status, json) = send_json(
            app,
            Method::PUT,
            "/api/settings/ignore-lands-cards",
            Some(&token),
            Some(json!({"cards": ["  Wasteland ", "Ancient Tomb", "Wasteland", ""]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["cards"], json!(["Ancient Tomb", "Wasteland"]));

        assert_eq!(
            *state.ignored_lands.read().await,
            vec!["Ancient Tomb".to_string(), "Wasteland".to_string()]
        );
        assert_eq!(
            storage::read_ignored_lands(&storage).unwrap(),
            vec!["Ancient Tomb".to_string(), "Wasteland".to_string()]
        );
    }
}
