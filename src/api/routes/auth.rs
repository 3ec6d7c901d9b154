//! Admin authentication.
//!
//! Single-user bearer tokens: `{sub}.{exp}.{sig}` where the signature is
//! a SHA-256 over the signing secret, subject, and expiry. The admin
//! password comes from `ADMIN_PASSWORD`; with no password set every auth
//! endpoint reports login as disabled.

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::api::state::AppState;
use crate::api::ApiError;

const TOKEN_TTL_SECS: i64 = 7 * 24 * 3600;

const FALLBACK_SECRET: &str = "dev-secret-change-in-production";

/// Signing material resolved once at startup.
#[derive(Debug, Clone)]
pub struct AuthKeys {
    /// Admin password; `None` disables every admin endpoint.
    pub password: Option<String>,
    pub secret: String,
}

impl AuthKeys {
    /// Read `ADMIN_PASSWORD` and `JWT_SECRET` from the environment. The
    /// password doubles as the signing secret unless one is set
    /// explicitly.
    pub fn from_env() -> Self {
        let password = std::env::var("ADMIN_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty());
        let secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| password.clone())
            .unwrap_or_else(|| FALLBACK_SECRET.to_string());
        Self { password, secret }
    }
}

fn sign(secret: &str, sub: &str, exp: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{secret}|{sub}|{exp}").as_bytes());
    hex::encode(hasher.finalize())
}

fn issue_token(keys: &AuthKeys, sub: &str) -> String {
    let exp = Utc::now().timestamp() + TOKEN_TTL_SECS;
    format!("{sub}.{exp}.{}", sign(&keys.secret, sub, exp))
}

fn verify_token(keys: &AuthKeys, token: &str) -> Option<String> {
    let parts: Vec<&str> = token.split('.').collect();
    let [sub, exp_raw, sig] = parts.as_slice() else {
        return None;
    };
    let exp: i64 = exp_raw.parse().ok()?;
    if exp <= Utc::now().timestamp() {
        return None;
    }
    if *sig != sign(&keys.secret, sub, exp) {
        return None;
    }
    Some((*sub).to_string())
}

/// Validate the bearer token on an admin route and return the subject.
pub(crate) fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<String, ApiError> {
    if state.auth.password.is_none() {
        return Err(ApiError::Unauthorized(
            "Admin login disabled (ADMIN_PASSWORD not set)".to_string(),
        ));
    }
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let Some(token) = header.strip_prefix("Bearer ") else {
        return Err(ApiError::Unauthorized(
            "Missing or invalid Authorization header".to_string(),
        ));
    };
    match verify_token(&state.auth, token.trim()) {
        Some(sub) if sub == "admin" => Ok(sub),
        _ => Err(ApiError::Unauthorized(
            "Invalid or expired token".to_string(),
        )),
    }
}

// ── Handlers ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Some(password) = state.auth.password.as_deref() else {
        return Err(ApiError::Unauthorized(
            "Admin login disabled (ADMIN_PASSWORD not set)".to_string(),
        ));
    };
    if body.password != password {
        return Err(ApiError::Unauthorized("Invalid password".to_string()));
    }
    Ok(Json(LoginResponse {
        token: issue_token(&state.auth, "admin"),
        user: "admin".to_string(),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, ApiError> {
    let user = require_admin(&state, &headers)?;
    Ok(Json(MeResponse { user }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::LandTables;
    use crate::api::build_router;
    use crate::api::routes::scrape::ScrapeState;
    use crate::cards::CardLookup;
    use crate::config::AppConfig;
    use crate::storage::{DeckRepository, StorageConfig};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn setup_state(dir: &std::path::Path, password: Option<&str>) -> AppState {
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
            aliases: Arc::new(tokio::sync::RwLock::new(HashMap::new())),
            ignored_lands: Arc::new(tokio::sync::RwLock::new(
                LandTables::default_nonbasics_sorted(),
            )),
            cards: Arc::new(tokio::sync::Mutex::new(cards)),
            auth: Arc::new(AuthKeys {
                password: password.map(String::from),
                secret: "test-secret".to_string(),
            }),
            scrape_state: Arc::new(std::sync::Mutex::new(ScrapeState::default())),
        }
    }

    async fn post_json(app: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    async fn get_with_auth(app: axum::Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let resp = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn test_keys() -> AuthKeys {
        AuthKeys {
            password: Some("hunter2".to_string()),
            secret: "test-secret".to_string(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let keys = test_keys();
        let token = issue_token(&keys, "admin");
        assert_eq!(verify_token(&keys, &token), Some("admin".to_string()));
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let keys = test_keys();
        let token = issue_token(&keys, "admin");
        let other = AuthKeys {
            password: Some("hunter2".to_string()),
            secret: "other-secret".to_string(),
        };
        assert_eq!(verify_token(&other, &token), None);
    }

    #[test]
    fn test_token_rejects_expired() {
        let keys = test_keys();
        let exp = Utc::now().timestamp() - 10;
        let stale = format!("admin.{exp}.{}", sign(&keys.secret, "admin", exp));
        assert_eq!(verify_token(&keys, &stale), None);
    }

    #[test]
    fn test_token_rejects_malformed() {
        let keys = test_keys();
        assert_eq!(verify_token(&keys, "garbage"), None);
        assert_eq!(verify_token(&keys, "admin.123"), None);
        assert_eq!(verify_token(&keys, "admin.notanumber.abc"), None);
    }

    #[tokio::test]
    async fn test_login_and_me() {
        let dir = tempfile::tempdir().unwrap();
        let state = setup_state(dir.path(), Some("hunter2"));
        let app = build_router(state);

        let (status, json) =
            post_json(app.clone(), "/api/auth/login", r#"{"password": "hunter2"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["user"], "admin");
        let token = json["token"].as_str().unwrap().to_string();

        let (status, json) = get_with_auth(app, "/api/auth/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["user"], "admin");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(setup_state(dir.path(), Some("hunter2")));

        let (status, json) =
            post_json(app, "/api/auth/login", r#"{"password": "nope"}"#).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Invalid password"));
    }

    #[tokio::test]
    async fn test_login_disabled_without_password() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(setup_state(dir.path(), None));

        let (status, json) =
            post_json(app, "/api/auth/login", r#"{"password": "anything"}"#).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Admin login disabled"));
    }

    #[tokio::test]
    async fn test_me_missing_header() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(setup_state(dir.path(), Some("hunter2")));

        let (status, json) = get_with_auth(app, "/api/auth/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Missing or invalid Authorization header"));
    }

    #[tokio::test]
    async fn test_me_bad_token() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(setup_state(dir.path(), Some("hunter2")));

        let (status, json) = get_with_auth(app, "/api/auth/me", Some("admin.1.bogus")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Invalid or expired token"));
    }
}
