//! Bulk card metadata lookup for the frontend.

use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::models::CardDetails;

#[derive(Debug, Deserialize)]
pub struct LookupBody {
    #[serde(default)]
    pub names: Vec<String>,
}

/// Resolve metadata for a batch of names. Names the metadata source
/// does not know are simply absent from the map.
pub async fn lookup_cards(
    State(state): State<AppState>,
    Json(body): Json<LookupBody>,
) -> Json<HashMap<String, CardDetails>> {
    if body.names.is_empty() {
        return Json(HashMap::new());
    }
    let mut cards = state.cards.lock().await;
    Json(cards.lookup(&body.names).await)
}
