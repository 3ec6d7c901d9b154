//! Metagame report endpoint and the recompute trigger.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::analysis::{analyze, LandTables, MetagameReport, PlacementWeights, ReportOptions};
use crate::api::routes::decks::parse_id_csv;
use crate::api::state::AppState;
use crate::models::{date_in_range, Deck};

#[derive(Debug, Default, Deserialize)]
pub struct MetagameParams {
    pub placement_weighted: Option<bool>,
    pub ignore_lands: Option<bool>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub event_id: Option<u64>,
    pub event_ids: Option<String>,
}

impl MetagameParams {
    /// True when every knob is absent, the only case the cached report
    /// can answer.
    fn is_default(&self) -> bool {
        self.placement_weighted.is_none()
            && self.ignore_lands.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.event_id.is_none()
            && self.event_ids.is_none()
    }
}

pub async fn get_metagame(
    State(state): State<AppState>,
    Query(params): Query<MetagameParams>,
) -> Json<MetagameReport> {
    let default_params = params.is_default();
    if default_params {
        if let Some(cached) = state.repository.cached_report().await {
            return Json((*cached).clone());
        }
    }

    let snapshot = state.repository.snapshot().await;

    // Event filters take precedence over the date window
    let filtered: Vec<Deck>;
    let pool: &[Deck] = if let Some(ids) = parse_id_csv(params.event_ids.as_deref()) {
        filtered = snapshot
            .iter()
            .filter(|d| ids.contains(&d.event_id))
            .cloned()
            .collect();
        &filtered
    } else if let Some(event_id) = params.event_id {
        filtered = snapshot
            .iter()
            .filter(|d| d.event_id == event_id)
            .cloned()
            .collect();
        &filtered
    } else if params.date_from.is_some() || params.date_to.is_some() {
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

    let lands = {
        let ignored = state.ignored_lands.read().await;
        LandTables::with_nonbasics(ignored.iter().cloned())
    };
    let weights = PlacementWeights::default();
    let options = ReportOptions::new(&weights, &lands)
        .with_placement_weighted(params.placement_weighted.unwrap_or(false))
        .with_ignore_lands(params.ignore_lands.unwrap_or(false));

    let report = analyze(pool, &options);
    if default_params {
        state.repository.store_report(Arc::new(report.clone())).await;
    }
    Json(report)
}

/// Drops the cached report so the next request rebuilds it. Kept public
/// so dashboards can force a refresh without credentials.
pub async fn trigger_analysis(State(state): State<AppState>) -> Json<Value> {
    state.repository.invalidate().await;
    Json(json!({
        "message": "Analysis will be recomputed on next /api/metagame request"
    }))
}
