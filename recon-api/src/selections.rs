use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use recon_core::selection::SelectionKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub organization: String,
    #[serde(default)]
    pub plan: Option<String>,
    pub service_id: i64,
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub key: String,
    pub selected: bool,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SelectionListResponse {
    pub selections: BTreeMap<String, i64>,
    pub count: usize,
}

/// POST /v1/selections
/// Toggle semantics: re-picking the chosen service clears it, anything else
/// overwrites. Nothing is validated against the catalog here; that happens
/// at generate time.
pub async fn toggle_selection(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> Json<SelectionResponse> {
    let key = SelectionKey::new(&request.organization, request.plan.as_deref());

    let mut selections = state.selections.write().await;
    let selected = selections.select(key.clone(), request.service_id);

    Json(SelectionResponse {
        key: key.to_string(),
        selected,
        count: selections.count(),
    })
}

/// GET /v1/selections
pub async fn list_selections(State(state): State<AppState>) -> Json<SelectionListResponse> {
    let selections = state.selections.read().await;
    let map: BTreeMap<String, i64> = selections
        .iter()
        .map(|(key, id)| (key.to_string(), id))
        .collect();

    Json(SelectionListResponse { count: map.len(), selections: map })
}

/// DELETE /v1/selections/{organization}/{plan}
pub async fn clear_selection(
    State(state): State<AppState>,
    Path((organization, plan)): Path<(String, String)>,
) -> StatusCode {
    let key = SelectionKey::new(&organization, Some(&plan));
    state.selections.write().await.clear(&key);
    StatusCode::NO_CONTENT
}

/// DELETE /v1/selections
pub async fn clear_all_selections(State(state): State<AppState>) -> StatusCode {
    state.selections.write().await.clear_all();
    StatusCode::NO_CONTENT
}
