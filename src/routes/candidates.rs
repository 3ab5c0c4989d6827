use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{Candidate, NewCandidate, ScoreUpdate, SelectionUpdate};
use crate::presentation::{self, SortKey, TeamSummary};
use crate::scoring;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub sort: Option<String>,
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: i32,
}

#[derive(Serialize)]
pub struct ChangesResponse {
    pub changes: usize,
}

#[derive(Serialize)]
pub struct ScoreResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scored: Option<usize>,
}

pub async fn list_candidates(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Candidate>>> {
    let sort = query
        .sort
        .as_deref()
        .map(str::parse::<SortKey>)
        .transpose()
        .map_err(AppError::bad_request)?;

    let mut candidates = state.store().list().await?;
    if let Some(q) = query.q.as_deref() {
        candidates = presentation::filter_candidates(candidates, q);
    }
    if let Some(sort) = sort {
        presentation::sort_candidates(&mut candidates, sort);
    }

    Ok(Json(candidates))
}

pub async fn list_selected(State(state): State<AppState>) -> AppResult<Json<Vec<Candidate>>> {
    Ok(Json(state.store().list_selected().await?))
}

pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Candidate>> {
    state
        .store()
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(AppError::not_found)
}

/// Writes the candidate as given, including any pre-computed scores.
pub async fn create_candidate(
    State(state): State<AppState>,
    Json(payload): Json<NewCandidate>,
) -> AppResult<Json<CreatedResponse>> {
    if payload.email.trim().is_empty() {
        return Err(AppError::bad_request("email must not be empty"));
    }

    let id = state.store().upsert(payload).await?;
    Ok(Json(CreatedResponse { id }))
}

pub async fn select_candidate(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<SelectionUpdate>,
) -> AppResult<Json<ChangesResponse>> {
    let selected = payload.selected;
    let changes = state.store().update_selection(id, payload).await?;
    info!(candidate_id = id, selected, changes, "candidate selection updated");
    Ok(Json(ChangesResponse { changes }))
}

/// Persists client-computed scores without re-validating them.
pub async fn update_scores(
    State(state): State<AppState>,
    Json(payload): Json<Vec<ScoreUpdate>>,
) -> AppResult<Json<ScoreResponse>> {
    scoring::persist_scores(state.store(), payload).await?;
    Ok(Json(ScoreResponse {
        success: true,
        scored: None,
    }))
}

pub async fn rescore_candidates(State(state): State<AppState>) -> AppResult<Json<ScoreResponse>> {
    let scored = scoring::rescore_all(state.store()).await?;
    Ok(Json(ScoreResponse {
        success: true,
        scored: Some(scored),
    }))
}

pub async fn team_summary(State(state): State<AppState>) -> AppResult<Json<TeamSummary>> {
    let selected = state.store().list_selected().await?;
    Ok(Json(presentation::team_summary(&selected)))
}
