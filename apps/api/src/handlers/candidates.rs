use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{BulkDeleteRequest, CreatedResponse};
use crate::errors::AppError;
use crate::models::{CandidateDraft, CandidateStatus, LocalCandidate};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: CandidateStatus,
}

/// GET /api/v1/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<LocalCandidate>>, AppError> {
    Ok(Json(state.stores.candidates.refresh().await?))
}

/// POST /api/v1/candidates
pub async fn handle_create_candidate(
    State(state): State<AppState>,
    Json(draft): Json<CandidateDraft>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = state.stores.candidates.create(draft).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse::new(id))))
}

/// PATCH /api/v1/candidates/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<StatusCode, AppError> {
    state
        .stores
        .candidate_store
        .update_status(&id, update.status)
        .await?;
    state.stores.candidates.refresh().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/candidates/:id
pub async fn handle_delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.stores.candidates.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/candidates/bulk-delete
pub async fn handle_bulk_delete_candidates(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<StatusCode, AppError> {
    state.stores.candidates.remove_many(&request.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/candidates
///
/// Clears guest entries only.
pub async fn handle_clear_candidates(
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.stores.candidates.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}
