//! Analysis history and download history endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::{BulkDeleteRequest, CreatedResponse};
use crate::errors::AppError;
use crate::models::{
    AnalysisDraft, AnalysisRecord, CandidateDraft, DownloadDraft, DownloadRecord, LocalCandidate,
};
use crate::state::AppState;
use crate::store::StoredRecord;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// Contact details that turn an analysis submission into a tracked candidate.
#[derive(Debug, Deserialize)]
pub struct CandidateIntake {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Defaults to the analysis job title.
    #[serde(default)]
    pub applied_role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAnalysisRequest {
    #[serde(flatten)]
    pub analysis: AnalysisDraft,
    #[serde(default)]
    pub candidate: Option<CandidateIntake>,
}

impl CandidateIntake {
    fn into_draft(self, analysis: &AnalysisDraft) -> CandidateDraft {
        CandidateDraft {
            name: self.name,
            email: self.email,
            phone: self.phone,
            applied_role: self
                .applied_role
                .or_else(|| analysis.job_title.clone())
                .unwrap_or_default(),
            latest_score: Some(analysis.overall_score),
            matched_skills: analysis.matched_skills.clone(),
            missing_skills: analysis.missing_skills.clone(),
            ..Default::default()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Analysis history
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/analyses
pub async fn handle_list_analyses(
    State(state): State<AppState>,
) -> Result<Json<Vec<AnalysisRecord>>, AppError> {
    Ok(Json(state.stores.analyses.refresh().await?))
}

/// POST /api/v1/analyses
///
/// Both drafts are validated before either store is written.
pub async fn handle_create_analysis(
    State(state): State<AppState>,
    Json(request): Json<CreateAnalysisRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let CreateAnalysisRequest { analysis, candidate } = request;
    let candidate = candidate.map(|intake| intake.into_draft(&analysis));

    AnalysisRecord::validate(&analysis)?;
    if let Some(draft) = &candidate {
        LocalCandidate::validate(draft)?;
    }

    let id = state.stores.analyses.create(analysis).await?;
    let candidate_id = match candidate {
        Some(draft) => Some(state.stores.candidates.create(draft).await?),
        None => None,
    };
    info!("Stored analysis {id}");

    Ok((StatusCode::CREATED, Json(CreatedResponse { id, candidate_id })))
}

/// DELETE /api/v1/analyses/:id
pub async fn handle_delete_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.stores.analyses.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/analyses/bulk-delete
pub async fn handle_bulk_delete_analyses(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<StatusCode, AppError> {
    state.stores.analyses.remove_many(&request.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/analyses
pub async fn handle_clear_analyses(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.stores.analyses.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Download history
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/downloads
pub async fn handle_list_downloads(
    State(state): State<AppState>,
) -> Result<Json<Vec<DownloadRecord>>, AppError> {
    Ok(Json(state.stores.downloads.refresh().await?))
}

/// POST /api/v1/downloads
///
/// Called by the report exporter after a file is produced.
pub async fn handle_create_download(
    State(state): State<AppState>,
    Json(draft): Json<DownloadDraft>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = state.stores.downloads.create(draft).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse::new(id))))
}

/// DELETE /api/v1/downloads/:id
pub async fn handle_delete_download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.stores.downloads.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/downloads
pub async fn handle_clear_downloads(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.stores.downloads.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}
