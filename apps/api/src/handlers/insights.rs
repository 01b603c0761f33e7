use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::state::AppState;
use crate::stats::{
    candidate_summary, dashboard_summary, download_summary, CandidateSummary, DashboardSummary,
    DownloadSummary, DEFAULT_TOP_N,
};

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub top: Option<usize>,
}

impl TopQuery {
    fn top_n(&self) -> usize {
        self.top.unwrap_or(DEFAULT_TOP_N)
    }
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    Query(params): Query<TopQuery>,
) -> Result<Json<DashboardSummary>, AppError> {
    let records = state.stores.analyses.refresh().await?;
    Ok(Json(dashboard_summary(&records, params.top_n())))
}

/// GET /api/v1/candidates/summary
pub async fn handle_candidate_summary(
    State(state): State<AppState>,
    Query(params): Query<TopQuery>,
) -> Result<Json<CandidateSummary>, AppError> {
    let candidates = state.stores.candidates.refresh().await?;
    Ok(Json(candidate_summary(&candidates, params.top_n())))
}

/// GET /api/v1/downloads/summary
pub async fn handle_download_summary(
    State(state): State<AppState>,
) -> Result<Json<DownloadSummary>, AppError> {
    let records = state.stores.downloads.refresh().await?;
    Ok(Json(download_summary(&records)))
}
