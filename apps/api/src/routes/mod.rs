pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::handlers::{candidates, history, insights};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/session", get(health::session_handler))
        // Analysis history
        .route(
            "/api/v1/analyses",
            get(history::handle_list_analyses)
                .post(history::handle_create_analysis)
                .delete(history::handle_clear_analyses),
        )
        .route(
            "/api/v1/analyses/bulk-delete",
            post(history::handle_bulk_delete_analyses),
        )
        .route(
            "/api/v1/analyses/:id",
            delete(history::handle_delete_analysis),
        )
        .route("/api/v1/dashboard", get(insights::handle_dashboard))
        // Download history
        .route(
            "/api/v1/downloads",
            get(history::handle_list_downloads)
                .post(history::handle_create_download)
                .delete(history::handle_clear_downloads),
        )
        .route(
            "/api/v1/downloads/summary",
            get(insights::handle_download_summary),
        )
        .route(
            "/api/v1/downloads/:id",
            delete(history::handle_delete_download),
        )
        // Candidates
        .route(
            "/api/v1/candidates",
            get(candidates::handle_list_candidates)
                .post(candidates::handle_create_candidate)
                .delete(candidates::handle_clear_candidates),
        )
        .route(
            "/api/v1/candidates/summary",
            get(insights::handle_candidate_summary),
        )
        .route(
            "/api/v1/candidates/bulk-delete",
            post(candidates::handle_bulk_delete_candidates),
        )
        .route(
            "/api/v1/candidates/:id",
            delete(candidates::handle_delete_candidate),
        )
        .route(
            "/api/v1/candidates/:id/status",
            patch(candidates::handle_update_status),
        )
        .with_state(state)
}
