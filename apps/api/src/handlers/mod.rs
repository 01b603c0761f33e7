//! Axum route handlers over the record stores and view models.

pub mod candidates;
pub mod history;
pub mod insights;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<String>,
}

impl CreatedResponse {
    pub fn new(id: String) -> Self {
        Self {
            id,
            candidate_id: None,
        }
    }
}
