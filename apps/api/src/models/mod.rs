pub mod analysis;
pub mod candidate;
pub mod download;

pub use analysis::{AnalysisDraft, AnalysisRecord};
pub use candidate::{CandidateDraft, CandidateStatus, LocalCandidate};
pub use download::{DownloadDraft, DownloadRecord};

use serde::{Deserialize, Deserializer};

use crate::store::StoreError;

/// Upper bound of every score on the 0–100 scale.
pub const MAX_SCORE: u32 = 100;

/// Deserializes a string list, treating `null` as empty.
pub(crate) fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn check_score(field: &str, value: u32) -> Result<(), StoreError> {
    if value > MAX_SCORE {
        return Err(StoreError::Validation(format!(
            "{field} must be between 0 and {MAX_SCORE} (got {value})"
        )));
    }
    Ok(())
}
