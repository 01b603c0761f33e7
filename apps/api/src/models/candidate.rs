use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_score, nullable_list, require_text};
use crate::identity::SessionId;
use crate::store::{StoreError, StoredRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    #[default]
    Pending,
    Reviewed,
    Shortlisted,
    Rejected,
    Selected,
}

impl CandidateStatus {
    pub const ALL: [CandidateStatus; 5] = [
        CandidateStatus::Pending,
        CandidateStatus::Reviewed,
        CandidateStatus::Shortlisted,
        CandidateStatus::Rejected,
        CandidateStatus::Selected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Pending => "pending",
            CandidateStatus::Reviewed => "reviewed",
            CandidateStatus::Shortlisted => "shortlisted",
            CandidateStatus::Rejected => "rejected",
            CandidateStatus::Selected => "selected",
        }
    }
}

/// A tracked candidate. Guest-mode entries carry a `local-` id prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalCandidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub applied_role: String,
    #[serde(default)]
    pub status: CandidateStatus,
    pub created_at: DateTime<Utc>,
    /// Unset on rows that were never modified.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub latest_score: Option<u32>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub matched_skills: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateDraft {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub applied_role: String,
    #[serde(default)]
    pub status: CandidateStatus,
    #[serde(default)]
    pub latest_score: Option<u32>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub matched_skills: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub missing_skills: Vec<String>,
}

impl LocalCandidate {
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

impl StoredRecord for LocalCandidate {
    type Draft = CandidateDraft;

    const LABEL: &'static str = "candidates";
    const TABLE: &'static str = "candidates";
    const LOCAL_KEY: &'static str = "lovable_local_candidates";
    const SESSION_SCOPED: bool = false;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn validate(draft: &CandidateDraft) -> Result<(), StoreError> {
        require_text("name", &draft.name)?;
        require_text("applied_role", &draft.applied_role)?;
        match draft.latest_score {
            Some(score) => check_score("latest_score", score),
            None => Ok(()),
        }
    }

    fn materialize(
        draft: CandidateDraft,
        id: String,
        _session: &SessionId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            applied_role: draft.applied_role,
            status: draft.status,
            created_at: now,
            updated_at: Some(now),
            latest_score: draft.latest_score,
            matched_skills: draft.matched_skills,
            missing_skills: draft.missing_skills,
        }
    }
}
