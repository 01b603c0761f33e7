use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_score, require_text};
use crate::identity::SessionId;
use crate::store::{StoreError, StoredRecord};

/// Only the most recent exports are kept.
pub const DOWNLOAD_HISTORY_CAP: usize = 20;

/// One exported report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub id: String,
    pub session_id: String,
    #[serde(default)]
    pub analysis_id: Option<String>,
    pub file_name: String,
    #[serde(default)]
    pub job_title: Option<String>,
    pub score: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadDraft {
    #[serde(default)]
    pub analysis_id: Option<String>,
    pub file_name: String,
    #[serde(default)]
    pub job_title: Option<String>,
    pub score: u32,
}

impl StoredRecord for DownloadRecord {
    type Draft = DownloadDraft;

    const LABEL: &'static str = "download history";
    const TABLE: &'static str = "download_history";
    const LOCAL_KEY: &'static str = "resume_analyzer_download_history";
    const RETENTION_CAP: Option<usize> = Some(DOWNLOAD_HISTORY_CAP);

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn validate(draft: &DownloadDraft) -> Result<(), StoreError> {
        require_text("file_name", &draft.file_name)?;
        check_score("score", draft.score)
    }

    fn materialize(
        draft: DownloadDraft,
        id: String,
        session: &SessionId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session_id: session.to_string(),
            analysis_id: draft.analysis_id,
            file_name: draft.file_name,
            job_title: draft.job_title,
            score: draft.score,
            created_at: now,
        }
    }
}
