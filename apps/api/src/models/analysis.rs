use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_score, nullable_list, require_text};
use crate::identity::SessionId;
use crate::store::{StoreError, StoredRecord};

/// One resume-vs-job scoring result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub session_id: String,
    pub resume_name: String,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub resume_text: Option<String>,
    pub overall_score: u32,
    pub skills_match_score: u32,
    pub experience_score: u32,
    pub ats_score: u32,
    pub formatting_score: u32,
    #[serde(default, deserialize_with = "nullable_list")]
    pub matched_skills: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub missing_skills: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub weaknesses: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub suggestions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Analysis output as handed over by the scoring flow, before it is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDraft {
    pub resume_name: String,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub resume_text: Option<String>,
    pub overall_score: u32,
    #[serde(default)]
    pub skills_match_score: u32,
    #[serde(default)]
    pub experience_score: u32,
    #[serde(default)]
    pub ats_score: u32,
    #[serde(default)]
    pub formatting_score: u32,
    #[serde(default, deserialize_with = "nullable_list")]
    pub matched_skills: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub missing_skills: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub weaknesses: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub suggestions: Vec<String>,
}

impl StoredRecord for AnalysisRecord {
    type Draft = AnalysisDraft;

    const LABEL: &'static str = "analysis history";
    const TABLE: &'static str = "analysis_history";
    const LOCAL_KEY: &'static str = "resume_analyzer_analysis_history";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn validate(draft: &AnalysisDraft) -> Result<(), StoreError> {
        require_text("resume_name", &draft.resume_name)?;
        check_score("overall_score", draft.overall_score)?;
        check_score("skills_match_score", draft.skills_match_score)?;
        check_score("experience_score", draft.experience_score)?;
        check_score("ats_score", draft.ats_score)?;
        check_score("formatting_score", draft.formatting_score)
    }

    fn materialize(
        draft: AnalysisDraft,
        id: String,
        session: &SessionId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session_id: session.to_string(),
            resume_name: draft.resume_name,
            job_title: draft.job_title,
            job_description: draft.job_description,
            resume_text: draft.resume_text,
            overall_score: draft.overall_score,
            skills_match_score: draft.skills_match_score,
            experience_score: draft.experience_score,
            ats_score: draft.ats_score,
            formatting_score: draft.formatting_score,
            matched_skills: draft.matched_skills,
            missing_skills: draft.missing_skills,
            strengths: draft.strengths,
            weaknesses: draft.weaknesses,
            suggestions: draft.suggestions,
            created_at: now,
        }
    }
}
