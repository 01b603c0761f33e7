//! View models: pure aggregations over whatever a record store listed.
//!
//! Nothing here touches a backend, and nothing here fails: empty input yields
//! zeroed summaries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{AnalysisRecord, CandidateStatus, DownloadRecord, LocalCandidate};

/// Scores below this are "low".
pub const MEDIUM_THRESHOLD: u32 = 50;
/// Scores at or above this are "high".
pub const HIGH_THRESHOLD: u32 = 75;

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
}

pub fn score_distribution(scores: impl IntoIterator<Item = u32>) -> ScoreDistribution {
    scores
        .into_iter()
        .fold(ScoreDistribution::default(), |mut dist, score| {
            if score >= HIGH_THRESHOLD {
                dist.high += 1;
            } else if score >= MEDIUM_THRESHOLD {
                dist.medium += 1;
            } else {
                dist.low += 1;
            }
            dist
        })
}

/// Counts every value across the lists and returns the `n` most frequent.
/// Equal counts keep the order in which values were first seen.
pub fn top_frequencies<'a>(
    lists: impl IntoIterator<Item = &'a [String]>,
    n: usize,
) -> Vec<FrequencyEntry> {
    let mut entries: Vec<FrequencyEntry> = Vec::new();
    let mut positions: HashMap<&'a str, usize> = HashMap::new();

    for value in lists.into_iter().flatten() {
        match positions.get(value.as_str()) {
            Some(&i) => entries[i].count += 1,
            None => {
                positions.insert(value.as_str(), entries.len());
                entries.push(FrequencyEntry {
                    value: value.clone(),
                    count: 1,
                });
            }
        }
    }

    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(n);
    entries
}

/// Rounded arithmetic mean; 0 for no values.
pub fn average(values: impl IntoIterator<Item = u32>) -> u32 {
    let (sum, count) = values
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), v| (sum + v as u64, count + 1));
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as u32
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreAverages {
    pub overall: u32,
    pub skills_match: u32,
    pub experience: u32,
    pub ats: u32,
    pub formatting: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_analyses: usize,
    pub averages: ScoreAverages,
    pub distribution: ScoreDistribution,
    pub top_matched_skills: Vec<FrequencyEntry>,
    pub top_missing_skills: Vec<FrequencyEntry>,
    pub latest_analysis_at: Option<DateTime<Utc>>,
}

pub fn dashboard_summary(records: &[AnalysisRecord], top_n: usize) -> DashboardSummary {
    let avg = |f: fn(&AnalysisRecord) -> u32| average(records.iter().map(f));

    DashboardSummary {
        total_analyses: records.len(),
        averages: ScoreAverages {
            overall: avg(|r| r.overall_score),
            skills_match: avg(|r| r.skills_match_score),
            experience: avg(|r| r.experience_score),
            ats: avg(|r| r.ats_score),
            formatting: avg(|r| r.formatting_score),
        },
        distribution: score_distribution(records.iter().map(|r| r.overall_score)),
        top_matched_skills: top_frequencies(
            records.iter().map(|r| r.matched_skills.as_slice()),
            top_n,
        ),
        top_missing_skills: top_frequencies(
            records.iter().map(|r| r.missing_skills.as_slice()),
            top_n,
        ),
        latest_analysis_at: records.iter().map(|r| r.created_at).max(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: CandidateStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSummary {
    pub total: usize,
    /// One entry per status, in pipeline order, including zero counts.
    pub by_status: Vec<StatusCount>,
    /// Over candidates that carry a score.
    pub average_score: u32,
    pub distribution: ScoreDistribution,
    pub top_missing_skills: Vec<FrequencyEntry>,
    /// Most recent creation or status change.
    pub latest_activity_at: Option<DateTime<Utc>>,
}

pub fn candidate_summary(candidates: &[LocalCandidate], top_n: usize) -> CandidateSummary {
    let scores = || candidates.iter().filter_map(|c| c.latest_score);

    CandidateSummary {
        total: candidates.len(),
        by_status: CandidateStatus::ALL
            .iter()
            .map(|&status| StatusCount {
                status,
                count: candidates.iter().filter(|c| c.status == status).count(),
            })
            .collect(),
        average_score: average(scores()),
        distribution: score_distribution(scores()),
        top_missing_skills: top_frequencies(
            candidates.iter().map(|c| c.missing_skills.as_slice()),
            top_n,
        ),
        latest_activity_at: candidates.iter().map(LocalCandidate::last_updated).max(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadSummary {
    pub total: usize,
    pub average_score: u32,
    pub latest_file_name: Option<String>,
}

/// Expects newest-first input, as every store lists it.
pub fn download_summary(records: &[DownloadRecord]) -> DownloadSummary {
    DownloadSummary {
        total: records.len(),
        average_score: average(records.iter().map(|r| r.score)),
        latest_file_name: records.first().map(|r| r.file_name.clone()),
    }
}
