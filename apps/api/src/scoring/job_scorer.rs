//! Job scorer: weighted keyword overlap between the found set and each job profile.

use serde::{Deserialize, Serialize};

use crate::scoring::catalog::JobProfile;
use crate::scoring::sector_matcher::FoundKeywords;

/// Matching every keyword of a profile scores `weight / HEADROOM`, not `weight`.
/// Kept at 1.2 so percentages stay comparable with earlier reports.
const HEADROOM: f64 = 1.2;

/// Profiles at or below this percentage are left out of the result.
const MIN_MATCH_PERCENT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMatch {
    pub title: String,
    /// 0 – 100
    pub score_percent: u32,
}

/// `min(100, round(score / (keywords × 1.2) × 100))` where `score` sums the profile
/// weight once per keyword present in `found`.
pub fn match_percent(profile: &JobProfile, found: &FoundKeywords) -> u32 {
    if profile.keywords.is_empty() {
        return 0;
    }

    let score: f64 = profile
        .keywords
        .iter()
        .filter(|kw| found.contains(kw))
        .map(|_| profile.weight)
        .sum();

    let percent = (score / (profile.keywords.len() as f64 * HEADROOM) * 100.0).round();
    percent.clamp(0.0, 100.0) as u32
}

/// Scores every profile, keeps those above 10%, and sorts descending.
/// The sort is stable, so equal scores keep profile declaration order.
pub fn score_jobs(profiles: &[JobProfile], found: &FoundKeywords) -> Vec<JobMatch> {
    let mut matches: Vec<JobMatch> = profiles
        .iter()
        .map(|profile| JobMatch {
            title: profile.title.clone(),
            score_percent: match_percent(profile, found),
        })
        .filter(|m| m.score_percent > MIN_MATCH_PERCENT)
        .collect();

    matches.sort_by(|a, b| b.score_percent.cmp(&a.score_percent));
    matches
}
