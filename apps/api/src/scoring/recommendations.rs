//! Recommendation engine. Fixed-order rules over the found keywords and the top job match.
//!
//! Recommendations are plain text plus the terms a renderer may emphasize. They carry no
//! markup; escaping for display is the renderer's job.

use serde::{Deserialize, Serialize};

use crate::scoring::catalog::Catalog;
use crate::scoring::job_scorer::JobMatch;
use crate::scoring::sector_matcher::FoundKeywords;

const SOFTWARE_SECTOR: &str = "Software Development";
const VERSION_CONTROL_KEYWORD: &str = "git";
const CLOUD_KEYWORDS: &[&str] = &["aws", "gcp", "azure"];
const MISSING_KEYWORDS_SHOWN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    MissingKeywords,
    VersionControl,
    CloudPlatform,
    PositiveFeedback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub text: String,
    /// Substrings of `text` worth emphasizing.
    pub highlighted_terms: Vec<String>,
}

/// Applies the rules in order. The result is never empty.
pub fn build_recommendations(
    catalog: &Catalog,
    found: &FoundKeywords,
    job_matches: &[JobMatch],
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if let Some(rec) = missing_keywords_for_top_match(catalog, found, job_matches) {
        recommendations.push(rec);
    }

    if !found.contains(VERSION_CONTROL_KEYWORD) {
        recommendations.push(Recommendation {
            kind: RecommendationKind::VersionControl,
            text: "Mentioning version control experience with Git is crucial for almost any tech role."
                .to_string(),
            highlighted_terms: vec!["Git".to_string()],
        });
    }

    if found.sector_has_hits(SOFTWARE_SECTOR) && !CLOUD_KEYWORDS.iter().any(|c| found.contains(c)) {
        recommendations.push(Recommendation {
            kind: RecommendationKind::CloudPlatform,
            text: "Experience with a cloud platform like AWS, Azure, or GCP can significantly improve your profile."
                .to_string(),
            highlighted_terms: vec!["AWS, Azure, or GCP".to_string()],
        });
    }

    if recommendations.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::PositiveFeedback,
            text: "Your resume shows a strong and diverse skill set. Great work!".to_string(),
            highlighted_terms: vec![],
        });
    }

    recommendations
}

fn missing_keywords_for_top_match(
    catalog: &Catalog,
    found: &FoundKeywords,
    job_matches: &[JobMatch],
) -> Option<Recommendation> {
    let top = job_matches.first()?;
    let profile = catalog.profile(&top.title)?;

    let missing: Vec<&str> = profile
        .keywords
        .iter()
        .filter(|kw| !found.contains(kw))
        .take(MISSING_KEYWORDS_SHOWN)
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        return None;
    }

    let skills = missing.join(", ");
    Some(Recommendation {
        kind: RecommendationKind::MissingKeywords,
        text: format!(
            "To better fit a {} role, consider highlighting skills like: {}.",
            top.title, skills
        ),
        highlighted_terms: vec![top.title.clone(), skills],
    })
}
