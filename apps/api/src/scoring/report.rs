//! Local analysis report: sector matching → job scoring → recommendations.

use serde::{Deserialize, Serialize};

use crate::scoring::catalog::Catalog;
use crate::scoring::job_scorer::{score_jobs, JobMatch};
use crate::scoring::recommendations::{build_recommendations, Recommendation};
use crate::scoring::sector_matcher::{find_keywords, SectorHits};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub found_keywords_by_sector: Vec<SectorHits>,
    pub total_keywords_found: usize,
    /// Sector with the most hits, `None` when nothing was found.
    pub primary_sector: Option<String>,
    pub no_keywords_found: bool,
    pub job_matches: Vec<JobMatch>,
    pub recommendations: Vec<Recommendation>,
}

/// Scores `resume_text` against the catalog. Pure and deterministic.
///
/// Callers reject blank text before getting here; blank text simply yields an
/// empty report.
pub fn analyze_locally(resume_text: &str, catalog: &Catalog) -> AnalysisReport {
    let found = find_keywords(resume_text, catalog);
    let job_matches = score_jobs(&catalog.job_profiles, &found);
    let recommendations = build_recommendations(catalog, &found, &job_matches);

    AnalysisReport {
        primary_sector: found.primary_sector().map(str::to_string),
        no_keywords_found: found.total == 0,
        total_keywords_found: found.total,
        found_keywords_by_sector: found.by_sector,
        job_matches,
        recommendations,
    }
}
