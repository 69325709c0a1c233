use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::scoring::report::AnalysisReport;

/// Which producer handles an analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Local,
    Remote,
}

impl FromStr for Backend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Backend::Local),
            "remote" => Ok(Backend::Remote),
            other => Err(AppError::Validation(format!(
                "unknown backend '{other}', expected 'local' or 'remote'"
            ))),
        }
    }
}

/// Structured output of the remote model. Every field is required; a payload
/// missing any of them fails deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysisReport {
    pub summary: String,
    pub strengths: Vec<String>,
    pub recommendations: Vec<String>,
    pub job_fits: Vec<String>,
}

/// Result of either producer, tagged with the backend that made it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum Report {
    Local(AnalysisReport),
    Remote(AiAnalysisReport),
}

impl Report {
    pub fn backend(&self) -> Backend {
        match self {
            Report::Local(_) => Backend::Local,
            Report::Remote(_) => Backend::Remote,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::catalog::Catalog;
    use crate::scoring::report::analyze_locally;

    #[test]
    fn test_backend_parses_case_insensitively() {
        assert_eq!("Remote".parse::<Backend>().unwrap(), Backend::Remote);
        assert_eq!(" local ".parse::<Backend>().unwrap(), Backend::Local);
        assert!(matches!("cloud".parse::<Backend>(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_ai_report_requires_job_fits() {
        let json = r#"{"summary": "s", "strengths": [], "recommendations": []}"#;
        let err = serde_json::from_str::<AiAnalysisReport>(json).unwrap_err();
        assert!(err.to_string().contains("jobFits"));
    }

    #[test]
    fn test_ai_report_reads_camel_case() {
        let json = r#"{"summary": "s", "strengths": ["a"], "recommendations": ["b"], "jobFits": ["c"]}"#;
        let report: AiAnalysisReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.job_fits, vec!["c"]);
    }

    #[test]
    fn test_report_is_tagged_by_backend() {
        let local = Report::Local(analyze_locally("git", &Catalog::builtin()));
        let value = serde_json::to_value(&local).unwrap();
        assert_eq!(value["backend"], "local");
        assert!(value["job_matches"].is_array());
        assert_eq!(local.backend(), Backend::Local);

        let remote = Report::Remote(AiAnalysisReport {
            summary: "s".to_string(),
            strengths: vec![],
            recommendations: vec![],
            job_fits: vec!["SRE".to_string()],
        });
        let value = serde_json::to_value(&remote).unwrap();
        assert_eq!(value["backend"], "remote");
        assert_eq!(value["jobFits"][0], "SRE");
    }
}
