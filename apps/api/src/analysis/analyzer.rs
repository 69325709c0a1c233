//! Resume analyzers: two producers behind one async contract.
//!
//! `LocalAnalyzer` runs keyword scoring in-process. `RemoteAnalyzer` asks Gemini.
//! `AppState` holds both behind `Arc<dyn ResumeAnalyzer>`; callers pick per request.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::analysis::models::{AiAnalysisReport, Backend, Report};
use crate::analysis::prompts::{build_prompt, response_schema, system_instruction};
use crate::errors::AppError;
use crate::llm_client::{GeminiClient, LlmError};
use crate::scoring::catalog::Catalog;
use crate::scoring::report::analyze_locally;

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    fn backend(&self) -> Backend;

    /// Fails with `EmptyInput` for blank text before doing any work.
    async fn analyze(&self, resume_text: &str) -> Result<Report, AppError>;
}

pub fn ensure_not_blank(resume_text: &str) -> Result<(), AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::EmptyInput);
    }
    Ok(())
}

pub struct LocalAnalyzer {
    catalog: Arc<Catalog>,
}

impl LocalAnalyzer {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl ResumeAnalyzer for LocalAnalyzer {
    fn backend(&self) -> Backend {
        Backend::Local
    }

    async fn analyze(&self, resume_text: &str) -> Result<Report, AppError> {
        ensure_not_blank(resume_text)?;
        let report = analyze_locally(resume_text, &self.catalog);
        info!(
            "Local analysis: {} keywords, {} job matches",
            report.total_keywords_found,
            report.job_matches.len()
        );
        Ok(Report::Local(report))
    }
}

pub struct RemoteAnalyzer {
    client: GeminiClient,
}

impl RemoteAnalyzer {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResumeAnalyzer for RemoteAnalyzer {
    fn backend(&self) -> Backend {
        Backend::Remote
    }

    async fn analyze(&self, resume_text: &str) -> Result<Report, AppError> {
        ensure_not_blank(resume_text)?;
        let report = analyze_remotely(resume_text, &self.client).await?;
        info!(
            "Remote analysis: {} strengths, {} job fits",
            report.strengths.len(),
            report.job_fits.len()
        );
        Ok(Report::Remote(report))
    }
}

/// Sends the resume to Gemini and validates the structured reply.
pub async fn analyze_remotely(
    resume_text: &str,
    client: &GeminiClient,
) -> Result<AiAnalysisReport, LlmError> {
    client
        .call_json::<AiAnalysisReport>(
            &build_prompt(resume_text),
            &system_instruction(),
            &response_schema(),
        )
        .await
}

/// The analyzers available to request handlers. `remote` is `None` without an API key.
#[derive(Clone)]
pub struct Analyzers {
    pub local: Arc<dyn ResumeAnalyzer>,
    pub remote: Option<Arc<dyn ResumeAnalyzer>>,
}

impl Analyzers {
    pub fn select(&self, backend: Backend) -> Result<Arc<dyn ResumeAnalyzer>, AppError> {
        match backend {
            Backend::Local => Ok(self.local.clone()),
            Backend::Remote => self.remote.clone().ok_or(AppError::RemoteUnavailable),
        }
    }
}
