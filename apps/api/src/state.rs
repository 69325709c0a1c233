use std::sync::Arc;

use crate::analysis::analyzer::Analyzers;
use crate::analysis::session::SessionRegistry;
use crate::scoring::catalog::Catalog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read-only after startup.
    pub catalog: Arc<Catalog>,
    /// Local analyzer always; remote only when a Gemini API key is configured.
    pub analyzers: Analyzers,
    pub sessions: Arc<SessionRegistry>,
}
