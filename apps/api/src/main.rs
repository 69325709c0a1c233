mod analysis;
mod config;
mod errors;
mod llm_client;
mod routes;
mod scoring;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::analyzer::{Analyzers, LocalAnalyzer, RemoteAnalyzer, ResumeAnalyzer};
use crate::analysis::session::SessionRegistry;
use crate::config::Config;
use crate::llm_client::transport::ReqwestTransport;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::scoring::catalog::Catalog;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer v{}", env!("CARGO_PKG_VERSION"));

    let catalog = Arc::new(load_catalog(&config)?);
    info!(
        "Keyword catalog loaded: {} sectors, {} job profiles",
        catalog.sectors.len(),
        catalog.job_profiles.len()
    );

    let remote = build_remote_analyzer(&config)?;

    let state = AppState {
        analyzers: Analyzers {
            local: Arc::new(LocalAnalyzer::new(catalog.clone())),
            remote,
        },
        catalog,
        sessions: Arc::new(SessionRegistry::new(config.session_capacity)),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn load_catalog(config: &Config) -> Result<Catalog> {
    match &config.keyword_catalog_path {
        Some(path) => Catalog::from_json_file(path)
            .with_context(|| format!("Failed to load keyword catalog from {}", path.display())),
        None => Ok(Catalog::builtin()),
    }
}

/// Builds the Gemini-backed analyzer, or `None` when no API key is configured.
fn build_remote_analyzer(config: &Config) -> Result<Option<Arc<dyn ResumeAnalyzer>>> {
    let Some(api_key) = config.gemini_api_key.clone() else {
        warn!("GEMINI_API_KEY is not set; remote analysis disabled");
        return Ok(None);
    };

    let transport = ReqwestTransport::new(config.gemini_endpoint(), api_key, config.request_timeout)
        .context("Failed to build HTTP client")?;
    info!(
        "Gemini client initialized (model: {}, timeout: {}s)",
        config.gemini_model,
        config.request_timeout.as_secs()
    );

    let client = GeminiClient::new(Arc::new(transport));
    Ok(Some(Arc::new(RemoteAnalyzer::new(client))))
}
