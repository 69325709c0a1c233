use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Only malformed values fail startup; everything has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Remote analysis is disabled when unset.
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    /// Per attempt, not per retry sequence.
    pub request_timeout: Duration,
    pub keyword_catalog_path: Option<PathBuf>,
    pub session_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            gemini_api_key: None,
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
            gemini_model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(30),
            keyword_catalog_path: None,
            session_capacity: 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            port: var("PORT")
                .map(|v| v.parse::<u16>())
                .transpose()
                .context("PORT must be a valid port number")?
                .unwrap_or(defaults.port),
            rust_log: var("RUST_LOG").unwrap_or(defaults.rust_log),
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_base_url: var("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            gemini_model: var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            request_timeout: var("REQUEST_TIMEOUT_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            keyword_catalog_path: var("KEYWORD_CATALOG_PATH").map(PathBuf::from),
            session_capacity: var("SESSION_CAPACITY")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("SESSION_CAPACITY must be a positive integer")?
                .unwrap_or(defaults.session_capacity),
        })
    }

    /// Full `generateContent` URL for the configured model.
    pub fn gemini_endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.gemini_base_url.trim_end_matches('/'),
            self.gemini_model
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(
            config.gemini_endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_overrides_are_read() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_BASE_URL", "http://localhost:4010/"),
            ("GEMINI_MODEL", "gemini-test"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("KEYWORD_CATALOG_PATH", "/etc/catalog.json"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(
            config.gemini_endpoint(),
            "http://localhost:4010/models/gemini-test:generateContent"
        );
        assert_eq!(
            config.keyword_catalog_path,
            Some(PathBuf::from("/etc/catalog.json"))
        );
    }

    #[test]
    fn test_blank_api_key_disables_remote() {
        let config = config_from(&[("GEMINI_API_KEY", "  ")]).unwrap();
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn test_invalid_port_fails() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
    }
}
