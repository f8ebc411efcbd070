//! Client configuration.
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! or missing file is valid. `VOCAB_API_URL` overrides the base URL.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::client::DEFAULT_BASE_URL;
use crate::error::ApiError;

pub const API_URL_ENV: &str = "VOCAB_API_URL";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PortalConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct QueryConfig {
    /// Quiet period before a search edit is committed.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Shortest non-empty search that may be committed.
    #[serde(default = "default_min_search_chars")]
    pub min_search_chars: usize,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_search_chars() -> usize {
    2
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_search_chars: default_min_search_chars(),
        }
    }
}

impl QueryConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl PortalConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ApiError> {
        toml::from_str(raw).map_err(|e| ApiError::Config(e.to_string()))
    }

    /// Reads `path` if given, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ApiError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| ApiError::Config(format!("{}: {e}", path.display())))?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env_override(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    fn apply_env_override(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
            self.api.base_url = url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = PortalConfig::from_toml_str("").unwrap();
        assert_eq!(config, PortalConfig::default());
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.query.debounce(), Duration::from_millis(300));
        assert_eq!(config.query.min_search_chars, 2);
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let config = PortalConfig::from_toml_str(
            r#"
            [query]
            debounce_ms = 150
            "#,
        )
        .unwrap();
        assert_eq!(config.query.debounce_ms, 150);
        assert_eq!(config.query.min_search_chars, 2);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = PortalConfig::from_toml_str("[api\nbase_url = 1").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn env_override_replaces_base_url() {
        let mut config = PortalConfig::default();
        config.apply_env_override(Some("http://remote:9000/api".to_string()));
        assert_eq!(config.api.base_url, "http://remote:9000/api");
        config.apply_env_override(Some("  ".to_string()));
        assert_eq!(config.api.base_url, "http://remote:9000/api");
        config.apply_env_override(None);
        assert_eq!(config.api.base_url, "http://remote:9000/api");
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = PortalConfig::load(Some(Path::new("/nonexistent/vocab.toml"))).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
