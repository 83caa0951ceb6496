use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

const DEFAULT_FILE: &str = "exec_resolver";
const ENV_PREFIX: &str = "EXEC_RESOLVER";

/// Runtime settings: defaults, then `exec_resolver.toml`, then `EXEC_RESOLVER_*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub serper_api_key: Option<String>,
    pub spider_api_key: Option<String>,
    pub llm_endpoint: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub user_agent: String,
    /// Concurrent extraction units per request.
    pub concurrency: usize,
    /// Ranked leadership pages fetched per request.
    pub max_pages: usize,
    pub max_discovered_pages: usize,
    pub max_documents: usize,
    pub fetch_timeout_secs: u64,
    pub document_timeout_secs: u64,
    pub analysis_timeout_secs: u64,
    /// Pages yielding fewer records than this are sent to the model.
    pub model_fallback_threshold: usize,
    pub scope_floor: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            serper_api_key: None,
            spider_api_key: None,
            llm_endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            llm_api_key: None,
            llm_model: "gpt-4o-mini".to_string(),
            user_agent: "Mozilla/5.0 (compatible; exec_resolver/0.1)".to_string(),
            concurrency: 5,
            max_pages: 5,
            max_discovered_pages: 10,
            max_documents: 3,
            fetch_timeout_secs: 10,
            document_timeout_secs: 15,
            analysis_timeout_secs: 60,
            model_fallback_threshold: 3,
            scope_floor: crate::scope::DEFAULT_FLOOR,
        }
    }
}

impl Settings {
    /// Load from an explicit file, or the optional default file, plus environment.
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };
        Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn from_toml(text: &str) -> Result<Settings> {
        Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn document_timeout(&self) -> Duration {
        Duration::from_secs(self.document_timeout_secs)
    }

    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.concurrency, 5);
        assert_eq!(s.max_pages, 5);
        assert_eq!(s.max_discovered_pages, 10);
        assert_eq!(s.max_documents, 3);
        assert_eq!(s.model_fallback_threshold, 3);
        assert_eq!(s.fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn toml_overrides_some_fields() {
        let s = Settings::from_toml(
            r#"
            serper_api_key = "abc"
            concurrency = 2
            scope_floor = 8
            "#,
        )
        .unwrap();
        assert_eq!(s.serper_api_key.as_deref(), Some("abc"));
        assert_eq!(s.concurrency, 2);
        assert_eq!(s.scope_floor, 8);
        assert_eq!(s.max_pages, 5);
        assert!(s.spider_api_key.is_none());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }
}
