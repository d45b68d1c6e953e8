//! Configuration loading, validation, and management for Scour.
//!
//! Loads configuration from `scour.toml` (or `$SCOUR_CONFIG`) with
//! environment variable overrides for the secrets:
//!
//! - `OPENAI_API_KEY` — LLM provider key (absent → offline simulation)
//! - `SCOUR_API_BASE` — alternate OpenAI-compatible endpoint
//! - `SEARCH_API_KEY` — web search provider key (absent → stub results)
//! - `GITHUB_TOKEN` — issue search token (absent → tool reports disabled)
//!
//! Every field has a default; a missing config file is not an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The root configuration structure. Maps directly to `scour.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM provider API key (normally set via OPENAI_API_KEY)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub github: GithubConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub paths: PathsConfig,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            agent: AgentConfig::default(),
            search: SearchConfig::default(),
            github: GithubConfig::default(),
            retrieval: RetrievalConfig::default(),
            telemetry: TelemetryConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Chat model
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding model for corpus/query vectors
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Step budget per research run (safety bound)
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Minimum tool invocations before the agent may settle on an answer
    #[serde(default = "default_min_tool_calls")]
    pub min_tool_calls: u32,
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1000
}
fn default_max_steps() -> u32 {
    15
}
fn default_min_tool_calls() -> u32 {
    2
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            embedding_model: default_embedding_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_steps: default_max_steps(),
            min_tool_calls: default_min_tool_calls(),
        }
    }
}

/// Web search provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search API key (normally set via SEARCH_API_KEY)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_search_results")]
    pub max_results: usize,
}

fn default_search_endpoint() -> String {
    "https://api.tavily.com/search".into()
}
fn default_search_results() -> usize {
    3
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_search_endpoint(),
            max_results: default_search_results(),
        }
    }
}

/// Issue-tracker integration settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GithubConfig {
    /// Personal access token (normally set via GITHUB_TOKEN)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Corpus retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Directory of .txt documents to index
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("docs")
}
fn default_chunk_size() -> usize {
    500
}
fn default_chunk_overlap() -> usize {
    50
}
fn default_top_k() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
        }
    }
}

/// Cost tracking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Spending budget in USD for alerting
    #[serde(default = "default_budget")]
    pub budget_usd: f64,

    /// Where the running totals persist
    #[serde(default = "default_cost_file")]
    pub cost_file: PathBuf,
}

fn default_budget() -> f64 {
    5.0
}
fn default_cost_file() -> PathBuf {
    PathBuf::from(".scour/cost_tracker.json")
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            budget_usd: default_budget(),
            cost_file: default_cost_file(),
        }
    }
}

/// Prompt / output directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: PathBuf,

    #[serde(default = "default_outputs_dir")]
    pub outputs_dir: PathBuf,
}

fn default_prompts_dir() -> PathBuf {
    PathBuf::from("prompts")
}
fn default_outputs_dir() -> PathBuf {
    PathBuf::from("outputs")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            prompts_dir: default_prompts_dir(),
            outputs_dir: default_outputs_dir(),
        }
    }
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_base", &self.api_base)
            .field("agent", &self.agent)
            .field("search_api_key", &redact(&self.search.api_key))
            .field("github_token", &redact(&self.github.token))
            .field("retrieval", &self.retrieval)
            .field("telemetry", &self.telemetry)
            .field("paths", &self.paths)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration: `$SCOUR_CONFIG` if set, else `scour.toml` if it
    /// exists, else defaults — then env overrides, then validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SCOUR_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("scour.toml"));
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific TOML file (no env overrides, no validation).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Apply environment variable overrides for secrets and endpoints.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Ok(base) = std::env::var("SCOUR_API_BASE") {
            if !base.is_empty() {
                self.api_base = base;
            }
        }
        if let Ok(key) = std::env::var("SEARCH_API_KEY") {
            if !key.is_empty() {
                self.search.api_key = Some(key);
            }
        }
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            if !token.is_empty() {
                self.github.token = Some(token);
            }
        }
    }

    /// Whether an LLM API key is configured (live vs offline mode input).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Validate the loaded settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.agent.temperature) {
            return Err(ConfigError::Invalid(format!(
                "agent.temperature must be in [0, 2], got {}",
                self.agent.temperature
            )));
        }
        if self.agent.max_steps == 0 {
            return Err(ConfigError::Invalid("agent.max_steps must be > 0".into()));
        }
        if self.retrieval.chunk_size == 0 {
            return Err(ConfigError::Invalid("retrieval.chunk_size must be > 0".into()));
        }
        if self.retrieval.chunk_overlap >= self.retrieval.chunk_size {
            return Err(ConfigError::Invalid(format!(
                "retrieval.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.retrieval.chunk_overlap, self.retrieval.chunk_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.agent.max_steps, 15);
        assert_eq!(config.agent.min_tool_calls, 2);
        assert_eq!(config.retrieval.chunk_size, 500);
        assert!(!config.has_api_key());
    }

    #[test]
    fn parse_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scour.toml");
        std::fs::write(
            &path,
            r#"
[agent]
model = "gpt-4o"
max_steps = 20

[retrieval]
docs_dir = "corpus"
"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.agent.model, "gpt-4o");
        assert_eq!(config.agent.max_steps, 20);
        // Untouched sections keep defaults
        assert_eq!(config.agent.min_tool_calls, 2);
        assert_eq!(config.retrieval.docs_dir, PathBuf::from("corpus"));
        assert!((config.telemetry.budget_usd - 5.0).abs() < 1e-10);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.agent.temperature = 3.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk() {
        let mut config = AppConfig::default();
        config.retrieval.chunk_overlap = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_max_steps_rejected() {
        let mut config = AppConfig::default();
        config.agent.max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = AppConfig::default();
        config.api_key = Some("sk-secret-value".into());
        config.github.token = Some("ghp_secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret-value"));
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn missing_file_errors_with_path() {
        let err = AppConfig::from_file(Path::new("/no/such/scour.toml")).unwrap_err();
        assert!(err.to_string().contains("scour.toml"));
    }
}
