//! LLM provider implementations for Scour.
//!
//! Two backends:
//! - [`OpenAiCompatProvider`] — any OpenAI-compatible `/v1/chat/completions`
//!   + `/v1/embeddings` endpoint
//! - [`OfflineProvider`] — deterministic, clearly-labeled simulated output
//!   for running without credentials
//!
//! Which one runs is an explicit mode decision made up front from
//! configuration, never a catch around a missing key.

pub mod offline;
pub mod openai_compat;

pub use offline::OfflineProvider;
pub use openai_compat::OpenAiCompatProvider;

use scour_config::AppConfig;
use scour_core::provider::Provider;
use std::sync::Arc;
use tracing::info;

/// Whether the system talks to a live LLM API or simulates locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderMode {
    Live,
    Offline,
}

impl ProviderMode {
    /// Decide the mode from configuration. Checked before any network call.
    pub fn detect(config: &AppConfig) -> Self {
        if config.has_api_key() {
            ProviderMode::Live
        } else {
            ProviderMode::Offline
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, ProviderMode::Live)
    }
}

impl std::fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderMode::Live => write!(f, "live"),
            ProviderMode::Offline => write!(f, "offline"),
        }
    }
}

/// Build the provider matching the detected mode.
pub fn build_provider(config: &AppConfig) -> Arc<dyn Provider> {
    match ProviderMode::detect(config) {
        ProviderMode::Live => {
            let key = config.api_key.clone().unwrap_or_default();
            Arc::new(OpenAiCompatProvider::new(&config.api_base, key))
        }
        ProviderMode::Offline => {
            info!("No API key configured — responses will be simulated");
            Arc::new(OfflineProvider::new())
        }
    }
}
