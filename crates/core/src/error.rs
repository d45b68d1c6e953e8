//! Error types for the Scour domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Scour operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool disabled: {tool_name} — {reason}")]
    Disabled { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Documents directory not found: {path}")]
    DocsDirNotFound { path: String },

    #[error("No readable documents in: {path}")]
    EmptyCorpus { path: String },

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("I/O error: {0}")]
    Io(String),
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt file not found: {path} (create it or pass a different id)")]
    NotFound { path: String },

    #[error("Template variable not provided: {name}")]
    MissingVariable { name: String },

    #[error("I/O error: {0}")]
    Io(String),
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(
        "Step limit reached after {steps} steps — raise --max-steps or simplify the query"
    )]
    StepLimitReached { steps: u32 },

    #[error("No answer produced: {0}")]
    NoAnswer(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_status() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn step_limit_error_is_actionable() {
        let err = Error::Agent(AgentError::StepLimitReached { steps: 15 });
        assert!(err.to_string().contains("15"));
        assert!(err.to_string().contains("max-steps"));
    }

    #[test]
    fn prompt_not_found_carries_path() {
        let err = Error::Prompt(PromptError::NotFound {
            path: "prompts/2-1-2-prompt.txt".into(),
        });
        assert!(err.to_string().contains("2-1-2-prompt.txt"));
    }
}
