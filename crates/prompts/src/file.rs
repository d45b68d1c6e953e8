//! Prompt file parsing and output records.

use chrono::{DateTime, Utc};
use scour_core::error::PromptError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parsed header metadata: every declared key is kept verbatim, with typed
/// accessors for the well-known ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptMetadata {
    entries: BTreeMap<String, String>,
}

impl PromptMetadata {
    /// Raw lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of declared keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn model(&self) -> Option<&str> {
        self.get("model")
    }

    pub fn system(&self) -> Option<&str> {
        self.get("system")
    }

    pub fn temperature(&self) -> Option<f32> {
        self.get("temperature").and_then(|v| v.parse().ok())
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.get("max_tokens").and_then(|v| v.parse().ok())
    }

    /// How many times to run the prompt. Defaults to 1.
    pub fn repeat(&self) -> u32 {
        self.get("repeat").and_then(|v| v.parse().ok()).unwrap_or(1)
    }

    fn insert(&mut self, key: String, value: String) {
        self.entries.insert(key, value);
    }
}

/// A parsed prompt file: header metadata plus the prompt body.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptFile {
    pub metadata: PromptMetadata,
    pub body: String,
}

impl PromptFile {
    /// Parse prompt-file text.
    ///
    /// The header is only recognized when the very first line is `---`;
    /// otherwise the whole text is the body with empty metadata. The body is
    /// the text after the closing delimiter, with leading and trailing blank
    /// space trimmed.
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut metadata = PromptMetadata::default();
        let mut body_start = 0;

        if lines.first().map(|l| l.trim_end_matches('\r')) == Some("---") {
            for (i, line) in lines.iter().enumerate().skip(1) {
                let line = line.trim_end_matches('\r');
                if line == "---" {
                    body_start = i + 1;
                    break;
                }
                if let Some((key, value)) = line.split_once(':') {
                    metadata.insert(key.trim().to_string(), value.trim().to_string());
                }
            }
        }

        let body = lines[body_start..].join("\n").trim().to_string();
        Self { metadata, body }
    }

    /// Load `<dir>/<id>-prompt.txt` and parse it.
    pub fn load(dir: &Path, id: &str) -> Result<Self, PromptError> {
        let path = dir.join(format!("{id}-prompt.txt"));
        if !path.exists() {
            return Err(PromptError::NotFound {
                path: path.display().to_string(),
            });
        }
        let text = std::fs::read_to_string(&path).map_err(|e| PromptError::Io(e.to_string()))?;
        debug!(path = %path.display(), "Loaded prompt file");
        Ok(Self::parse(&text))
    }
}

/// A run result written back in the same delimited-header format, so the
/// parameters used travel with the generated text.
#[derive(Debug, Clone)]
pub struct OutputRecord {
    pub prompt_id: String,
    pub model: String,
    pub temperature: f32,
    pub timestamp: DateTime<Utc>,
    /// (prompt_tokens, completion_tokens) when the provider reported usage
    pub usage: Option<(u32, u32)>,
    pub text: String,
}

impl OutputRecord {
    /// Render the record as prompt-file-format text.
    pub fn render(&self) -> String {
        let mut lines = vec![
            "---".to_string(),
            format!("prompt_id: {}", self.prompt_id),
            format!("model: {}", self.model),
            format!("temperature: {}", self.temperature),
            format!("timestamp: {}", self.timestamp.format("%Y-%m-%d %H:%M:%S")),
        ];
        if let Some((prompt_tokens, completion_tokens)) = self.usage {
            lines.push(format!("prompt_tokens: {prompt_tokens}"));
            lines.push(format!("completion_tokens: {completion_tokens}"));
        }
        lines.push("---".to_string());
        lines.push(String::new());
        lines.push(self.text.clone());
        lines.join("\n")
    }

    /// Write the record to `<dir>/<prompt_id>-out.txt`, creating the
    /// directory if needed. Returns the path written.
    pub fn write(&self, dir: &Path) -> Result<PathBuf, PromptError> {
        std::fs::create_dir_all(dir).map_err(|e| PromptError::Io(e.to_string()))?;
        let path = dir.join(format!("{}-out.txt", self.prompt_id));
        std::fs::write(&path, self.render()).map_err(|e| PromptError::Io(e.to_string()))?;
        Ok(path)
    }
}
