//! Document loading.

use scour_core::error::RetrievalError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// One chunk of a source document, ready for indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Source document name (file name)
    pub source: String,

    /// Position of this chunk within its source document
    pub chunk_index: usize,

    /// The chunk text
    pub content: String,

    /// Embedding vector, when one has been attached
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
}

impl DocumentChunk {
    pub fn new(source: impl Into<String>, chunk_index: usize, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            chunk_index,
            content: content.into(),
            embedding: None,
        }
    }
}

/// Load all `.txt` documents from a directory, sorted by file name.
///
/// Returns (file name, content) pairs. A missing directory and a directory
/// with no readable text files are distinct, actionable errors.
pub fn load_corpus(dir: &Path) -> Result<Vec<(String, String)>, RetrievalError> {
    if !dir.is_dir() {
        return Err(RetrievalError::DocsDirNotFound {
            path: dir.display().to_string(),
        });
    }

    let mut files: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| RetrievalError::Io(e.to_string()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();

    let mut documents = Vec::new();
    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let content = content.trim().to_string();
                if !content.is_empty() {
                    documents.push((name, content));
                }
            }
            Err(e) => {
                // One unreadable file shouldn't sink the corpus
                tracing::warn!(file = %name, error = %e, "Skipping unreadable document");
            }
        }
    }

    if documents.is_empty() {
        return Err(RetrievalError::EmptyCorpus {
            path: dir.display().to_string(),
        });
    }

    debug!(count = documents.len(), "Loaded corpus documents");
    Ok(documents)
}
