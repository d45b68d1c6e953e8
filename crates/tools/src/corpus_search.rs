//! Corpus search tool — hybrid retrieval over the internal document index.

use async_trait::async_trait;
use scour_core::error::ToolError;
use scour_core::provider::{EmbeddingRequest, Provider};
use scour_core::tool::{Tool, ToolOutput};
use scour_retrieval::CorpusIndex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Searches the internal corpus, combining keyword and vector rankings.
pub struct CorpusSearchTool {
    index: Arc<CorpusIndex>,
    provider: Arc<dyn Provider>,
    embedding_model: String,
    default_top_k: usize,
}

impl CorpusSearchTool {
    pub fn new(
        index: Arc<CorpusIndex>,
        provider: Arc<dyn Provider>,
        embedding_model: impl Into<String>,
        default_top_k: usize,
    ) -> Self {
        Self {
            index,
            provider,
            embedding_model: embedding_model.into(),
            default_top_k: default_top_k.max(1),
        }
    }

    /// Embed the query, or fall back to the index's placeholder ranking.
    async fn query_embedding(&self, query: &str) -> Option<Vec<f32>> {
        if !self.index.has_embeddings() {
            return None;
        }
        match self
            .provider
            .embed(EmbeddingRequest {
                model: self.embedding_model.clone(),
                inputs: vec![query.to_string()],
            })
            .await
        {
            Ok(response) => response.embeddings.into_iter().next(),
            Err(e) => {
                warn!(error = %e, "Query embedding failed, falling back to keyword-only ranking");
                None
            }
        }
    }
}

#[async_trait]
impl Tool for CorpusSearchTool {
    fn name(&self) -> &str {
        "corpus_search"
    }

    fn description(&self) -> &str {
        "Search the internal document corpus. Returns chunks with their source \
         document and a similarity score between 0 and 1. Use this before any \
         external search."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "top_k": {
                    "type": "integer",
                    "description": "Maximum number of chunks to return (default 3)",
                    "default": 3
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;
        let top_k = arguments["top_k"]
            .as_u64()
            .map(|k| k as usize)
            .unwrap_or(self.default_top_k)
            .clamp(1, 10);

        let embedding = self.query_embedding(query).await;
        let hits = self
            .index
            .hybrid_search(query, embedding.as_deref(), top_k);

        debug!(query, hits = hits.len(), "Corpus search complete");
        Ok(ToolOutput::Corpus(hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scour_core::error::ProviderError;
    use scour_core::message::Message;
    use scour_core::provider::{EmbeddingResponse, ProviderRequest, ProviderResponse};
    use scour_retrieval::DocumentChunk;

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Provider for FixedEmbedder {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            Ok(ProviderResponse {
                message: Message::assistant(""),
                usage: None,
                model: "fixed".into(),
            })
        }
        async fn embed(
            &self,
            request: EmbeddingRequest,
        ) -> Result<EmbeddingResponse, ProviderError> {
            Ok(EmbeddingResponse {
                embeddings: request.inputs.iter().map(|_| self.0.clone()).collect(),
                model: "fixed".into(),
            })
        }
    }

    fn index_with_embeddings() -> CorpusIndex {
        let mut index = CorpusIndex::build(vec![
            DocumentChunk::new("guide.txt", 0, "password reset through the portal"),
            DocumentChunk::new("menu.txt", 0, "cafeteria menu for the week"),
        ]);
        index
            .attach_embeddings(vec![vec![1.0, 0.0], vec![0.0, 1.0]])
            .unwrap();
        index
    }

    #[tokio::test]
    async fn returns_corpus_hits() {
        let tool = CorpusSearchTool::new(
            Arc::new(index_with_embeddings()),
            Arc::new(FixedEmbedder(vec![1.0, 0.0])),
            "embed-model",
            3,
        );
        let output = tool
            .execute(serde_json::json!({"query": "password reset"}))
            .await
            .unwrap();
        match output {
            ToolOutput::Corpus(hits) => {
                assert!(!hits.is_empty());
                assert_eq!(hits[0].source, "guide.txt");
                assert!(hits[0].similarity >= 0.99);
            }
            other => panic!("expected corpus output, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_query_is_invalid_arguments() {
        let tool = CorpusSearchTool::new(
            Arc::new(CorpusIndex::build(Vec::new())),
            Arc::new(FixedEmbedder(vec![1.0])),
            "embed-model",
            3,
        );
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn top_k_limits_results() {
        let tool = CorpusSearchTool::new(
            Arc::new(index_with_embeddings()),
            Arc::new(FixedEmbedder(vec![1.0, 0.0])),
            "embed-model",
            3,
        );
        let output = tool
            .execute(serde_json::json!({"query": "password", "top_k": 1}))
            .await
            .unwrap();
        match output {
            ToolOutput::Corpus(hits) => assert_eq!(hits.len(), 1),
            other => panic!("expected corpus output, got {other:?}"),
        }
    }
}
