//! Offline provider — deterministic simulated output for credential-less runs.
//!
//! Completions are clearly labeled as simulation so they can never be
//! mistaken for real model output. Embeddings are deterministic pseudo
//! vectors built from token hashes: texts that share tokens land near each
//! other, which is enough for the retrieval pipeline to run end-to-end in
//! tests and demos.

use async_trait::async_trait;
use scour_core::error::ProviderError;
use scour_core::message::{Message, Role};
use scour_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse, Usage,
};
use std::hash::{Hash, Hasher};

/// Dimension of the pseudo-embedding vectors.
const EMBED_DIM: usize = 64;

/// A provider that simulates responses locally.
pub struct OfflineProvider;

impl OfflineProvider {
    pub fn new() -> Self {
        Self
    }

    /// Deterministic bag-of-hashed-tokens embedding, L2-normalized.
    pub fn pseudo_embedding(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; EMBED_DIM];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() % EMBED_DIM as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }

    fn estimate_tokens(text: &str) -> u32 {
        (text.len() as u32).div_ceil(4)
    }
}

impl Default for OfflineProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("");

        let preview: String = last_user.chars().take(120).collect();
        let content = format!(
            "[simulation] No API key is configured, so this is a simulated response. \
             The request was: {preview}"
        );

        let prompt_tokens: u32 = request
            .messages
            .iter()
            .map(|m| Self::estimate_tokens(&m.content))
            .sum();
        let completion_tokens = Self::estimate_tokens(&content);

        Ok(ProviderResponse {
            message: Message::assistant(content),
            usage: Some(Usage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
            model: format!("{}-simulated", request.model),
        })
    }

    async fn embed(
        &self,
        request: EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, ProviderError> {
        Ok(EmbeddingResponse {
            embeddings: request
                .inputs
                .iter()
                .map(|text| Self::pseudo_embedding(text))
                .collect(),
            model: format!("{}-simulated", request.model),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Local cosine to avoid a dependency cycle with the retrieval crate
    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if na == 0.0 || nb == 0.0 {
            0.0
        } else {
            dot / (na * nb)
        }
    }

    #[tokio::test]
    async fn completion_is_labeled_simulation() {
        let provider = OfflineProvider::new();
        let request = ProviderRequest::new("gpt-4o-mini", vec![Message::user("hello there")]);
        let response = provider.complete(request).await.unwrap();
        assert!(response.message.content.starts_with("[simulation]"));
        assert!(response.message.content.contains("hello there"));
        assert!(response.model.ends_with("-simulated"));
        assert!(response.usage.is_some());
    }

    #[tokio::test]
    async fn embeddings_are_deterministic() {
        let provider = OfflineProvider::new();
        let request = EmbeddingRequest {
            model: "text-embedding-3-small".into(),
            inputs: vec!["password reset".into(), "password reset".into()],
        };
        let response = provider.embed(request).await.unwrap();
        assert_eq!(response.embeddings.len(), 2);
        assert_eq!(response.embeddings[0], response.embeddings[1]);
    }

    #[test]
    fn similar_texts_embed_closer_than_unrelated() {
        let a = OfflineProvider::pseudo_embedding("password reset steps");
        let b = OfflineProvider::pseudo_embedding("reset a forgotten password");
        let c = OfflineProvider::pseudo_embedding("quarterly revenue forecast");
        assert!(cosine(&a, &b) > cosine(&a, &c));
    }

    #[test]
    fn embeddings_are_unit_length() {
        let v = OfflineProvider::pseudo_embedding("some text here");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_text_embeds_to_zero_vector() {
        let v = OfflineProvider::pseudo_embedding("");
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
