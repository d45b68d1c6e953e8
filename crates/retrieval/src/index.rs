//! The hybrid corpus index — keyword + vector search behind one facade.

use crate::bm25::Bm25Index;
use crate::chunker::TextChunker;
use crate::document::{load_corpus, DocumentChunk};
use crate::fusion::reciprocal_rank_fusion;
use crate::similarity::cosine_similarity;
use crate::tokenize::tokenize;
use crate::RRF_K;
use scour_core::error::RetrievalError;
use scour_core::tool::CorpusHit;
use std::path::Path;
use tracing::{debug, info};

/// An in-memory index over chunked documents.
///
/// Keyword ranking always works (BM25 over the chunk text). Vector ranking
/// needs embeddings attached; without them it falls back to a fixed,
/// clearly-logged placeholder ranking so the pipeline still runs end-to-end
/// offline — documented behavior, not a fault.
pub struct CorpusIndex {
    chunks: Vec<DocumentChunk>,
    bm25: Bm25Index,
}

impl CorpusIndex {
    /// Build an index over pre-chunked documents.
    pub fn build(chunks: Vec<DocumentChunk>) -> Self {
        let tokenized: Vec<Vec<String>> =
            chunks.iter().map(|c| tokenize(&c.content)).collect();
        let bm25 = Bm25Index::build(&tokenized);
        debug!(chunks = chunks.len(), "Built corpus index");
        Self { chunks, bm25 }
    }

    /// Load `.txt` documents from a directory, chunk them, and index.
    pub fn from_dir(dir: &Path, chunker: &TextChunker) -> Result<Self, RetrievalError> {
        let documents = load_corpus(dir)?;
        let mut chunks = Vec::new();
        for (source, content) in documents {
            for (i, piece) in chunker.split(&content).into_iter().enumerate() {
                chunks.push(DocumentChunk::new(source.clone(), i, piece));
            }
        }
        info!(chunks = chunks.len(), dir = %dir.display(), "Indexed corpus");
        Ok(Self::build(chunks))
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[DocumentChunk] {
        &self.chunks
    }

    /// Attach one embedding per chunk, in chunk order.
    pub fn attach_embeddings(&mut self, embeddings: Vec<Vec<f32>>) -> Result<(), RetrievalError> {
        if embeddings.len() != self.chunks.len() {
            return Err(RetrievalError::EmbeddingFailed(format!(
                "expected {} embeddings, got {}",
                self.chunks.len(),
                embeddings.len()
            )));
        }
        for (chunk, embedding) in self.chunks.iter_mut().zip(embeddings) {
            chunk.embedding = Some(embedding);
        }
        Ok(())
    }

    pub fn has_embeddings(&self) -> bool {
        !self.chunks.is_empty() && self.chunks.iter().all(|c| c.embedding.is_some())
    }

    /// BM25 ranking over chunks. Zero-score chunks are excluded — a chunk
    /// with no lexical overlap holds no rank.
    pub fn keyword_ranking(&self, query: &str) -> Vec<(usize, f32)> {
        self.bm25
            .ranking(&tokenize(query))
            .into_iter()
            .filter(|(_, score)| *score > 0.0)
            .collect()
    }

    /// Per-chunk similarity to the query embedding, in chunk order.
    ///
    /// Without a query embedding or chunk embeddings this is the placeholder
    /// ranking: descending pseudo-scores in corpus order.
    pub fn vector_similarities(&self, query_embedding: Option<&[f32]>) -> Vec<f32> {
        match query_embedding {
            Some(query) if self.has_embeddings() => self
                .chunks
                .iter()
                .map(|c| {
                    let emb = c.embedding.as_deref().unwrap_or(&[]);
                    cosine_similarity(emb, query)
                })
                .collect(),
            _ => {
                info!("No embeddings available; vector ranking uses placeholder scores");
                (0..self.chunks.len())
                    .map(|i| (0.9 - 0.01 * i as f32).max(0.5))
                    .collect()
            }
        }
    }

    /// Chunks ranked by similarity descending.
    pub fn vector_ranking(&self, query_embedding: Option<&[f32]>) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self
            .vector_similarities(query_embedding)
            .into_iter()
            .enumerate()
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }

    /// Hybrid search: RRF-merge the keyword and vector rankings and return
    /// the top chunks as corpus hits. Each hit's similarity is its vector
    /// similarity clamped to [0, 1].
    pub fn hybrid_search(
        &self,
        query: &str,
        query_embedding: Option<&[f32]>,
        top_k: usize,
    ) -> Vec<CorpusHit> {
        if self.chunks.is_empty() {
            return Vec::new();
        }

        let similarities = self.vector_similarities(query_embedding);

        let keyword_list: Vec<usize> = self
            .keyword_ranking(query)
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        let mut vector_list: Vec<(usize, f32)> =
            similarities.iter().copied().enumerate().collect();
        vector_list.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let vector_list: Vec<usize> = vector_list.into_iter().map(|(i, _)| i).collect();

        let merged = reciprocal_rank_fusion(&[keyword_list, vector_list], RRF_K);

        merged
            .into_iter()
            .take(top_k)
            .map(|(i, _)| {
                let chunk = &self.chunks[i];
                CorpusHit {
                    content: chunk.content.clone(),
                    source: chunk.source.clone(),
                    page: Some((chunk.chunk_index + 1).to_string()),
                    similarity: similarities[i].clamp(0.0, 1.0),
                }
            })
            .collect()
    }
}
