//! Retrieval primitives for Scour.
//!
//! Pure-Rust implementations of the search stack the agent's corpus tools
//! are built on:
//! - Document loading and recursive character chunking
//! - A script-range tokenizer for keyword scoring
//! - Okapi BM25
//! - Cosine similarity
//! - Reciprocal Rank Fusion (RRF) for merging ranked result lists
//! - A hybrid `CorpusIndex` combining all of the above
//!
//! Everything here is in-memory and per-invocation; there is no persisted
//! index.

pub mod bm25;
pub mod chunker;
pub mod document;
pub mod fusion;
pub mod index;
pub mod similarity;
pub mod tokenize;

pub use bm25::Bm25Index;
pub use chunker::TextChunker;
pub use document::{load_corpus, DocumentChunk};
pub use fusion::reciprocal_rank_fusion;
pub use index::CorpusIndex;
pub use similarity::cosine_similarity;
pub use tokenize::tokenize;

/// The standard RRF constant.
pub const RRF_K: u32 = 60;
