//! Okapi BM25 scoring over a tokenized corpus.

use std::collections::HashMap;

const DEFAULT_K1: f32 = 1.5;
const DEFAULT_B: f32 = 0.75;

/// An in-memory BM25 index.
///
/// Uses the non-negative IDF form `ln(1 + (N - df + 0.5) / (df + 0.5))`, so
/// a term that appears in every document contributes ~0 rather than a
/// negative score. A document containing all query terms therefore always
/// scores at least as high as one containing none, at equal length.
pub struct Bm25Index {
    k1: f32,
    b: f32,
    /// Per-document term frequencies
    doc_terms: Vec<HashMap<String, u32>>,
    /// Per-document token counts
    doc_lens: Vec<f32>,
    /// Average document length
    avgdl: f32,
    /// Document frequency per term
    df: HashMap<String, u32>,
}

impl Bm25Index {
    /// Build an index from tokenized documents with default parameters.
    pub fn build(documents: &[Vec<String>]) -> Self {
        Self::with_params(documents, DEFAULT_K1, DEFAULT_B)
    }

    /// Build an index with explicit k1 / b parameters.
    pub fn with_params(documents: &[Vec<String>], k1: f32, b: f32) -> Self {
        let mut doc_terms = Vec::with_capacity(documents.len());
        let mut doc_lens = Vec::with_capacity(documents.len());
        let mut df: HashMap<String, u32> = HashMap::new();

        for tokens in documents {
            let mut terms: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *terms.entry(token.clone()).or_insert(0) += 1;
            }
            for term in terms.keys() {
                *df.entry(term.clone()).or_insert(0) += 1;
            }
            doc_lens.push(tokens.len() as f32);
            doc_terms.push(terms);
        }

        let avgdl = if doc_lens.is_empty() {
            0.0
        } else {
            doc_lens.iter().sum::<f32>() / doc_lens.len() as f32
        };

        Self {
            k1,
            b,
            doc_terms,
            doc_lens,
            avgdl,
            df,
        }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.doc_terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_terms.is_empty()
    }

    fn idf(&self, term: &str) -> f32 {
        let n = self.doc_terms.len() as f32;
        let df = self.df.get(term).copied().unwrap_or(0) as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// BM25 score of every document against the query tokens, in document
    /// order.
    pub fn scores(&self, query_tokens: &[String]) -> Vec<f32> {
        if self.doc_terms.is_empty() || query_tokens.is_empty() {
            return vec![0.0; self.doc_terms.len()];
        }

        let mut scores = vec![0.0f32; self.doc_terms.len()];
        for term in query_tokens {
            let idf = self.idf(term);
            for (i, terms) in self.doc_terms.iter().enumerate() {
                let tf = terms.get(term).copied().unwrap_or(0) as f32;
                if tf == 0.0 {
                    continue;
                }
                let dl = self.doc_lens[i];
                let norm = 1.0 - self.b + self.b * dl / self.avgdl.max(f32::MIN_POSITIVE);
                scores[i] += idf * tf * (self.k1 + 1.0) / (tf + self.k1 * norm);
            }
        }
        scores
    }

    /// Documents ranked by score descending. Ties keep document order.
    pub fn ranking(&self, query_tokens: &[String]) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self
            .scores(query_tokens)
            .into_iter()
            .enumerate()
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}
