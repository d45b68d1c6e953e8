//! `scour search` — compare retrieval modes over the document corpus.

use clap::ValueEnum;
use scour_config::AppConfig;
use scour_core::provider::EmbeddingRequest;
use scour_providers::{build_provider, ProviderMode};
use scour_retrieval::{CorpusIndex, TextChunker};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// BM25 keyword ranking only
    Keyword,
    /// Embedding similarity ranking only
    Vector,
    /// RRF merge of both rankings
    Hybrid,
}

pub async fn run(query: &str, top_k: usize, mode: Mode) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    let chunker = TextChunker::new(config.retrieval.chunk_size, config.retrieval.chunk_overlap);
    let mut index = CorpusIndex::from_dir(&config.retrieval.docs_dir, &chunker)?;
    println!(
        "Indexed {} chunks from {}\n",
        index.len(),
        config.retrieval.docs_dir.display()
    );

    let provider = build_provider(&config);
    if !ProviderMode::detect(&config).is_live() {
        println!("[i] OPENAI_API_KEY is not set — vector scores are placeholders.\n");
    }

    // Embed corpus + query; failures degrade to the placeholder ranking
    let mut query_embedding = None;
    let texts: Vec<String> = index.chunks().iter().map(|c| c.content.clone()).collect();
    let mut inputs = texts;
    inputs.push(query.to_string());
    match provider
        .embed(EmbeddingRequest {
            model: config.agent.embedding_model.clone(),
            inputs,
        })
        .await
    {
        Ok(response) => {
            let mut embeddings = response.embeddings;
            if embeddings.len() == index.len() + 1 {
                query_embedding = embeddings.pop();
                index.attach_embeddings(embeddings)?;
            }
        }
        Err(e) => warn!(error = %e, "Embedding failed; using placeholder vector scores"),
    }

    println!("Query: '{query}'");
    println!("{}", "=".repeat(60));

    match mode {
        Mode::Keyword => {
            println!("\n[BM25 keyword ranking]");
            for (rank, (i, score)) in index.keyword_ranking(query).iter().take(top_k).enumerate() {
                let chunk = &index.chunks()[*i];
                println!(
                    "  {}. {} (score: {:.2}): {}",
                    rank + 1,
                    chunk.source,
                    score,
                    first_line(&chunk.content)
                );
            }
        }
        Mode::Vector => {
            println!("\n[Vector similarity ranking]");
            for (rank, (i, score)) in index
                .vector_ranking(query_embedding.as_deref())
                .iter()
                .take(top_k)
                .enumerate()
            {
                let chunk = &index.chunks()[*i];
                println!(
                    "  {}. {} (similarity: {:.2}): {}",
                    rank + 1,
                    chunk.source,
                    score,
                    first_line(&chunk.content)
                );
            }
        }
        Mode::Hybrid => {
            println!("\n[Hybrid ranking (RRF)]");
            let hits = index.hybrid_search(query, query_embedding.as_deref(), top_k);
            for (rank, hit) in hits.iter().enumerate() {
                println!(
                    "  {}. {} (similarity: {:.2}): {}",
                    rank + 1,
                    hit.source,
                    hit.similarity,
                    first_line(&hit.content)
                );
            }
        }
    }

    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
