//! `scour research` — the corpus-first research agent.

use scour_agent::{LoopLimits, ResearchAgent, ResearchReport};
use scour_config::AppConfig;
use scour_core::error::AgentError;
use scour_core::event::EventBus;
use scour_core::provider::EmbeddingRequest;
use scour_providers::{build_provider, ProviderMode};
use scour_retrieval::{CorpusIndex, DocumentChunk, TextChunker};
use scour_telemetry::CostMonitor;
use scour_tools::{builtin_registry, ToolSetup};
use std::sync::Arc;
use tracing::{info, warn};

const DEMO_QUERIES: &[&str] = &[
    "How do I request approval to use generative AI for business tasks?",
    "What are the global generative AI regulation trends for 2024?",
    "What breaking changes should we watch for when upgrading our web framework?",
];

/// Built-in sample corpus, used when no docs directory is configured.
const SAMPLE_DOCS: &[(&str, &str)] = &[
    (
        "usage_guideline.txt",
        "The company's generative AI usage guideline prohibits prompts containing \
         customer data; confidential information must always be masked before use.",
    ),
    (
        "system_overview.txt",
        "The internal ChatGPT environment runs on a managed cloud service with data \
         kept in-region, reducing the risk of external leaks.",
    ),
    (
        "request_procedure.txt",
        "Business use of generative AI requires a request through the IT department \
         portal; approval takes up to three business days.",
    ),
    (
        "budget_plan.txt",
        "This fiscal year's AI budget is fifty million yen, allocated mostly to \
         licensing and infrastructure.",
    ),
];

pub async fn run(
    queries: Vec<String>,
    max_steps: Option<u32>,
    model: Option<String>,
    temperature: Option<f32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    let mode = ProviderMode::detect(&config);
    if !mode.is_live() {
        println!("[i] OPENAI_API_KEY is not set — agent decisions are simulated.");
    }
    if config.search.api_key.is_none() {
        println!("[i] SEARCH_API_KEY is not set — web results come from stub data.");
    }
    println!(
        "[{}] Issue search: {}",
        if config.github.token.is_some() { "✓" } else { "i" },
        if config.github.token.is_some() {
            "enabled"
        } else {
            "disabled (set GITHUB_TOKEN to enable)"
        }
    );
    println!();

    let provider = build_provider(&config);

    // ── Build the corpus index ──
    let chunker = TextChunker::new(config.retrieval.chunk_size, config.retrieval.chunk_overlap);
    let mut index = if config.retrieval.docs_dir.is_dir() {
        CorpusIndex::from_dir(&config.retrieval.docs_dir, &chunker)?
    } else {
        info!(
            dir = %config.retrieval.docs_dir.display(),
            "Docs directory not found; indexing the built-in sample corpus"
        );
        let mut chunks = Vec::new();
        for (source, content) in SAMPLE_DOCS {
            for (i, piece) in chunker.split(content).into_iter().enumerate() {
                chunks.push(DocumentChunk::new(*source, i, piece));
            }
        }
        CorpusIndex::build(chunks)
    };

    // Attach embeddings; on failure the index falls back to placeholder
    // vector ranking.
    let texts: Vec<String> = index.chunks().iter().map(|c| c.content.clone()).collect();
    match provider
        .embed(EmbeddingRequest {
            model: config.agent.embedding_model.clone(),
            inputs: texts,
        })
        .await
    {
        Ok(response) => index.attach_embeddings(response.embeddings)?,
        Err(e) => warn!(error = %e, "Corpus embedding failed; using keyword-weighted ranking"),
    }
    println!("[init] Indexed {} corpus chunks\n", index.len());

    // ── Wire the agent ──
    let registry = builtin_registry(
        Arc::new(index),
        provider.clone(),
        ToolSetup {
            search_api_key: config.search.api_key.clone(),
            search_endpoint: config.search.endpoint.clone(),
            search_max_results: config.search.max_results,
            github_token: config.github.token.clone(),
            embedding_model: config.agent.embedding_model.clone(),
            top_k: config.retrieval.top_k,
        },
    );

    let monitor = Arc::new(CostMonitor::new(
        &config.telemetry.cost_file,
        config.telemetry.budget_usd,
    ));

    let agent = ResearchAgent::new(
        provider,
        model.unwrap_or_else(|| config.agent.model.clone()),
        Arc::new(registry),
        Arc::new(EventBus::default()),
    )
    .with_temperature(temperature.unwrap_or(config.agent.temperature))
    .with_max_tokens(config.agent.max_tokens)
    .with_limits(LoopLimits {
        max_steps: max_steps.unwrap_or(config.agent.max_steps),
        min_tool_calls: config.agent.min_tool_calls,
    })
    .with_monitor(monitor);

    // ── Run each query with fresh state ──
    let queries: Vec<String> = if queries.is_empty() {
        DEMO_QUERIES.iter().map(|q| q.to_string()).collect()
    } else {
        queries
    };

    for query in &queries {
        println!("=== Research: corpus first, web to fill the gaps ===\n");
        println!("Question: {query}");
        println!("{}", "=".repeat(60));

        match agent.run(query).await {
            Ok(report) => print_report(&report),
            Err(scour_core::Error::Agent(AgentError::StepLimitReached { steps })) => {
                println!("\n[!] Step limit reached after {steps} steps without an answer.");
                println!("    Raise --max-steps or simplify the query.");
            }
            Err(e) => return Err(e.into()),
        }

        println!("{}\n", "-".repeat(60));
    }

    Ok(())
}

fn print_report(report: &ResearchReport) {
    println!("\n{}", "=".repeat(60));
    println!("Answer:\n");
    if report.answer.trim().is_empty() {
        println!("Final Answer: insufficient information was gathered.");
    } else {
        println!("{}", report.answer);
    }
    println!("\nConfidence: {:.2}", report.confidence);
    println!("Corpus findings: {}", report.corp_findings.len());
    println!("Web findings: {}", report.web_findings.len());
    println!("\n{}", report.summary_line());
}
