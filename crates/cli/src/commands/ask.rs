//! `scour ask` — run a prompt file through the LLM and record the output.

use chrono::Utc;
use scour_config::AppConfig;
use scour_core::message::Message;
use scour_core::provider::ProviderRequest;
use scour_prompts::{OutputRecord, PromptFile, PromptTemplate};
use scour_providers::{build_provider, ProviderMode};
use scour_telemetry::CostMonitor;
use std::collections::HashMap;

pub async fn run(
    file_id: &str,
    temperature: Option<f32>,
    model: Option<String>,
    system: Option<String>,
    vars: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let prompt = PromptFile::load(&config.paths.prompts_dir, file_id)?;

    // `--var key=value` renders the body as a template
    let body = if vars.is_empty() {
        prompt.body.clone()
    } else {
        let mut values = HashMap::new();
        for var in &vars {
            let Some((key, value)) = var.split_once('=') else {
                return Err(format!("--var expects KEY=VALUE, got '{var}'").into());
            };
            values.insert(key.trim().to_string(), value.to_string());
        }
        let names: Vec<String> = values.keys().cloned().collect();
        PromptTemplate::new(&prompt.body, names).render(&values)?
    };

    // Precedence: CLI flag > prompt file header > config default
    let model = model
        .or_else(|| prompt.metadata.model().map(str::to_string))
        .unwrap_or_else(|| config.agent.model.clone());
    let temperature = temperature
        .or_else(|| prompt.metadata.temperature())
        .unwrap_or(config.agent.temperature);
    let system = system.or_else(|| prompt.metadata.system().map(str::to_string));
    let max_tokens = prompt
        .metadata
        .max_tokens()
        .unwrap_or(config.agent.max_tokens);
    let repeat = prompt.metadata.repeat();

    let mode = ProviderMode::detect(&config);
    if !mode.is_live() {
        println!("[i] OPENAI_API_KEY is not set — output below is simulated.");
    }
    let provider = build_provider(&config);
    let monitor = CostMonitor::new(&config.telemetry.cost_file, config.telemetry.budget_usd);

    println!("{}", "=".repeat(60));
    println!("Prompt: {file_id}  (model: {model}, temperature: {temperature})");
    println!("{}", "=".repeat(60));

    for round in 1..=repeat {
        let mut messages = Vec::new();
        if let Some(system) = &system {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(&body));

        let request = ProviderRequest {
            model: model.clone(),
            messages,
            temperature,
            max_tokens: Some(max_tokens),
            tools: vec![],
        };

        let response = provider.complete(request).await?;

        let usage = response.usage.map(|u| (u.prompt_tokens, u.completion_tokens));
        if let Some((prompt_tokens, completion_tokens)) = usage {
            let (cost, _) = monitor.track(&response.model, prompt_tokens, completion_tokens)?;
            tracing::debug!(cost, "Tracked request cost");
        }

        if repeat > 1 {
            println!("--- run {round}/{repeat} ---");
        }
        println!("{}", response.message.content);

        let record = OutputRecord {
            prompt_id: if repeat > 1 {
                format!("{file_id}-run{round}")
            } else {
                file_id.to_string()
            },
            model: response.model.clone(),
            temperature,
            timestamp: Utc::now(),
            usage,
            text: response.message.content.clone(),
        };
        let path = record.write(&config.paths.outputs_dir)?;
        println!("\n[saved] {}", path.display());
    }

    Ok(())
}
