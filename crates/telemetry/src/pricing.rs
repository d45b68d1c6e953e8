//! Built-in pricing table for common LLM models.
//!
//! Prices are in USD per 1 million tokens. Each model has an input and an
//! output price; custom pricing can be added at runtime.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Per-million-token pricing for a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Price per 1M input tokens in USD.
    pub input_per_m: f64,
    /// Price per 1M output tokens in USD.
    pub output_per_m: f64,
}

impl ModelPricing {
    pub fn new(input_per_m: f64, output_per_m: f64) -> Self {
        Self {
            input_per_m,
            output_per_m,
        }
    }

    /// Compute cost for the given token counts.
    pub fn cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        (input_tokens as f64 * self.input_per_m + output_tokens as f64 * self.output_per_m)
            / 1_000_000.0
    }
}

/// Thread-safe pricing table with built-in defaults and custom overrides.
pub struct PricingTable {
    prices: RwLock<HashMap<String, ModelPricing>>,
}

impl PricingTable {
    /// Create a pricing table with built-in model prices.
    pub fn with_defaults() -> Self {
        let mut prices = HashMap::new();

        prices.insert("gpt-4o".into(), ModelPricing::new(2.5, 10.0));
        prices.insert("gpt-4o-mini".into(), ModelPricing::new(0.15, 0.6));
        prices.insert("gpt-4.1".into(), ModelPricing::new(2.0, 8.0));
        prices.insert("gpt-4.1-mini".into(), ModelPricing::new(0.4, 1.6));
        prices.insert("gpt-5-nano".into(), ModelPricing::new(0.05, 0.4));
        prices.insert("o3-mini".into(), ModelPricing::new(1.1, 4.4));
        prices.insert("claude-sonnet-4".into(), ModelPricing::new(3.0, 15.0));
        prices.insert("claude-3.5-haiku".into(), ModelPricing::new(0.8, 4.0));
        prices.insert("text-embedding-3-small".into(), ModelPricing::new(0.02, 0.0));
        prices.insert("text-embedding-3-large".into(), ModelPricing::new(0.13, 0.0));

        Self {
            prices: RwLock::new(prices),
        }
    }

    /// Create an empty pricing table.
    pub fn empty() -> Self {
        Self {
            prices: RwLock::new(HashMap::new()),
        }
    }

    /// Look up pricing for a model. Returns None if not found.
    pub fn get(&self, model: &str) -> Option<ModelPricing> {
        self.prices.read().unwrap().get(model).cloned()
    }

    /// Add or update pricing for a model.
    pub fn set(&self, model: impl Into<String>, pricing: ModelPricing) {
        self.prices.write().unwrap().insert(model.into(), pricing);
    }

    /// Compute cost for a model call, returning 0.0 if model is unknown.
    ///
    /// Matching is tolerant: exact match first, then a stripped provider
    /// prefix (`openai/gpt-4o` → `gpt-4o`), then the longest table entry
    /// that is a prefix of the model name (so `gpt-4o-mini-2024-07-18`
    /// matches `gpt-4o-mini`).
    pub fn compute_cost(&self, model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
        let prices = self.prices.read().unwrap();

        if let Some(p) = prices.get(model) {
            return p.cost(input_tokens, output_tokens);
        }

        let bare = model.rsplit('/').next().unwrap_or(model).to_lowercase();
        if let Some(p) = prices.get(bare.as_str()) {
            return p.cost(input_tokens, output_tokens);
        }

        let mut best: Option<(&String, &ModelPricing)> = None;
        for (key, pricing) in prices.iter() {
            if bare.starts_with(&key.to_lowercase())
                && best.is_none_or(|(k, _)| key.len() > k.len())
            {
                best = Some((key, pricing));
            }
        }

        best.map(|(_, p)| p.cost(input_tokens, output_tokens))
            .unwrap_or(0.0)
    }

    /// List all known model names, sorted.
    pub fn models(&self) -> Vec<String> {
        let mut names: Vec<String> = self.prices.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.prices.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}
