//! Cost tracking for Scour.
//!
//! Provides a built-in model pricing table and a cost monitor that keeps a
//! running total across invocations: the accumulated cost and request count
//! persist in a small JSON file, read on startup and rewritten after each
//! tracked call. Crossing 80% of the configured budget warns; crossing 100%
//! flags the call as over budget.

pub mod monitor;
pub mod pricing;

pub use monitor::{BudgetStatus, CostMonitor, CostSnapshot};
pub use pricing::{ModelPricing, PricingTable};

/// Errors from the telemetry subsystem.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("cost file error: {0}")]
    CostFile(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
