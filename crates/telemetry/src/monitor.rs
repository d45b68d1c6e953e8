//! Persistent cost monitor.
//!
//! Accumulates API spend across invocations in a small JSON state file:
//! read on startup, rewritten after every tracked call. A corrupt or
//! missing file resets the totals rather than failing the run.

use crate::pricing::PricingTable;
use crate::TelemetryError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Where the running total stands relative to the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    Within,
    /// Past 80% of the budget
    NearLimit,
    Exceeded,
}

/// The persisted state file shape.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CostFile {
    #[serde(default)]
    last_updated: String,
    #[serde(default)]
    total_cost: f64,
    #[serde(default)]
    request_count: u64,
}

/// A point-in-time view of the accumulated totals.
#[derive(Debug, Clone)]
pub struct CostSnapshot {
    pub total_cost: f64,
    pub request_count: u64,
    pub budget: f64,
    pub status: BudgetStatus,
}

/// Tracks per-call cost against a budget, persisting the running totals.
pub struct CostMonitor {
    pricing: PricingTable,
    budget: f64,
    path: PathBuf,
    state: Mutex<CostFile>,
}

impl CostMonitor {
    /// Create a monitor backed by the given state file, loading any
    /// previously accumulated totals.
    pub fn new(path: impl Into<PathBuf>, budget: f64) -> Self {
        Self::with_pricing(path, budget, PricingTable::with_defaults())
    }

    /// Create a monitor with a custom pricing table.
    pub fn with_pricing(path: impl Into<PathBuf>, budget: f64, pricing: PricingTable) -> Self {
        let path = path.into();
        let state = Self::load(&path);
        Self {
            pricing,
            budget,
            path,
            state: Mutex::new(state),
        }
    }

    fn load(path: &Path) -> CostFile {
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<CostFile>(&text) {
                Ok(state) => {
                    debug!(
                        total = state.total_cost,
                        requests = state.request_count,
                        "Loaded cost totals"
                    );
                    state
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt cost file, resetting totals");
                    CostFile::default()
                }
            },
            Err(_) => CostFile::default(),
        }
    }

    fn save(&self, state: &CostFile) -> Result<(), TelemetryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TelemetryError::CostFile(e.to_string()))?;
        }
        let text = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, text).map_err(|e| TelemetryError::CostFile(e.to_string()))?;
        Ok(())
    }

    /// Cost of a single call without recording it.
    pub fn calculate_cost(&self, model: &str, prompt_tokens: u32, completion_tokens: u32) -> f64 {
        self.pricing.compute_cost(model, prompt_tokens, completion_tokens)
    }

    /// Record a call: computes its cost, updates and persists the totals,
    /// and reports where the budget stands. Returns (cost, status).
    pub fn track(
        &self,
        model: &str,
        prompt_tokens: u32,
        completion_tokens: u32,
    ) -> Result<(f64, BudgetStatus), TelemetryError> {
        let cost = self.calculate_cost(model, prompt_tokens, completion_tokens);

        let mut state = self.state.lock().unwrap();
        state.total_cost += cost;
        state.request_count += 1;
        state.last_updated = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let status = self.status_for(state.total_cost);
        match status {
            BudgetStatus::Exceeded => warn!(
                total = state.total_cost,
                budget = self.budget,
                "Budget exceeded"
            ),
            BudgetStatus::NearLimit => warn!(
                total = state.total_cost,
                budget = self.budget,
                "Budget 80% reached"
            ),
            BudgetStatus::Within => {}
        }

        self.save(&state)?;
        Ok((cost, status))
    }

    fn status_for(&self, total: f64) -> BudgetStatus {
        if self.budget <= 0.0 {
            return BudgetStatus::Within;
        }
        if total > self.budget {
            BudgetStatus::Exceeded
        } else if total > self.budget * 0.8 {
            BudgetStatus::NearLimit
        } else {
            BudgetStatus::Within
        }
    }

    /// Current totals.
    pub fn snapshot(&self) -> CostSnapshot {
        let state = self.state.lock().unwrap();
        CostSnapshot {
            total_cost: state.total_cost,
            request_count: state.request_count,
            budget: self.budget,
            status: self.status_for(state.total_cost),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::ModelPricing;

    fn test_pricing() -> PricingTable {
        let table = PricingTable::empty();
        // $1/M both ways keeps arithmetic obvious
        table.set("test-model", ModelPricing::new(1.0, 1.0));
        table
    }

    #[test]
    fn track_accumulates_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("costs.json");

        let monitor = CostMonitor::with_pricing(&path, 5.0, test_pricing());
        let (cost, status) = monitor.track("test-model", 500_000, 500_000).unwrap();
        assert!((cost - 1.0).abs() < 1e-10);
        assert_eq!(status, BudgetStatus::Within);

        // A fresh monitor picks up the persisted totals
        let monitor2 = CostMonitor::with_pricing(&path, 5.0, test_pricing());
        let snap = monitor2.snapshot();
        assert!((snap.total_cost - 1.0).abs() < 1e-10);
        assert_eq!(snap.request_count, 1);
    }

    #[test]
    fn near_limit_then_exceeded() {
        let dir = tempfile::tempdir().unwrap();
        let monitor = CostMonitor::with_pricing(dir.path().join("c.json"), 1.0, test_pricing());

        // 0.9 of a $1 budget → near limit
        let (_, status) = monitor.track("test-model", 450_000, 450_000).unwrap();
        assert_eq!(status, BudgetStatus::NearLimit);

        // push past the budget
        let (_, status) = monitor.track("test-model", 200_000, 0).unwrap();
        assert_eq!(status, BudgetStatus::Exceeded);
    }

    #[test]
    fn corrupt_file_resets_totals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("costs.json");
        std::fs::write(&path, "{not json").unwrap();

        let monitor = CostMonitor::with_pricing(&path, 5.0, test_pricing());
        let snap = monitor.snapshot();
        assert_eq!(snap.total_cost, 0.0);
        assert_eq!(snap.request_count, 0);
    }

    #[test]
    fn missing_parent_dirs_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/costs.json");
        let monitor = CostMonitor::with_pricing(&path, 5.0, test_pricing());
        monitor.track("test-model", 1000, 1000).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn zero_budget_never_alerts() {
        let dir = tempfile::tempdir().unwrap();
        let monitor = CostMonitor::with_pricing(dir.path().join("c.json"), 0.0, test_pricing());
        let (_, status) = monitor.track("test-model", 1_000_000, 1_000_000).unwrap();
        assert_eq!(status, BudgetStatus::Within);
    }

    #[test]
    fn unknown_model_tracks_zero_cost() {
        let dir = tempfile::tempdir().unwrap();
        let monitor = CostMonitor::with_pricing(dir.path().join("c.json"), 5.0, test_pricing());
        let (cost, _) = monitor.track("unknown", 1_000_000, 0).unwrap();
        assert_eq!(cost, 0.0);
        assert_eq!(monitor.snapshot().request_count, 1);
    }
}
