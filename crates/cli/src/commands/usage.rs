//! `scour usage` — accumulated cost totals and budget state.

use scour_config::AppConfig;
use scour_telemetry::{BudgetStatus, CostMonitor};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let monitor = CostMonitor::new(&config.telemetry.cost_file, config.telemetry.budget_usd);
    let snapshot = monitor.snapshot();

    println!("Usage");
    println!("─────────────────────────────────────");
    println!("  Total cost:     ${:.4}", snapshot.total_cost);
    println!("  Requests:       {}", snapshot.request_count);
    println!("  Budget:         ${:.2}", snapshot.budget);

    if snapshot.budget > 0.0 {
        let pct = (snapshot.total_cost / snapshot.budget * 100.0).min(999.0);
        let label = match snapshot.status {
            BudgetStatus::Within => "ok",
            BudgetStatus::NearLimit => "past 80%",
            BudgetStatus::Exceeded => "EXCEEDED",
        };
        println!("  Budget used:    {pct:.1}% ({label})");
    }

    println!(
        "\n  State file: {}",
        config.telemetry.cost_file.display()
    );

    Ok(())
}
