//! Swap Engine Binary
//!
//! Runs swaps through the execution service and exports the audit log.
//!
//! # Usage
//!
//! ```bash
//! swap-engine [--config PATH] [DECISION_ID:SELL:BUY:QUANTITY ...]
//! ```
//!
//! Without swap arguments a short demo batch runs against the configured
//! venue, including one repeated decision ID to show idempotency.
//!
//! # Environment Variables
//!
//! - `SWAP_ENGINE_CONFIG`: Config file path (default: config.yaml)
//! - `RUST_LOG`: Log filter, overrides `observability.logging.level`

use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use rust_decimal::Decimal;
use swap_engine::config::{Config, load_config, resolve_config_path};
use swap_engine::observability::{init_metrics, init_tracing};
use swap_engine::{ExecutionService, SwapRequest, build_venue};

/// Run two-leg swaps through the execution service.
#[derive(Debug, Parser)]
#[command(name = "swap-engine", version, about)]
struct Cli {
    /// Config file path
    #[arg(long, env = "SWAP_ENGINE_CONFIG")]
    config: Option<String>,

    /// Swaps to run; the demo batch runs when none are given
    #[arg(value_name = "DECISION_ID:SELL:BUY:QUANTITY", value_parser = parse_swap)]
    swaps: Vec<SwapRequest>,
}

/// Parse `DECISION_ID:SELL:BUY:QUANTITY`.
fn parse_swap(arg: &str) -> Result<SwapRequest, String> {
    let parts: Vec<&str> = arg.split(':').collect();
    let [decision_id, sell, buy, quantity] = parts.as_slice() else {
        return Err(format!("expected DECISION_ID:SELL:BUY:QUANTITY, got {arg:?}"));
    };
    let quantity = Decimal::from_str(quantity)
        .map_err(|e| format!("invalid quantity {quantity:?}: {e}"))?;

    Ok(SwapRequest::new(*decision_id, *sell, *buy, quantity))
}

fn demo_swaps() -> Vec<SwapRequest> {
    let quantity = Decimal::from(1000);
    vec![
        SwapRequest::new("demo-001", "ITSA3", "ITSA4", quantity),
        SwapRequest::new("demo-002", "PETR3", "PETR4", quantity),
        SwapRequest::new("demo-001", "ITSA3", "ITSA4", quantity),
    ]
}

fn load(cli: &Cli) -> anyhow::Result<(Config, String)> {
    let path = resolve_config_path(cli.config.as_deref());
    if cli.config.is_none() && !Path::new(&path).exists() {
        return Ok((Config::default(), format!("{path} (not found, using defaults)")));
    }
    let config = load_config(Some(&path)).with_context(|| format!("loading {path}"))?;
    Ok((config, path))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, source) = load(&cli)?;

    init_tracing(&config.observability.logging)?;
    tracing::info!(config = %source, venue = ?config.venue.kind, "Starting swap engine");

    if config.observability.metrics.enabled {
        init_metrics(&config.observability.metrics)?;
    }

    let requests = if cli.swaps.is_empty() {
        demo_swaps()
    } else {
        cli.swaps
    };

    let venue = build_venue(&config.venue)?;
    let service = ExecutionService::from_config(venue, &config);

    for request in requests {
        let result = service.execute_swap(request).await;
        println!(
            "{} {} {} net={} retries={} ({:?})",
            result.decision_id,
            result.execution_id,
            result.status.as_label(),
            result.net_proceeds,
            result.retry_count,
            result.execution_duration,
        );
        if let Some(error) = &result.error_details {
            println!("  {error}");
        }
    }

    println!("{}", serde_json::to_string_pretty(&service.get_metrics())?);

    service
        .export_audit_log(&config.audit.export_path)
        .with_context(|| format!("exporting audit log to {}", config.audit.export_path))?;

    tracing::info!("Swap engine stopped");
    Ok(())
}
