//! # MS/AF Simulation Runner
//!
//! Runs the day-stepped engine from the command line.
//!
//! ## Usage
//!
//! ```bash
//! # Built-in order book, default config
//! msaf-sim --scenario mixed --days 360
//!
//! # Custom config and orders, with per-order ledger and JSONL time series
//! msaf-sim --config model.json --orders orders.json --details --time-series days.jsonl
//!
//! # Replay the price path against a CLMM position
//! msaf-sim --scenario whale-exit --clmm --clmm-lower 0.05 --clmm-upper 0.2
//!
//! # Same position on a seeded random walk instead
//! msaf-sim --clmm --random-walk --seed 42 --volatility 0.08
//! ```

mod report;
mod scenarios;
mod time_series;

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::Parser;
use msaf_engine::clmm::{price_series, ClmmParams, ClmmPosition};
use msaf_engine::price_path::random_walk;
use msaf_engine::{run_simulation_with_details, Config, Order, Pool};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use report::*;
use time_series::TimeSeriesRecorder;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "msaf-sim")]
#[command(version)]
#[command(about = "MS/AF token economic model simulator", long_about = None)]
struct Cli {
    /// Config JSON; missing sections take defaults
    #[arg(short, long, env = "MSAF_CONFIG")]
    config: Option<PathBuf>,

    /// Orders JSON (array of orders); overrides --scenario
    #[arg(short, long)]
    orders: Option<PathBuf>,

    /// Built-in order book
    #[arg(short, long, default_value = "mixed")]
    scenario: String,

    /// Days to simulate; defaults to the scenario's horizon
    #[arg(short, long)]
    days: Option<u32>,

    /// Include the per-order daily ledger in the report
    #[arg(long)]
    details: bool,

    /// Write one JSON line per day to this file
    #[arg(long)]
    time_series: Option<PathBuf>,

    /// Report path
    #[arg(long, default_value = "simulation-results/report.json")]
    out: PathBuf,

    /// Replay the price path against a CLMM position
    #[arg(long)]
    clmm: bool,

    /// Lower bound of the CLMM range; defaults to half the entry price
    #[arg(long)]
    clmm_lower: Option<f64>,

    /// Upper bound of the CLMM range; defaults to twice the entry price
    #[arg(long)]
    clmm_upper: Option<f64>,

    /// USDC deposited into the CLMM position
    #[arg(long, default_value = "10000")]
    clmm_deposit: f64,

    /// USDC traded through the pool per day, for fee accrual
    #[arg(long, default_value = "100000")]
    clmm_volume: f64,

    /// Use a seeded random walk instead of the engine's price path
    #[arg(long)]
    random_walk: bool,

    /// Random walk seed
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Daily random walk volatility
    #[arg(long, default_value = "0.05")]
    volatility: f64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_orders(path: &Path) -> Result<Vec<Order>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading orders from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing orders in {}", path.display()))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("serializing report")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    let (scenario_name, orders, default_days) = match &cli.orders {
        Some(path) => (path.display().to_string(), load_orders(path)?, 360),
        None => {
            let Some(scenario) = scenarios::find(&cli.scenario) else {
                bail!(
                    "unknown scenario `{}` (available: {})",
                    cli.scenario,
                    scenarios::names().join(", ")
                );
            };
            (scenario.name.to_string(), (scenario.orders)(), scenario.days)
        }
    };
    let days = cli.days.unwrap_or(default_days);

    info!(scenario = %scenario_name, orders = orders.len(), days, "msaf-sim starting");

    let pool = Pool::from_config(&config);
    let output = run_simulation_with_details(&orders, &config, days, &pool);
    let summary = RunSummary::from_days(&output.daily_simulations, &pool);

    // ─── Console Table ──────────────────────────────────────────────────

    println!("\n  MS/AF Simulation | scenario: {} | orders: {} | days: {}\n", scenario_name, orders.len(), days);
    println!("  {:<28} {:>18}", "Metric", "Value");
    println!("  {}", "-".repeat(48));
    println!("  {:<28} {:>18.6}", "Opening price", summary.opening_price);
    println!("  {:<28} {:>18.6}", "Closing price", summary.closing_price);
    println!("  {:<28} {:>17.2}%", "Price change", summary.price_change_pct);
    println!("  {:<28} {:>18.2}", "Tokens released", summary.total_released);
    println!("  {:<28} {:>18.2}", "Sold to market", summary.total_to_secondary_market);
    println!("  {:<28} {:>18.2}", "Burned", summary.total_burned);
    println!("  {:<28} {:>18.2}", "Buyback (USDC)", summary.total_buyback);
    println!("  {:<28} {:>18.2}", "Selling revenue (USDC)", summary.total_selling_revenue);
    println!("  {:<28} {:>18.2}", "User profit", summary.total_user_profit);
    println!("  {:<28} {:>18.2}", "Platform profit", summary.total_platform_profit);
    println!("  {:<28} {:>18.2}", "Broker profit", summary.total_broker_profit);
    println!("  {:<28} {:>18.2}", "Broker commission", summary.total_broker_commission);
    println!("  {:<28} {:>18.2}", "Trading fees", summary.total_trading_fee);
    println!("  {:<28} {:>18.2}", "Reserve", summary.total_reserve);
    println!("  {}\n", "-".repeat(48));

    // ─── Time Series ────────────────────────────────────────────────────

    if let Some(path) = &cli.time_series {
        let recorder = TimeSeriesRecorder::from_days(&output.daily_simulations);
        recorder
            .write_jsonl(path)
            .with_context(|| format!("writing time series {}", path.display()))?;
        println!("  Time series ({} days) saved to: {}", recorder.len(), path.display());
    }

    // ─── CLMM Replay ────────────────────────────────────────────────────

    let clmm = if cli.clmm {
        let entry_price = pool.price;
        let lower = cli.clmm_lower.unwrap_or(entry_price * 0.5);
        let upper = cli.clmm_upper.unwrap_or(entry_price * 2.0);
        let (source, prices) = if cli.random_walk {
            ("random_walk", random_walk(entry_price, days, cli.volatility, 0.0, cli.seed))
        } else {
            ("engine", price_series(&output.daily_simulations))
        };

        let position = ClmmPosition::open(cli.clmm_deposit, entry_price, lower, upper)
            .context("opening CLMM position")?;
        let params = ClmmParams { daily_volume_usdc: cli.clmm_volume, ..ClmmParams::default() };
        let report = ClmmReport::new(source, cli.clmm_deposit, entry_price, lower, upper, position.replay(&prices, &params));

        println!(
            "  CLMM [{:.4}, {:.4}] on {}: in range {}/{} days, IL {:.2}%, fees {:.2}, net PnL {:.2}",
            lower,
            upper,
            source,
            report.days_in_range,
            report.days.len(),
            report.final_impermanent_loss * 100.0,
            report.total_fees,
            report.net_pnl,
        );
        Some(report)
    } else {
        None
    };

    // ─── Write JSON Report ──────────────────────────────────────────────

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis().to_string())
        .unwrap_or_default();

    let prices: Vec<f64> = output.daily_simulations.iter().map(|d| d.price).collect();
    let releases: Vec<f64> = output.daily_simulations.iter().map(|d| d.tokens_released).collect();

    let report = RunReport {
        timestamp,
        version: env!("CARGO_PKG_VERSION"),
        scenario: scenario_name,
        order_count: orders.len(),
        summary,
        price: Stats::from_samples(&prices),
        daily_release: Stats::from_samples(&releases),
        order_summaries: output.order_summaries,
        order_ledger: cli.details.then_some(output.order_ledger),
        clmm,
    };

    write_json(&cli.out, &report)?;
    println!("  Report saved to: {}\n", cli.out.display());
    Ok(())
}
