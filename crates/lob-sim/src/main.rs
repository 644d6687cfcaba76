//! Simulation CLI.
//!
//! Runs a seeded market simulation against an in-process engine, writes
//! the trade log as CSV, and optionally a JSON run summary.
//!
//! ```bash
//! cargo run -p lob-sim -- --mode mean-reverting --steps 100000 \
//!     --trades-out trades.csv --summary-out summary.json
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lob_sim::{MarketSimulator, SimulationMode, SimulatorConfig};

#[derive(Debug, Parser)]
#[command(name = "lob-sim", about = "Stochastic market simulation driver")]
struct Cli {
    /// Market scenario.
    #[arg(long, value_enum, default_value_t = SimulationMode::Random)]
    mode: SimulationMode,

    /// Number of simulation steps (one order or cancel per step).
    #[arg(long, default_value_t = 100_000)]
    steps: u64,

    #[arg(long, default_value_t = 50_000.0)]
    initial_price: f64,

    /// Per-step volatility as a fraction of price.
    #[arg(long, default_value_t = 0.002)]
    volatility: f64,

    #[arg(long, default_value_t = 0.01)]
    tick_size: f64,

    /// Fraction of orders submitted as market orders.
    #[arg(long, default_value_t = 0.1)]
    market_order_pct: f64,

    /// Fraction of steps that cancel a resting order.
    #[arg(long, default_value_t = 0.1)]
    cancel_pct: f64,

    /// Per-step drift, trending mode only.
    #[arg(long, default_value_t = 0.0005)]
    trend: f64,

    #[arg(long, default_value_t = 1.0)]
    base_order_size: f64,

    /// RNG seed; a given seed reproduces the run exactly.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Where to write the trade log (CSV, one trade per line).
    #[arg(long, default_value = "trades.csv")]
    trades_out: PathBuf,

    /// Optional JSON summary of run statistics.
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = SimulatorConfig {
        mode: cli.mode,
        initial_price: cli.initial_price,
        volatility: cli.volatility,
        tick_size: cli.tick_size,
        market_order_pct: cli.market_order_pct,
        cancel_pct: cli.cancel_pct,
        trend: cli.trend,
        base_order_size: cli.base_order_size,
        seed: cli.seed,
    };

    info!(mode = ?cli.mode, steps = cli.steps, seed = cli.seed, "starting simulation");
    let started_at = Utc::now();

    let mut simulator = MarketSimulator::new(config);
    simulator.run(cli.steps);
    let (mut engine, stats) = simulator.finish();

    // Drain the trade log into the CSV file.
    let trades = engine.drain_trades();
    let mut writer = BufWriter::new(File::create(&cli.trades_out)?);
    writeln!(writer, "{}", lob_protocol::csv_codec::TRADE_LOG_HEADER)?;
    for trade in &trades {
        writeln!(writer, "{}", lob_protocol::csv_codec::format_trade_line(trade))?;
    }
    writer.flush()?;
    info!(trades = trades.len(), path = %cli.trades_out.display(), "trade log written");

    if let Some(path) = &cli.summary_out {
        let summary = serde_json::json!({
            "mode": format!("{:?}", cli.mode),
            "steps": cli.steps,
            "seed": cli.seed,
            "started_at": started_at.to_rfc3339(),
            "finished_at": Utc::now().to_rfc3339(),
            "stats": stats,
        });
        std::fs::write(path, serde_json::to_string_pretty(&summary)?)?;
        info!(path = %path.display(), "summary written");
    }

    println!("{}", stats.render());
    Ok(())
}
