// In app/src/main.rs

use anyhow::{Context, Result};
use api_client::CoinGeckoClient;
use app_config::Settings;
use clap::{Parser, Subcommand};
use core_types::Timeframe;
use engine::{AnalysisEngine, AssetOutcome};
use std::sync::Arc;
use std::time::Duration;
use strategies::EmaCrossover;
use tracing_subscriber::prelude::*;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "EMA crossover trend dashboard for crypto assets.")]
struct Cli {
    /// Defaults to `serve`.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serves the dashboard and its JSON API.
    Serve,

    /// Runs one analysis cycle and prints the results.
    Analyze {
        /// Bucket width (4H, 6H, 12H, 1D, 2D, 3D, 1W). Defaults to the configured one.
        #[arg(short, long)]
        timeframe: Option<Timeframe>,

        /// Restrict the cycle to one configured asset (id or name).
        #[arg(short, long)]
        asset: Option<String>,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = app_config::load_settings().context("Failed to load settings")?;
    init_tracing(&settings)?;

    tracing::info!(environment = %settings.app.environment, "Starting trendwatch");

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => handle_serve(settings).await?,
        Commands::Analyze { timeframe, asset } => handle_analyze(settings, timeframe, asset).await?,
    }

    Ok(())
}

fn init_tracing(settings: &Settings) -> Result<()> {
    let level: tracing::Level = settings
        .app
        .log_level
        .parse()
        .with_context(|| format!("Invalid log level '{}'", settings.app.log_level))?;
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new()
            .with_target("hyper", tracing::Level::WARN)
            .with_target("reqwest", tracing::Level::WARN)
            .with_default(level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();
    Ok(())
}

/// Wires the provider client, the classifier and the cache together.
fn build_engine(settings: &Settings) -> Result<AnalysisEngine> {
    let client = CoinGeckoClient::new(&settings.coingecko)?;
    if client.authenticated {
        tracing::info!("Using the CoinGecko Pro API.");
    } else {
        tracing::info!("No API key configured; using the public CoinGecko API.");
    }

    let strategy_settings = settings
        .strategies
        .ema_crossover
        .clone()
        .unwrap_or_default();
    let strategy = EmaCrossover::new(strategy_settings)?;

    Ok(AnalysisEngine::new(
        Arc::new(client),
        Box::new(strategy),
        Duration::from_secs(settings.dashboard.cache_ttl_secs),
    ))
}

// --- "Serve" Subcommand Logic ---

async fn handle_serve(settings: Settings) -> Result<()> {
    let engine = build_engine(&settings)?;
    let state = web_server::AppState::new(engine, settings.dashboard.clone());
    web_server::run(settings.server.clone(), state).await?;
    Ok(())
}

// --- "Analyze" Subcommand Logic ---

async fn handle_analyze(settings: Settings, timeframe: Option<Timeframe>, asset: Option<String>) -> Result<()> {
    let timeframe = timeframe.unwrap_or(settings.dashboard.default_timeframe);
    let assets = match asset {
        Some(key) => {
            let Some(found) = settings.dashboard.find_asset(&key) else {
                anyhow::bail!("Asset '{}' is not configured", key);
            };
            vec![found.clone()]
        }
        None => settings.dashboard.assets.clone(),
    };

    let engine = build_engine(&settings)?;
    let outcomes = engine.run_cycle(&assets, timeframe).await;
    print_outcomes(timeframe, &outcomes);
    Ok(())
}

fn print_outcomes(timeframe: Timeframe, outcomes: &[AssetOutcome]) {
    println!("\n--- Trend Summary ({}) ---", timeframe);
    println!(
        "{:<12} {:>14} {:>9} {:<8} {:>8} {:>14} {:>14}  {}",
        "Asset", "Price", "Change", "Trend", "Strength", "EMA short", "EMA long", "Crossover"
    );
    for outcome in outcomes {
        match &outcome.result {
            Ok(report) => {
                let a = &report.analysis;
                let (price, change) = match report.price_change() {
                    Some((price, pct)) => (format!("{:.2}", price), format!("{:+.2}%", pct)),
                    None => ("-".to_string(), "-".to_string()),
                };
                let crossover = match a.crossover_periods_ago {
                    Some(n) if a.recent_bullish_cross => format!("bullish, {} periods ago", n),
                    Some(n) => format!("bearish, {} periods ago", n),
                    None => "none".to_string(),
                };
                println!(
                    "{:<12} {:>14} {:>9} {:<8} {:>8.1} {:>14.2} {:>14.2}  {}",
                    outcome.asset.name,
                    price,
                    change,
                    a.trend.to_string(),
                    a.strength.score(),
                    a.ema_short_value,
                    a.ema_long_value,
                    crossover
                );
            }
            Err(e) => println!("{:<12} no usable data: {}", outcome.asset.name, e),
        }
    }
}
