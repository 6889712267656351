mod cli;
mod config;
mod output;

use alphavantage_client::{AlphaVantageClient, FixtureSource};
use analysis_core::BundleSource;
use analysis_orchestrator::{normalize_symbols, MetricsOrchestrator, MetricsRepository};
use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Command};
use config::AppConfig;

const DEFAULT_LOG_FILTER: &str = "warn,valuation_metrics=info";

fn init_tracing() {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // stdout carries the rendered output; logs go to stderr.
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter())
            .init();
    }
}

fn bundle_source(cli: &Cli, config: &AppConfig) -> Result<Box<dyn BundleSource>> {
    if let Some(dir) = &cli.fixtures {
        tracing::info!("Reading fixtures from {}", dir.display());
        return Ok(Box::new(FixtureSource::new(dir)));
    }

    Ok(Box::new(AlphaVantageClient::new(
        config.api_key()?.to_string(),
        config.rate_limit_per_minute,
        config.timeout(),
    )))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let orchestrator = MetricsOrchestrator::new();

    match &cli.command {
        Command::ListMetrics => {
            print!("{}", output::render_metric_list());
        }
        Command::Metrics { symbols } => {
            let config = AppConfig::from_env()?;
            let symbols = normalize_symbols(symbols)?;
            let source = bundle_source(&cli, &config)?;
            let repository = MetricsRepository::new();

            let outcomes = orchestrator.refresh(source.as_ref(), &symbols, &repository).await;
            tracing::info!(
                "Fetched {}/{} symbols",
                repository.len(),
                symbols.len()
            );
            print!("{}", output::render_metrics(&outcomes, cli.format)?);
        }
        Command::Chart {
            symbol,
            metric,
            granularity,
        } => {
            let config = AppConfig::from_env()?;
            let symbol = normalize_symbols(std::slice::from_ref(symbol))?
                .into_iter()
                .next()
                .context("missing symbol")?;
            let source = bundle_source(&cli, &config)?;

            let bundle = source
                .fetch_bundle(&symbol)
                .await
                .with_context(|| format!("fetching {}", symbol))?;
            let series = orchestrator
                .chart(&bundle, *metric, *granularity)
                .with_context(|| format!("charting {} for {}", metric, symbol))?;
            print!("{}", output::render_chart(&series, cli.format)?);
        }
    }

    Ok(())
}
