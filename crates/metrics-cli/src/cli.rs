use std::path::PathBuf;

use analysis_core::{Granularity, MetricId};
use clap::{Parser, Subcommand, ValueEnum};

/// Side-by-side valuation, growth, profitability and technical metrics for up to five
/// stock symbols.
#[derive(Debug, Parser)]
#[command(name = "valuation-metrics", version, about)]
pub struct Cli {
    /// Read saved provider responses from `<DIR>/<SYMBOL>/*.json` instead of the API.
    #[arg(long, global = true, env = "VALUATION_METRICS_FIXTURES", value_name = "DIR")]
    pub fixtures: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare the current metrics of up to five symbols.
    Metrics {
        /// Ticker symbols, e.g. MSFT AAPL.
        #[arg(required = true, num_args = 1..)]
        symbols: Vec<String>,
    },
    /// Recompute one metric over time for a symbol.
    Chart {
        symbol: String,

        /// Metric id, e.g. sales_growth_3yr or rsi.
        #[arg(long, short)]
        metric: MetricId,

        /// yearly or quarterly. Ignored by daily indicators.
        #[arg(long, short, default_value = "yearly")]
        granularity: Granularity,
    },
    /// List metric ids and their labels.
    ListMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
