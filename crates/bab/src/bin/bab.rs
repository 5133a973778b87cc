//! Betting-against-beta backtest CLI.
//!
//! Fetches monthly returns from Yahoo Finance (or reads them from CSV), runs
//! the strategy and prints the performance report.
//!
//! Usage: `cargo run --features cli -- [--start DATE] [--end DATE] [--window N] ...`
//! Example: `cargo run --features cli -- --window 36 --max-universe 30 --csv-dir out`

use std::{path::PathBuf, process::ExitCode};

use bab::{
    ConsoleReport, CsvReturnsProvider, DEFAULT_BENCHMARK, JsonFileStore, YahooReturnsProvider,
    model::{BabPipeline, RebalanceFrequency, StrategyConfig},
    primitives::{Date, Symbol},
    traits::{
        AcquiredUniverse, AcquisitionRequest, ReportContext, ReportSink, ReturnsProvider,
        load_snapshot, save_snapshot,
    },
};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Large-cap universe across sectors.
const DEFAULT_UNIVERSE: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "META", "NVDA", "INTC", "CSCO", "ORCL", "IBM", "JNJ", "UNH",
    "PFE", "MRK", "ABT", "LLY", "BMY", "AMGN", "JPM", "BAC", "WFC", "GS", "MS", "C", "AXP",
    "USB", "XOM", "CVX", "COP", "SLB", "KO", "PEP", "PG", "WMT", "COST", "MCD", "HD", "LOW",
    "NKE", "DIS", "CAT", "DE", "HON", "MMM", "GE", "UPS", "DUK", "SO", "NEE", "T", "VZ",
];

/// Snapshot name of the acquired universe.
const UNIVERSE_SNAPSHOT: &str = "universe";

/// Snapshot name of the performance report.
const REPORT_SNAPSHOT: &str = "report";

#[derive(Debug, Parser)]
#[command(name = "bab", version, about = "Betting-against-beta backtest")]
struct Args {
    /// First date of the evaluation window (YYYY-MM-DD).
    #[arg(long, default_value = "2010-01-01")]
    start: Date,

    /// Last date of the evaluation window (YYYY-MM-DD).
    #[arg(long, default_value = "2024-12-31")]
    end: Date,

    /// Rolling beta window in months.
    #[arg(long, default_value_t = 36)]
    window: usize,

    /// Keep at most this many entities.
    #[arg(long)]
    max_universe: Option<usize>,

    /// Annual risk-free rate as a decimal.
    #[arg(long, default_value_t = 0.02)]
    risk_free: f64,

    /// Leverage applied to the long-short spread.
    #[arg(long, default_value_t = 1.0)]
    leverage: f64,

    /// Rebalancing frequency.
    #[arg(long, default_value = "monthly")]
    rebalance: RebalanceFrequency,

    /// Number of beta groups.
    #[arg(long, default_value_t = 5)]
    groups: usize,

    /// Minimum aligned observations for the factor regression.
    #[arg(long, default_value_t = 12)]
    min_regression_obs: usize,

    /// Fixed Newey-West lag truncation.
    #[arg(long)]
    nw_lags: Option<usize>,

    /// Comma-separated tickers; defaults to a built-in large-cap list.
    #[arg(long, value_delimiter = ',')]
    symbols: Vec<String>,

    /// Benchmark ticker.
    #[arg(long, default_value = DEFAULT_BENCHMARK)]
    benchmark: String,

    /// Strategy configuration as JSON; replaces the strategy flags.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for JSON snapshots of the universe and report.
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Reuse the universe snapshot in `--snapshot-dir` instead of fetching.
    #[arg(long, requires = "snapshot_dir")]
    offline: bool,

    /// Long CSV of entity returns (`date,symbol,return`) used instead of Yahoo.
    #[arg(long, requires = "benchmark_csv")]
    returns_csv: Option<PathBuf>,

    /// CSV of benchmark returns (`date,return`).
    #[arg(long, requires = "returns_csv")]
    benchmark_csv: Option<PathBuf>,

    /// Directory for CSV exports of the strategy and wealth curves.
    #[arg(long)]
    csv_dir: Option<PathBuf>,
}

impl Args {
    fn strategy_config(&self) -> Result<StrategyConfig, Box<dyn std::error::Error>> {
        if let Some(path) = &self.config {
            let text = std::fs::read_to_string(path)?;
            return Ok(serde_json::from_str(&text)?);
        }
        Ok(StrategyConfig {
            start: self.start,
            end: self.end,
            window: self.window,
            max_universe: self.max_universe,
            annual_risk_free: self.risk_free,
            leverage: self.leverage,
            rebalance: self.rebalance,
            n_groups: self.groups,
            min_regression_obs: self.min_regression_obs,
            newey_west_lags: self.nw_lags,
        })
    }

    fn symbols(&self) -> Vec<Symbol> {
        if self.symbols.is_empty() {
            DEFAULT_UNIVERSE.iter().map(|&s| Symbol::from(s)).collect()
        } else {
            self.symbols.iter().map(|s| Symbol::new(s.trim().to_uppercase())).collect()
        }
    }

    fn request(&self, config: &StrategyConfig, symbols: Vec<Symbol>) -> AcquisitionRequest {
        AcquisitionRequest {
            start: config.start,
            end: config.end,
            symbols,
            benchmark: Symbol::new(self.benchmark.clone()),
        }
    }
}

/// Read the universe from CSV files when given, otherwise from Yahoo Finance.
///
/// With CSV input and no `--symbols`, every symbol in the file is requested.
async fn acquire(
    args: &Args,
    config: &StrategyConfig,
) -> Result<AcquiredUniverse, Box<dyn std::error::Error>> {
    if let (Some(returns), Some(benchmark)) = (&args.returns_csv, &args.benchmark_csv) {
        let provider = CsvReturnsProvider::open(returns, benchmark)?;
        let symbols = if args.symbols.is_empty() {
            provider.symbols().cloned().collect()
        } else {
            args.symbols()
        };
        return Ok(provider.fetch(&args.request(config, symbols)).await?);
    }

    let provider = YahooReturnsProvider::new()?;
    Ok(provider.fetch(&args.request(config, args.symbols())).await?)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bab=info")),
        )
        .init();

    let args = Args::parse();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.strategy_config()?;
    let pipeline = BabPipeline::new(config)?;
    let config = pipeline.config();
    info!(
        start = %config.start,
        end = %config.end,
        window = config.window,
        groups = config.n_groups,
        "configuration validated"
    );

    let store = args.snapshot_dir.as_ref().map(JsonFileStore::new).transpose()?;

    let universe = match (&store, args.offline) {
        (Some(store), true) => load_snapshot::<_, AcquiredUniverse>(store, UNIVERSE_SNAPSHOT)?
            .ok_or("no universe snapshot to run offline from")?,
        _ => {
            let universe = acquire(args, config).await?;
            if let Some(store) = &store {
                save_snapshot(store, UNIVERSE_SNAPSHOT, &universe)?;
            }
            universe
        }
    };
    let output = pipeline.run(&universe)?;

    if let (Some(store), Some(report)) = (&store, &output.report) {
        if let Err(e) = save_snapshot(store, REPORT_SNAPSHOT, report) {
            warn!(error = %e, "could not save report snapshot");
        }
    }

    let strategy_wealth = output.strategy_wealth();
    let benchmark_wealth = output.benchmark_wealth();
    let context = ReportContext {
        report: output.report.as_ref(),
        strategy: &output.strategy,
        strategy_wealth: &strategy_wealth,
        benchmark_wealth: &benchmark_wealth,
        summary: &output.summary,
    };
    let sink = match &args.csv_dir {
        Some(dir) => ConsoleReport::new().with_csv_dir(dir),
        None => ConsoleReport::new(),
    };
    if let Err(e) = sink.render(&context) {
        warn!(error = %e, "report rendering failed");
    }

    let summary = &output.summary;
    info!(
        entities_used = summary.entities_with_beta,
        entities_skipped = summary.entities_requested.saturating_sub(summary.entities_with_beta),
        dates_ranked = summary.dates_ranked,
        dates_skipped = summary.dates_skipped,
        "run complete"
    );
    Ok(())
}
