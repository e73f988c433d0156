//! Market Copilot CLI: fetch, scan, backtest and analyze commands.
//!
//! Commands:
//! - `fetch`: download 1m/5m/15m candles from Yahoo Finance into CSV files
//! - `scan`: print admitted signals as JSON
//! - `backtest`: print the plain-text backtest report
//! - `analyze`: full analysis report (JSON) for one or more symbols, in parallel
//!
//! Logging goes to stderr; set `RUST_LOG` to change the level (default `info`).

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use copilot_core::data::YahooProvider;
use copilot_runner::pipeline::{self, PreparedFrames};
use copilot_runner::{
    analyze_many, fetch_frames, load_frames, save_frames, suggest_improvements, synthetic_frames,
    write_json, AnalysisConfig, CandleFrames, TextReportGenerator,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "copilot",
    about = "Market Copilot: multi-timeframe intraday signal scanner and backtester"
)]
struct Cli {
    /// Path to a TOML analysis config. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download 1m, 5m and 15m candles from Yahoo Finance and save them as CSV.
    Fetch {
        /// Symbols to download (e.g., SPY QQQ). Defaults to the config ticker.
        symbols: Vec<String>,

        /// Yahoo chart range (1m data is limited to about 7 days).
        #[arg(long, default_value = "5d")]
        range: String,

        /// Data directory. Defaults to the config `data_dir`.
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Scan one symbol and print admitted signals as JSON.
    Scan {
        #[command(flatten)]
        source: SourceArgs,

        /// Write the signals to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also print scan counters to stderr.
        #[arg(long, default_value_t = false)]
        stats: bool,
    },
    /// Backtest one symbol's signals and print the text report.
    Backtest {
        #[command(flatten)]
        source: SourceArgs,

        /// Override the configured lookforward horizon (5m candles).
        #[arg(long)]
        lookforward: Option<usize>,

        /// Also write the backtest result as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Full analysis report for one or more symbols.
    Analyze {
        /// Symbols to analyze. Defaults to the config ticker.
        symbols: Vec<String>,

        /// Generate deterministic synthetic data instead of reading CSV files.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Sessions of synthetic data to generate.
        #[arg(long, default_value_t = 5)]
        sessions: usize,

        /// Data directory. Defaults to the config `data_dir`.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Write the reports to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Where a single-symbol command gets its candles.
#[derive(Args)]
struct SourceArgs {
    /// Symbol to scan. Defaults to the config ticker.
    symbol: Option<String>,

    /// Generate deterministic synthetic data instead of reading CSV files.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Sessions of synthetic data to generate.
    #[arg(long, default_value_t = 5)]
    sessions: usize,

    /// Data directory. Defaults to the config `data_dir`.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Fetch {
            symbols,
            range,
            data_dir,
        } => run_fetch(&config, symbols, &range, data_dir),
        Commands::Scan {
            source,
            output,
            stats,
        } => run_scan(&config, &source, output.as_deref(), stats),
        Commands::Backtest {
            source,
            lookforward,
            json,
        } => run_backtest(config, &source, lookforward, json.as_deref()),
        Commands::Analyze {
            symbols,
            synthetic,
            sessions,
            data_dir,
            output,
        } => run_analyze(&config, symbols, synthetic, sessions, data_dir, output.as_deref()),
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn symbols_or_default(symbols: Vec<String>, config: &AnalysisConfig) -> Vec<String> {
    if symbols.is_empty() {
        vec![config.ticker.clone()]
    } else {
        symbols.into_iter().map(|s| s.to_uppercase()).collect()
    }
}

fn resolve_frames(
    config: &AnalysisConfig,
    symbol: &str,
    synthetic: bool,
    sessions: usize,
    data_dir: Option<&Path>,
) -> Result<CandleFrames> {
    if synthetic {
        if sessions == 0 {
            bail!("--sessions must be at least 1");
        }
        return Ok(synthetic_frames(symbol, sessions));
    }
    let dir = data_dir.unwrap_or(config.data_dir.as_path());
    load_frames(dir, symbol).with_context(|| format!("loading candles for {symbol}"))
}

fn prepare_source(config: &AnalysisConfig, source: &SourceArgs) -> Result<(CandleFrames, PreparedFrames)> {
    let symbol = source
        .symbol
        .as_deref()
        .map(str::to_uppercase)
        .unwrap_or_else(|| config.ticker.clone());
    let frames = resolve_frames(
        config,
        &symbol,
        source.synthetic,
        source.sessions,
        source.data_dir.as_deref(),
    )?;
    let prepared = pipeline::prepare(&frames, &config.indicators)?;
    Ok((frames, prepared))
}

fn run_fetch(
    config: &AnalysisConfig,
    symbols: Vec<String>,
    range: &str,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    let dir = data_dir.unwrap_or_else(|| config.data_dir.clone());
    let limiter = Arc::new(config.fetch.rate_limiter());
    let provider = YahooProvider::new(Arc::clone(&limiter))?;

    let mut failures = 0usize;
    for symbol in symbols_or_default(symbols, config) {
        let fetched = fetch_frames(&provider, &symbol, range)
            .and_then(|frames| save_frames(&dir, &frames));
        match fetched {
            Ok(paths) => {
                for path in paths {
                    println!("{}", path.display());
                }
            }
            Err(e) => {
                tracing::error!(%symbol, error = %e, "fetch failed");
                failures += 1;
            }
        }
    }

    let stats = limiter.stats();
    tracing::info!(requests = stats.requests_this_window, "fetch finished");
    if failures > 0 {
        bail!("{failures} symbol(s) failed to download");
    }
    Ok(())
}

fn run_scan(
    config: &AnalysisConfig,
    source: &SourceArgs,
    output: Option<&Path>,
    stats: bool,
) -> Result<()> {
    let (_, prepared) = prepare_source(config, source)?;
    let outcome = pipeline::scan(&prepared, config);

    if stats {
        eprintln!("{}", serde_json::to_string_pretty(&outcome.stats)?);
    }
    match output {
        Some(path) => write_json(path, &outcome.signals)?,
        None => println!("{}", serde_json::to_string_pretty(&outcome.signals)?),
    }
    Ok(())
}

fn run_backtest(
    mut config: AnalysisConfig,
    source: &SourceArgs,
    lookforward: Option<usize>,
    json: Option<&Path>,
) -> Result<()> {
    if let Some(n) = lookforward {
        if n == 0 {
            bail!("--lookforward must be at least 1");
        }
        config.backtest.lookforward_candles = n;
    }

    let (frames, prepared) = prepare_source(&config, source)?;
    let outcome = pipeline::scan(&prepared, &config);
    let result = pipeline::backtest(&prepared, &outcome.signals, &config);
    let suggestions = suggest_improvements(&result);

    if frames.is_synthetic() {
        println!("NOTE: synthetic data ({})", frames.symbol);
    }
    print!("{}", TextReportGenerator.generate(&result, &suggestions));

    if let Some(path) = json {
        write_json(path, &result)?;
        println!("Backtest JSON saved to: {}", path.display());
    }
    Ok(())
}

fn run_analyze(
    config: &AnalysisConfig,
    symbols: Vec<String>,
    synthetic: bool,
    sessions: usize,
    data_dir: Option<PathBuf>,
    output: Option<&Path>,
) -> Result<()> {
    let frames = symbols_or_default(symbols, config)
        .iter()
        .map(|symbol| resolve_frames(config, symbol, synthetic, sessions, data_dir.as_deref()))
        .collect::<Result<Vec<_>>>()?;

    let reports = analyze_many(&frames, config)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    match output {
        Some(path) => {
            write_json(path, &reports)?;
            println!("Analysis saved to: {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&reports)?),
    }
    Ok(())
}
