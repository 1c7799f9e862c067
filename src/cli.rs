//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::{CsvAdapter, CsvExportAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::config::{BarrierConfig, LabelingConfig, PortfolioConfig};
use crate::domain::config_validation::{
    validate_barrier_config, validate_data_config, validate_portfolio_config,
};
use crate::domain::engine::{self, LabelingResult};
use crate::domain::error::TribarError;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tribar", about = "Triple-barrier event labeling and backtest")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Label signals and simulate the resulting portfolio
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [data] symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Overrides [data] base_path
        #[arg(long)]
        data: Option<PathBuf>,
        /// Directory for report.txt, trades.csv and equity.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the data range and signal counts for a symbol
    Inspect {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            symbol,
            data,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_labeling(&config, symbol.as_deref(), data.as_deref(), output.as_deref())
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::Inspect { config, symbol } => run_inspect(&config, symbol.as_deref()),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        error!("{e}");
        ExitCode::from(&e)
    })
}

fn validate_all(config: &dyn ConfigPort) -> Result<(), TribarError> {
    validate_data_config(config)?;
    validate_barrier_config(config)?;
    validate_portfolio_config(config)?;
    Ok(())
}

/// Reads `[barrier]` and `[portfolio]`, falling back to defaults for absent keys.
/// An absent `target_window` selects the fixed target.
pub fn build_labeling_config(adapter: &dyn ConfigPort) -> Result<LabelingConfig, TribarError> {
    let b = BarrierConfig::default();
    let p = PortfolioConfig::default();

    let target_window = match adapter.get_optional("barrier", "target_window") {
        None => None,
        Some(raw) => Some(raw.parse::<usize>().map_err(|_| TribarError::ConfigInvalid {
            section: "barrier".into(),
            key: "target_window".into(),
            reason: format!("expected an integer or none, got {raw:?}"),
        })?),
    };
    let max_concurrent_trades =
        adapter.get_int("barrier", "max_concurrent_trades", b.max_concurrent_trades as i64);
    let max_concurrent_trades =
        usize::try_from(max_concurrent_trades).map_err(|_| TribarError::ConfigInvalid {
            section: "barrier".into(),
            key: "max_concurrent_trades".into(),
            reason: "must be at least 1".into(),
        })?;

    Ok(LabelingConfig {
        barrier: BarrierConfig {
            take_profit_mult: adapter.get_double("barrier", "take_profit", b.take_profit_mult),
            stop_loss_mult: adapter.get_double("barrier", "stop_loss", b.stop_loss_mult),
            time_limit_seconds: adapter.get_int("barrier", "time_limit", b.time_limit_seconds),
            target_window,
            trade_cost: adapter.get_double("barrier", "trade_cost", b.trade_cost),
            max_concurrent_trades,
        },
        portfolio: PortfolioConfig {
            order_amount: adapter.get_double("portfolio", "order_amount", p.order_amount),
            leverage: adapter.get_double("portfolio", "leverage", p.leverage),
            initial_portfolio: adapter.get_double(
                "portfolio",
                "initial_portfolio",
                p.initial_portfolio,
            ),
            maker_fee: adapter.get_double("portfolio", "maker_fee", p.maker_fee),
            taker_fee: adapter.get_double("portfolio", "taker_fee", p.taker_fee),
        },
    })
}

pub fn resolve_symbol(symbol_override: Option<&str>, config: &dyn ConfigPort) -> Option<String> {
    symbol_override
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| config.get_optional("data", "symbol"))
}

pub fn resolve_data_dir(data_override: Option<&Path>, config: &dyn ConfigPort) -> PathBuf {
    data_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_optional("data", "base_path").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Loads prices and signals through `data` and runs the labeling engine.
/// Unreadable signal rows are carried into the result's issue list.
pub fn run_labeling_pipeline(
    data: &dyn DataPort,
    symbol: &str,
    config: &LabelingConfig,
) -> Result<LabelingResult, TribarError> {
    let prices = data.fetch_prices(symbol)?;
    let feed = data.fetch_signals(symbol)?;
    info!(%symbol, prices = prices.len(), signals = feed.signals.len(), "loaded inputs");
    for issue in &feed.issues {
        warn!(%symbol, "{issue}");
    }

    let mut result = engine::run(symbol, &prices, &feed.signals, config)?;
    let mut issues = feed.issues;
    issues.append(&mut result.signal_issues);
    result.signal_issues = issues;
    Ok(result)
}

fn run_labeling(
    config_path: &Path,
    symbol_override: Option<&str>,
    data_override: Option<&Path>,
    output_dir: Option<&Path>,
) -> ExitCode {
    info!(path = %config_path.display(), "loading config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let symbol = match resolve_symbol(symbol_override, &adapter) {
        Some(s) => s,
        None => {
            let err = TribarError::ConfigMissing {
                section: "data".into(),
                key: "symbol".into(),
            };
            error!("{err}");
            return (&err).into();
        }
    };

    if let Err(e) = validate_barrier_config(&adapter).and_then(|()| validate_portfolio_config(&adapter)) {
        error!("{e}");
        return (&e).into();
    }

    let config = match build_labeling_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    let data = CsvAdapter::new(resolve_data_dir(data_override, &adapter));
    let result = match run_labeling_pipeline(&data, &symbol, &config) {
        Ok(r) => r,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    let text = TextReportAdapter::new();
    println!("{}", text.render_summary(&result));

    if let Some(dir) = output_dir {
        let reporters: Vec<Box<dyn ReportPort>> = vec![Box::new(text), Box::new(CsvExportAdapter)];
        for reporter in &reporters {
            match reporter.write(&result, dir) {
                Ok(files) => {
                    for file in files {
                        info!(path = %file.display(), "report written");
                    }
                }
                Err(e) => {
                    error!("{e}");
                    return (&e).into();
                }
            }
        }
    }

    ExitCode::SUCCESS
}

pub fn run_dry_run(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_all(&adapter) {
        error!("{e}");
        return (&e).into();
    }
    let config = match build_labeling_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    let b = &config.barrier;
    let p = &config.portfolio;
    println!("Dry run: configuration is valid");
    println!(
        "  symbol:                {}",
        resolve_symbol(None, &adapter).unwrap_or_default()
    );
    println!(
        "  data:                  {}",
        resolve_data_dir(None, &adapter).display()
    );
    println!("  take_profit / stop:    {} / {}", b.take_profit_mult, b.stop_loss_mult);
    println!("  time_limit:            {}s", b.time_limit_seconds);
    match b.target_window {
        Some(w) => println!("  target:                rolling std over {w} rows"),
        None => println!("  target:                fixed 1%"),
    }
    println!("  max_concurrent_trades: {}", b.max_concurrent_trades);
    println!(
        "  order / leverage:      {} x {} of {}",
        p.order_amount, p.leverage, p.initial_portfolio
    );
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match validate_all(&adapter).and_then(|()| build_labeling_config(&adapter)) {
        Ok(_) => {
            println!("{}: ok", config_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

fn run_inspect(config_path: &Path, symbol_override: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let symbol = match resolve_symbol(symbol_override, &adapter) {
        Some(s) => s,
        None => {
            error!("symbol is required (use --symbol or set [data] symbol)");
            return ExitCode::from(2);
        }
    };

    let data = CsvAdapter::new(resolve_data_dir(None, &adapter));
    match data.get_data_range(&symbol) {
        Ok(Some((first, last, count))) => {
            println!("{symbol}: {count} rows, {first} to {last}");
        }
        Ok(None) => {
            let err = TribarError::NoData { symbol };
            error!("{err}");
            return (&err).into();
        }
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    }

    match data.fetch_signals(&symbol) {
        Ok(feed) => {
            let long = feed.signals.iter().filter(|s| s.side.sign() > 0.0).count();
            let short = feed.signals.iter().filter(|s| s.side.sign() < 0.0).count();
            println!(
                "{symbol}: {} signals ({long} long, {short} short), {} unreadable rows",
                feed.signals.len(),
                feed.issues.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}
