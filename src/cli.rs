//! CLI definition and dispatch.

use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{self, CsvAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::markdown_report::MarkdownReportAdapter;
use crate::adapters::synthetic_adapter::{
    self, DEFAULT_DAYS, DEFAULT_SEED, DEFAULT_TICKERS, GenerationParams, SyntheticAdapter,
};
use crate::domain::config_validation::{
    SOURCE_CSV, SOURCE_SYNTHETIC, parse_date, validate_data_config, validate_screen_config,
};
use crate::domain::error::ScreenerError;
use crate::domain::panel::DateRange;
use crate::domain::screen::{ScreenParams, ScreenResult, run_screen};
use crate::domain::signal::{FactorWeights, SignalRow};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_UNIVERSE: &str = "US Large Cap (Synthetic)";
pub const DEFAULT_MAX_NAMES: i64 = 25;
pub const DEFAULT_LOOKBACK_DAYS: i64 = 126;

#[derive(Parser, Debug)]
#[command(name = "factorscreen", about = "Multi-factor equity screener")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank the universe, pick the top names and backtest them
    Screen {
        #[arg(short, long)]
        config: PathBuf,
        /// Markdown report path; overrides `[report] output`
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Rows of the ranking to print (defaults to max_names)
        #[arg(long)]
        top: Option<usize>,
    },
    /// Write synthetic panels as CSV files
    Generate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Screen {
            config,
            output,
            top,
        } => run_screen_command(&config, output.as_deref(), top),
        Command::Generate { config, out_dir } => run_generate(&config, &out_dir),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

fn fail(err: &ScreenerError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn run_screen_command(config_path: &Path, output: Option<&Path>, top: Option<usize>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_data_config(&adapter).and_then(|()| validate_screen_config(&adapter)) {
        return fail(&e);
    }

    let params = match build_screen_params(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let data_port = match build_data_port(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    let output = output
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_string("report", "output").map(PathBuf::from));
    let top = top.unwrap_or(params.max_names);

    run_screen_pipeline(data_port.as_ref(), &params, top, output.as_deref())
}

pub fn build_screen_params(config: &dyn ConfigPort) -> Result<ScreenParams, ScreenerError> {
    let range = DateRange::new(
        parse_date(config, "screen", "start_date")?,
        parse_date(config, "screen", "end_date")?,
    )?;

    let defaults = FactorWeights::default();
    let weights = FactorWeights {
        value: config.get_double("screen", "value_weight", defaults.value)?,
        momentum: config.get_double("screen", "momentum_weight", defaults.momentum)?,
        quality: config.get_double("screen", "quality_weight", defaults.quality)?,
    };

    Ok(ScreenParams {
        universe: config
            .get_string("screen", "universe")
            .unwrap_or_else(|| DEFAULT_UNIVERSE.to_string()),
        max_names: positive(config, "screen", "max_names", DEFAULT_MAX_NAMES)?,
        lookback_days: positive(config, "screen", "lookback_days", DEFAULT_LOOKBACK_DAYS)?,
        range,
        weights,
    })
}

/// Synthetic generation settings from `[data]`. A missing `end_date` means today.
pub fn build_generation_params(config: &dyn ConfigPort) -> Result<GenerationParams, ScreenerError> {
    let end_date = match config.get_string("data", "end_date") {
        Some(_) => parse_date(config, "data", "end_date")?,
        None => Local::now().date_naive(),
    };
    let seed = config.get_int("data", "seed", DEFAULT_SEED as i64)?;
    let seed = u64::try_from(seed).map_err(|_| ScreenerError::ConfigInvalid {
        section: "data".into(),
        key: "seed".into(),
        reason: "seed must be non-negative".into(),
    })?;

    Ok(GenerationParams {
        seed,
        n_tickers: positive(config, "data", "tickers", DEFAULT_TICKERS as i64)?,
        n_days: positive(config, "data", "days", DEFAULT_DAYS as i64)?,
        end_date,
    })
}

pub fn build_data_port(config: &dyn ConfigPort) -> Result<Box<dyn MarketDataPort>, ScreenerError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| SOURCE_SYNTHETIC.to_string());

    match source.trim().to_lowercase().as_str() {
        SOURCE_SYNTHETIC => Ok(Box::new(SyntheticAdapter::new(build_generation_params(
            config,
        )?))),
        SOURCE_CSV => {
            let dir = config
                .get_string("data", "dir")
                .filter(|d| !d.trim().is_empty())
                .ok_or_else(|| ScreenerError::ConfigMissing {
                    section: "data".into(),
                    key: "dir".into(),
                })?;
            Ok(Box::new(CsvAdapter::new(PathBuf::from(dir.trim()))))
        }
        other => Err(ScreenerError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown source '{other}', expected synthetic or csv"),
        }),
    }
}

fn positive<T: TryFrom<i64>>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<T, ScreenerError> {
    let raw = config.get_int(section, key, default)?;
    if raw < 1 {
        return Err(ScreenerError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason: format!("{key} must be at least 1"),
        });
    }
    T::try_from(raw).map_err(|_| ScreenerError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: format!("{key} is out of range"),
    })
}

/// Load panels, screen, print the ranking and optionally write a report.
pub fn run_screen_pipeline(
    data_port: &dyn MarketDataPort,
    params: &ScreenParams,
    top: usize,
    output_path: Option<&Path>,
) -> ExitCode {
    eprintln!("Loading market data: {}", data_port.describe());
    let data = match data_port.load() {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };
    if let Some((first, last, _)) = data.prices.date_span() {
        eprintln!(
            "  {} prices from {} to {}, {} fundamentals",
            data.prices.len(),
            first,
            last,
            data.fundamentals.len()
        );
    }

    eprintln!(
        "Screening {}: {} to {}, top {}",
        params.universe,
        params.range.start(),
        params.range.end(),
        params.max_names
    );
    let result = run_screen(&data, params);

    if result.ranked.is_empty() {
        eprintln!("warning: no prices fall inside the screening window");
    }

    print_ranking(&result.ranked[..top.min(result.ranked.len())]);
    print_summary(&result);

    if let Some(path) = output_path {
        if let Err(e) = MarkdownReportAdapter::new().write(&result, params, path) {
            return fail(&e);
        }
        eprintln!("\nReport written to: {}", path.display());
    }

    ExitCode::SUCCESS
}

fn fmt_cell(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", decimals, v))
}

fn print_ranking(rows: &[SignalRow]) {
    println!(
        "{:>4}  {:<10} {:>10} {:>9} {:>8} {:>8} {:>8}",
        "#", "ticker", "close", "mom %", "pe", "margin", "signal"
    );
    for (i, row) in rows.iter().enumerate() {
        println!(
            "{:>4}  {:<10} {:>10.2} {:>9.2} {:>8} {:>8} {:>8}",
            i + 1,
            row.ticker,
            row.close,
            row.mom * 100.0,
            fmt_cell(row.pe, 1),
            fmt_cell(row.op_margin, 3),
            fmt_cell(row.signal, 3),
        );
    }
}

fn print_summary(result: &ScreenResult) {
    let m = &result.metrics;
    eprintln!("\n=== Equal-Weight Backtest ===");
    eprintln!("Picks:            {}", result.picks.join(", "));
    match (result.equity.first(), result.equity.last()) {
        (Some(first), Some(last)) => {
            eprintln!("Period:           {} to {}", first.date, last.date);
            eprintln!("Final Equity:     {:.4}", last.equity);
        }
        _ => eprintln!("Period:           no data"),
    }
    eprintln!("Total Return:     {:.2}%", m.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", m.annualized_return * 100.0);
    eprintln!("Max Drawdown:     -{:.1}%", m.max_drawdown * 100.0);
}

fn run_generate(config_path: &Path, out_dir: &Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let params = match build_generation_params(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    eprintln!(
        "Generating {} tickers x {} days (seed {}) ending {}",
        params.n_tickers, params.n_days, params.seed, params.end_date
    );
    let data = match synthetic_adapter::generate(&params) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    if let Err(e) = csv_adapter::write_market_data(out_dir, &data) {
        return fail(&e);
    }
    eprintln!(
        "Wrote {} prices and {} fundamentals to {}",
        data.prices.len(),
        data.fundamentals.len(),
        out_dir.display()
    );
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_data_config(&adapter) {
        return fail(&e);
    }
    if let Err(e) = validate_screen_config(&adapter) {
        return fail(&e);
    }

    let params = match build_screen_params(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let data_port = match build_data_port(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    eprintln!("\nData:     {}", data_port.describe());
    eprintln!("Universe: {}", params.universe);
    eprintln!("Window:   {} to {}", params.range.start(), params.range.end());
    eprintln!(
        "Weights:  value {:.2}, momentum {:.2}, quality {:.2}",
        params.weights.value, params.weights.momentum, params.weights.quality
    );
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
