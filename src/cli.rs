//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig};
use crate::domain::config_validation::{validate_backtest_config, validate_strategy_config};
use crate::domain::error::LunatraderError;
use crate::domain::lunar;
use crate::domain::metrics::Metrics;
use crate::domain::signal::StrategyKind;
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

/// Bars needed before the evaluator has a two-bar window to look at.
const MIN_BARS: usize = 2;

#[derive(Parser, Debug)]
#[command(name = "lunatrader", about = "Lunar phase trading backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// List symbols present in the CSV cache
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for the configured symbol
    Info {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print moon illumination for a date or range of dates
    Phase {
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value_t = 1)]
        days: u32,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            symbol,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest(&config, output.as_ref(), symbol.as_deref())
            }
        }
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Validate { config } => run_validate(&config),
        Command::Info { symbol, config } => run_info(symbol.as_deref(), &config),
        Command::Phase { date, days } => run_phase(date.as_deref(), days),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = LunatraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn data_adapter(config: &dyn ConfigPort) -> CsvAdapter {
    let data_dir = config
        .get_string("backtest", "data_dir")
        .unwrap_or_else(|| "data".to_string());
    CsvAdapter::new(PathBuf::from(data_dir))
}

fn run_backtest(
    config_path: &PathBuf,
    output_path: Option<&PathBuf>,
    symbol_override: Option<&str>,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate
    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 3: Build strategy
    let strategy = match build_strategy(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Loading strategy: {}", strategy.name);

    // Stage 4: Build BacktestConfig
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 5: Resolve symbol
    let symbol = match resolve_symbol(symbol_override, &adapter) {
        Some(s) => s,
        None => {
            eprintln!("error: no symbol configured");
            return ExitCode::from(2);
        }
    };

    let data_port = data_adapter(&adapter);
    run_backtest_pipeline(&data_port, &strategy, &bt_config, &symbol, output_path)
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, LunatraderError> {
    let start_str = adapter
        .get_string("backtest", "start_date")
        .ok_or_else(|| LunatraderError::ConfigMissing {
            section: "backtest".into(),
            key: "start_date".into(),
        })?;
    let end_str = adapter.get_string("backtest", "end_date").ok_or_else(|| {
        LunatraderError::ConfigMissing {
            section: "backtest".into(),
            key: "end_date".into(),
        }
    })?;

    let start_date = NaiveDate::parse_from_str(&start_str, "%Y-%m-%d").map_err(|_| {
        LunatraderError::ConfigInvalid {
            section: "backtest".into(),
            key: "start_date".into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        }
    })?;
    let end_date = NaiveDate::parse_from_str(&end_str, "%Y-%m-%d").map_err(|_| {
        LunatraderError::ConfigInvalid {
            section: "backtest".into(),
            key: "end_date".into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        }
    })?;

    Ok(BacktestConfig {
        start_date,
        end_date,
        initial_capital: adapter.get_double("backtest", "initial_capital", 100_000.0),
        commission_per_trade: adapter.get_double("backtest", "commission_per_trade", 0.0),
        commission_pct: adapter.get_double("backtest", "commission_pct", 0.0),
        slippage_pct: adapter.get_double("backtest", "slippage_pct", 0.0),
        risk_free_rate: adapter.get_double("backtest", "risk_free_rate", 0.05),
    })
}

pub fn build_strategy(adapter: &dyn ConfigPort) -> Result<Strategy, LunatraderError> {
    let kind_str = adapter
        .get_string("strategy", "kind")
        .ok_or_else(|| LunatraderError::ConfigMissing {
            section: "strategy".into(),
            key: "kind".into(),
        })?;
    let kind = kind_str
        .parse::<StrategyKind>()
        .map_err(|reason| LunatraderError::UnknownStrategy { reason })?;

    let mut strategy = Strategy::new(kind);
    if let Some(name) = adapter.get_string("strategy", "name") {
        strategy.name = name;
    }
    strategy.description = adapter
        .get_string("strategy", "description")
        .unwrap_or_default();
    strategy.position_size = adapter.get_double("strategy", "position_size", 0.95);
    Ok(strategy)
}

pub fn resolve_symbol(symbol_override: Option<&str>, config: &dyn ConfigPort) -> Option<String> {
    if let Some(s) = symbol_override {
        return Some(s.trim().to_uppercase());
    }
    config
        .get_string("backtest", "symbol")
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    strategy: &Strategy,
    bt_config: &BacktestConfig,
    symbol: &str,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    // Stage 6: Fetch OHLCV data
    let bars = match data_port.fetch_ohlcv(symbol, bt_config.start_date, bt_config.end_date) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if bars.is_empty() {
        let e = LunatraderError::NoData {
            symbol: symbol.to_string(),
        };
        eprintln!("error: {e}");
        return (&e).into();
    }
    if bars.len() < MIN_BARS {
        let e = LunatraderError::InsufficientData {
            symbol: symbol.to_string(),
            bars: bars.len(),
            minimum: MIN_BARS,
        };
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 7: Run backtest
    eprintln!(
        "Running backtest: {} on {}, {} to {}",
        strategy.kind, symbol, bt_config.start_date, bt_config.end_date,
    );
    eprintln!("  Processing: {} bars", bars.len());

    let result = backtest_engine::run_backtest(&bars, strategy, bt_config);

    // Stage 8: Compute metrics and print console summary to stderr
    let metrics = Metrics::compute(&result.portfolio, bt_config.risk_free_rate);
    let final_equity = result
        .portfolio
        .equity_curve
        .last()
        .map(|p| p.equity)
        .unwrap_or(bt_config.initial_capital);

    eprintln!("\n=== Results ===");
    eprintln!(
        "Starting Portfolio Value: {:.2}",
        bt_config.initial_capital
    );
    eprintln!("Final Portfolio Value:    {:.2}", final_equity);
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!(
        "Annualized:       {:.2}%",
        metrics.annualized_return * 100.0
    );
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", metrics.sortino_ratio);
    eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!("Total Trades:     {}", metrics.total_trades());
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", metrics.profit_factor);

    // Stage 9: Write report if requested
    if let Some(output) = output_path {
        let reporter = TextReportAdapter::new(bt_config.risk_free_rate);
        let output_str = output.display().to_string();
        match reporter.write(&result, strategy, &output_str) {
            Ok(()) => eprintln!("\nReport written to: {}", output_str),
            Err(e) => {
                eprintln!("error: failed to write report: {e}");
                return ExitCode::from(1);
            }
        }
    }

    ExitCode::SUCCESS
}

pub fn run_dry_run(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!("Config validated successfully");

    let strategy = match build_strategy(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nStrategy:");
    eprintln!("  name:          {}", strategy.name);
    eprintln!("  kind:          {}", strategy.kind);
    eprintln!("  position_size: {}", strategy.position_size);
    eprintln!(
        "  uses phases:   {}",
        if strategy.kind.uses_phases() {
            "yes"
        } else {
            "no"
        }
    );

    let symbol = resolve_symbol(None, &adapter).unwrap_or_default();
    eprintln!("\nData:");
    eprintln!("  symbol: {}", symbol);

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let adapter = data_adapter(&config);
    let symbols = match adapter.list_symbols() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if symbols.is_empty() {
        eprintln!("No symbols found in cache");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(symbol_override: Option<&str>, config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let symbol = match resolve_symbol(symbol_override, &config) {
        Some(s) => s,
        None => {
            eprintln!("error: symbol is required (use --symbol or set in config)");
            return ExitCode::from(1);
        }
    };

    let adapter = data_adapter(&config);
    match adapter.get_data_range(&symbol) {
        Ok(Some((min_date, max_date, count))) => {
            println!("{}: {} bars, {} to {}", symbol, count, min_date, max_date);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("{}: no data found", symbol);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error querying {}: {}", symbol, e);
            (&e).into()
        }
    }
}

fn run_phase(date: Option<&str>, days: u32) -> ExitCode {
    let start = match date {
        Some(s) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                eprintln!("error: invalid date format (expected YYYY-MM-DD)");
                return ExitCode::from(1);
            }
        },
        None => chrono::Utc::now().date_naive(),
    };

    for i in 0..days.max(1) {
        let sample = lunar::PhaseSample::on(start + chrono::Duration::days(i as i64));
        println!("{}  {:.4}", sample.date, sample.illumination);
    }
    ExitCode::SUCCESS
}
