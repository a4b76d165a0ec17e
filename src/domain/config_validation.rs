//! Configuration validation, run in full before a backtest starts.

use chrono::NaiveDate;

use crate::domain::error::LunatraderError;
use crate::domain::signal::StrategyKind;
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), LunatraderError> {
    validate_initial_capital(config)?;
    validate_costs(config)?;
    validate_risk_free_rate(config)?;
    validate_dates(config)?;
    validate_symbol(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), LunatraderError> {
    validate_kind(config)?;
    validate_position_size(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> LunatraderError {
    LunatraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn missing(section: &str, key: &str) -> LunatraderError {
    LunatraderError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), LunatraderError> {
    let value = config.get_double("backtest", "initial_capital", 100_000.0);
    if value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_costs(config: &dyn ConfigPort) -> Result<(), LunatraderError> {
    for key in ["commission_per_trade", "commission_pct", "slippage_pct"] {
        if config.get_double("backtest", key, 0.0) < 0.0 {
            return Err(invalid(
                "backtest",
                key,
                &format!("{key} must be non-negative"),
            ));
        }
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), LunatraderError> {
    let value = config.get_double("backtest", "risk_free_rate", 0.05);
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), LunatraderError> {
    let start = parse_date(config, "start_date")?;
    let end = parse_date(config, "end_date")?;
    if start >= end {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, LunatraderError> {
    let value = config
        .get_string("backtest", key)
        .ok_or_else(|| missing("backtest", key))?;
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| {
        invalid(
            "backtest",
            key,
            &format!("invalid {key} format, expected YYYY-MM-DD"),
        )
    })
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), LunatraderError> {
    match config.get_string("backtest", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(missing("backtest", "symbol")),
    }
}

fn validate_kind(config: &dyn ConfigPort) -> Result<(), LunatraderError> {
    let value = config
        .get_string("strategy", "kind")
        .ok_or_else(|| missing("strategy", "kind"))?;
    value
        .parse::<StrategyKind>()
        .map_err(|reason| invalid("strategy", "kind", &reason))?;
    Ok(())
}

fn validate_position_size(config: &dyn ConfigPort) -> Result<(), LunatraderError> {
    let value = config.get_double("strategy", "position_size", 0.95);
    if value <= 0.0 || value > 1.0 {
        return Err(invalid(
            "strategy",
            "position_size",
            "position_size must be between 0 and 1",
        ));
    }
    Ok(())
}
