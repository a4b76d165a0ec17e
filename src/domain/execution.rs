//! Fill simulation: slippage, whole-share sizing and commissions for
//! long-only market orders.

use chrono::NaiveDate;

use super::portfolio::Portfolio;
use super::position::{ClosedTrade, Position};

/// Broker-level cost parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    pub commission_per_trade: f64,
    pub commission_pct: f64,
    pub slippage_pct: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            commission_per_trade: 0.0,
            commission_pct: 0.0,
            slippage_pct: 0.0,
        }
    }
}

/// Commission: flat fee plus a percentage of trade value.
pub fn calculate_commission(trade_value: f64, config: &ExecutionConfig) -> f64 {
    config.commission_per_trade + (trade_value * config.commission_pct / 100.0)
}

/// Buys fill above the market price.
pub fn apply_slippage_entry(market_price: f64, slippage_pct: f64) -> f64 {
    market_price * (1.0 + slippage_pct / 100.0)
}

/// Sells fill below the market price.
pub fn apply_slippage_exit(market_price: f64, slippage_pct: f64) -> f64 {
    market_price * (1.0 - slippage_pct / 100.0)
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered {
        quantity: i64,
        execution_price: f64,
        cost: f64,
        commission: f64,
    },
    InsufficientCapital,
}

/// Enter a long position with `cash * position_size` of buying power,
/// rounded down to whole shares. Charges cost plus commission against cash.
pub fn enter_long(
    portfolio: &mut Portfolio,
    symbol: &str,
    market_price: f64,
    date: NaiveDate,
    position_size: f64,
    config: &ExecutionConfig,
) -> EntryResult {
    let execution_price = apply_slippage_entry(market_price, config.slippage_pct);

    let available = portfolio.cash * position_size;
    let quantity = (available / execution_price).floor() as i64;
    if quantity == 0 {
        return EntryResult::InsufficientCapital;
    }

    let cost = quantity as f64 * execution_price;
    let commission = calculate_commission(cost, config);
    if cost + commission > portfolio.cash {
        return EntryResult::InsufficientCapital;
    }

    portfolio.cash -= cost + commission;
    portfolio.open_position(Position {
        symbol: symbol.to_string(),
        quantity,
        entry_price: execution_price,
        entry_date: date,
    });

    EntryResult::Entered {
        quantity,
        execution_price,
        cost,
        commission,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExitResult {
    pub quantity: i64,
    pub exit_price: f64,
    pub proceeds: f64,
    pub exit_commission: f64,
    pub pnl: f64,
}

/// Close the open position at the given market price. PnL includes the
/// round-trip commissions. Returns `None` if the portfolio is flat.
pub fn exit_long(
    portfolio: &mut Portfolio,
    market_price: f64,
    exit_date: NaiveDate,
    entry_commission: f64,
    config: &ExecutionConfig,
) -> Option<ExitResult> {
    let position = portfolio.take_position()?;

    let exit_price = apply_slippage_exit(market_price, config.slippage_pct);
    let proceeds = position.quantity as f64 * exit_price;
    let exit_commission = calculate_commission(proceeds, config);

    let price_pnl = position.quantity as f64 * (exit_price - position.entry_price);
    let pnl = price_pnl - entry_commission - exit_commission;

    portfolio.cash += proceeds - exit_commission;
    portfolio.record_trade(ClosedTrade {
        symbol: position.symbol,
        quantity: position.quantity,
        entry_price: position.entry_price,
        exit_price,
        entry_date: position.entry_date,
        exit_date,
        pnl,
    });

    Some(ExitResult {
        quantity: position.quantity,
        exit_price,
        proceeds,
        exit_commission,
        pnl,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> ExecutionConfig {
        ExecutionConfig {
            commission_per_trade: 10.0,
            commission_pct: 0.1,
            slippage_pct: 0.05,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 6, 15).unwrap()
    }

    #[test]
    fn commission_flat_plus_pct() {
        let commission = calculate_commission(10_000.0, &make_config());
        let expected = 10.0 + 10_000.0 * 0.1 / 100.0;
        assert!((commission - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn commission_defaults_to_zero() {
        let commission = calculate_commission(10_000.0, &ExecutionConfig::default());
        assert!((commission - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn slippage_raises_entry_lowers_exit() {
        assert!((apply_slippage_entry(100.0, 0.05) - 100.05).abs() < 1e-9);
        assert!((apply_slippage_exit(100.0, 0.05) - 99.95).abs() < 1e-9);
    }

    #[test]
    fn enter_long_sizes_whole_shares() {
        let mut portfolio = Portfolio::new(100_000.0);
        let config = make_config();

        let result = enter_long(&mut portfolio, "TSLA", 100.0, date(), 0.95, &config);

        match result {
            EntryResult::Entered {
                quantity,
                execution_price,
                cost,
                commission,
            } => {
                let expected_price = 100.0 * 1.0005;
                assert!((execution_price - expected_price).abs() < 1e-9);
                let expected_qty = ((100_000.0 * 0.95) / expected_price).floor() as i64;
                assert_eq!(quantity, expected_qty);
                assert!((cost - expected_qty as f64 * expected_price).abs() < 1e-9);
                assert!(commission > 10.0);
                assert!((portfolio.cash - (100_000.0 - cost - commission)).abs() < 1e-9);
                assert!(portfolio.position.is_some());
            }
            EntryResult::InsufficientCapital => panic!("expected entry"),
        }
    }

    #[test]
    fn enter_long_insufficient_capital() {
        let mut portfolio = Portfolio::new(50.0);
        let result = enter_long(&mut portfolio, "TSLA", 100.0, date(), 0.95, &make_config());
        assert!(matches!(result, EntryResult::InsufficientCapital));
        assert!(portfolio.position.is_none());
        assert!((portfolio.cash - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn enter_long_commission_tips_over_cash() {
        // Quantity is positive but cost + commission exceeds cash.
        let mut portfolio = Portfolio::new(100.0);
        let config = ExecutionConfig {
            commission_per_trade: 0.0,
            commission_pct: 50.0,
            slippage_pct: 0.0,
        };

        let result = enter_long(&mut portfolio, "TSLA", 10.0, date(), 1.0, &config);
        assert!(matches!(result, EntryResult::InsufficientCapital));
        assert!((portfolio.cash - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn exit_long_profit_round_trip() {
        let mut portfolio = Portfolio::new(100_000.0);
        let config = ExecutionConfig {
            commission_per_trade: 10.0,
            commission_pct: 0.0,
            slippage_pct: 0.0,
        };

        let entry = enter_long(&mut portfolio, "TSLA", 100.0, date(), 0.5, &config);
        let (entry_commission, quantity) = match entry {
            EntryResult::Entered {
                commission,
                quantity,
                ..
            } => (commission, quantity),
            _ => panic!("expected entry"),
        };

        let exit = exit_long(&mut portfolio, 110.0, date(), entry_commission, &config)
            .expect("exit should succeed");

        let expected_pnl = quantity as f64 * 10.0 - entry_commission - 10.0;
        assert!((exit.pnl - expected_pnl).abs() < 1e-9);
        assert!(portfolio.position.is_none());
        assert_eq!(portfolio.closed_trades.len(), 1);
        assert!((portfolio.closed_trades[0].pnl - expected_pnl).abs() < 1e-9);
    }

    #[test]
    fn exit_long_loss() {
        let mut portfolio = Portfolio::new(100_000.0);
        let config = ExecutionConfig::default();

        enter_long(&mut portfolio, "TSLA", 100.0, date(), 0.5, &config);
        let exit = exit_long(&mut portfolio, 90.0, date(), 0.0, &config).unwrap();

        assert!(exit.pnl < 0.0);
        assert!(portfolio.cash < 100_000.0);
    }

    #[test]
    fn exit_when_flat_is_none() {
        let mut portfolio = Portfolio::new(100_000.0);
        assert!(exit_long(&mut portfolio, 100.0, date(), 0.0, &ExecutionConfig::default()).is_none());
    }

    #[test]
    fn frictionless_round_trip_conserves_cash() {
        let mut portfolio = Portfolio::new(100_000.0);
        let config = ExecutionConfig::default();

        enter_long(&mut portfolio, "TSLA", 100.0, date(), 0.95, &config);
        exit_long(&mut portfolio, 100.0, date(), 0.0, &config);

        assert!(
            (portfolio.cash - 100_000.0).abs() < 1e-9,
            "flat round-trip should restore cash, got {}",
            portfolio.cash,
        );
    }
}
