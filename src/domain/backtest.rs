//! Backtest engine and event loop.
//!
//! Orders created on bar t fill at the open of bar t+1, the way a market
//! order against daily data would. The pending action lives in a local of the
//! event loop and is consumed on the next bar; the portfolio owns the
//! position state the evaluator reads.

use chrono::NaiveDate;

use super::execution::{self, EntryResult, ExecutionConfig};
use super::lunar;
use super::ohlcv::OhlcvBar;
use super::portfolio::Portfolio;
use super::signal::{Action, PhasePair, PositionState, SignalWindow};
use super::strategy::Strategy;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub commission_per_trade: f64,
    pub commission_pct: f64,
    pub slippage_pct: f64,
    pub risk_free_rate: f64,
}

impl BacktestConfig {
    fn execution_config(&self) -> ExecutionConfig {
        ExecutionConfig {
            commission_per_trade: self.commission_per_trade,
            commission_pct: self.commission_pct,
            slippage_pct: self.slippage_pct,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub portfolio: Portfolio,
}

/// Run a strategy over an ordered bar series.
///
/// Per bar: fill the action carried over from the previous bar at today's
/// open, then evaluate the two-bar window against the updated position and
/// carry any non-hold action forward, then mark equity at the close. An
/// action signalled on the final bar never fills; a position still open at
/// the end of data stays open and is valued in the closing equity.
pub fn run_backtest(
    bars: &[OhlcvBar],
    strategy: &Strategy,
    config: &BacktestConfig,
) -> BacktestResult {
    let mut portfolio = Portfolio::new(config.initial_capital);
    let exec_config = config.execution_config();

    let phases: Option<Vec<f64>> = strategy
        .kind
        .uses_phases()
        .then(|| bars.iter().map(|b| lunar::illumination(b.date)).collect());

    let mut pending: Option<Action> = None;
    let mut entry_commission = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        match pending.take() {
            Some(Action::Buy) if portfolio.position_state() == PositionState::Flat => {
                if let EntryResult::Entered {
                    quantity,
                    execution_price,
                    commission,
                    ..
                } = execution::enter_long(
                    &mut portfolio,
                    &bar.symbol,
                    bar.open,
                    bar.date,
                    strategy.position_size,
                    &exec_config,
                ) {
                    entry_commission = commission;
                    eprintln!(
                        "{}, BUY EXECUTED, {} x {:.2}",
                        bar.date, quantity, execution_price
                    );
                }
            }
            Some(Action::Sell) if portfolio.position_state() == PositionState::Long => {
                if let Some(exit) = execution::exit_long(
                    &mut portfolio,
                    bar.open,
                    bar.date,
                    entry_commission,
                    &exec_config,
                ) {
                    eprintln!(
                        "{}, SELL EXECUTED, {} x {:.2} (pnl {:+.2})",
                        bar.date, exit.quantity, exit.exit_price, exit.pnl
                    );
                }
            }
            _ => {}
        }

        if i >= 1 {
            let window = SignalWindow {
                close_prev: bars[i - 1].close,
                close_curr: bar.close,
                phases: phases.as_ref().map(|p| PhasePair {
                    prev: p[i - 1],
                    curr: p[i],
                }),
            };
            let action = strategy.kind.evaluate(&window, portfolio.position_state());
            if action != Action::Hold {
                pending = Some(action);
            }
        }

        portfolio.record_equity(bar.date, portfolio.total_equity(bar.close));
    }

    BacktestResult { portfolio }
}
