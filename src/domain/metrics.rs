//! Performance metrics over a completed backtest.

use super::portfolio::{EquityPoint, Portfolio};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
}

impl Metrics {
    pub fn total_trades(&self) -> usize {
        self.trades_won + self.trades_lost + self.trades_breakeven
    }

    pub fn compute(portfolio: &Portfolio, risk_free_rate: f64) -> Self {
        let curve = &portfolio.equity_curve;
        let initial = portfolio.initial_capital;

        let final_equity = curve.last().map(|p| p.equity).unwrap_or(initial);
        let total_return = if initial > 0.0 {
            (final_equity - initial) / initial
        } else {
            0.0
        };

        let years = curve.len() as f64 / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let (sharpe_ratio, sortino_ratio) =
            risk_adjusted(curve, risk_free_rate / TRADING_DAYS_PER_YEAR);
        let max_drawdown = drawdown(curve);

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = 0.0f64;
        let mut total_losses = 0.0f64;
        let mut largest_win = 0.0f64;
        let mut largest_loss = 0.0f64;

        for trade in &portfolio.closed_trades {
            if trade.pnl > 0.0 {
                trades_won += 1;
                total_wins += trade.pnl;
                largest_win = largest_win.max(trade.pnl);
            } else if trade.pnl < 0.0 {
                trades_lost += 1;
                total_losses += trade.pnl.abs();
                largest_loss = largest_loss.max(trade.pnl.abs());
            } else {
                trades_breakeven += 1;
            }
        }

        let total = trades_won + trades_lost + trades_breakeven;
        let win_rate = if total > 0 {
            trades_won as f64 / total as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        Metrics {
            total_return,
            annualized_return,
            sharpe_ratio,
            sortino_ratio,
            max_drawdown,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            profit_factor,
            avg_win: if trades_won > 0 {
                total_wins / trades_won as f64
            } else {
                0.0
            },
            avg_loss: if trades_lost > 0 {
                total_losses / trades_lost as f64
            } else {
                0.0
            },
            largest_win,
            largest_loss,
        }
    }
}

/// Largest peak-to-trough equity decline as a fraction of the peak.
fn drawdown(curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0f64;
    for point in curve {
        peak = peak.max(point.equity);
        if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
        }
    }
    max_dd
}

/// Annualized Sharpe and Sortino ratios over daily equity returns. Sortino
/// penalizes only the downside deviation below the daily risk-free rate.
fn risk_adjusted(curve: &[EquityPoint], daily_rf: f64) -> (f64, f64) {
    if curve.len() < 2 {
        return (0.0, 0.0);
    }

    let returns: Vec<f64> = curve
        .windows(2)
        .map(|w| {
            if w[0].equity > 0.0 {
                (w[1].equity - w[0].equity) / w[0].equity
            } else {
                0.0
            }
        })
        .collect();

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let excess = mean - daily_rf;

    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    let sharpe = if stddev > 0.0 {
        (excess / stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    let downside_variance = returns
        .iter()
        .filter(|&&r| r < daily_rf)
        .map(|&r| (r - daily_rf).powi(2))
        .sum::<f64>()
        / n;
    let downside_stddev = downside_variance.sqrt();
    let sortino = if downside_stddev > 0.0 {
        (excess / downside_stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    (sharpe, sortino)
}
