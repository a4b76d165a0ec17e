//! Portfolio state and equity tracking.
//!
//! Single-symbol, single-position accounting: at most one open position at a
//! time, matching the strategies this engine runs.

use chrono::NaiveDate;

use crate::domain::position::{ClosedTrade, Position};
use crate::domain::signal::PositionState;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub position: Option<Position>,
    pub closed_trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            position: None,
            closed_trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    /// Position state as the signal evaluator sees it.
    pub fn position_state(&self) -> PositionState {
        if self.position.is_some() {
            PositionState::Long
        } else {
            PositionState::Flat
        }
    }

    pub fn open_position(&mut self, position: Position) {
        debug_assert!(self.position.is_none(), "position already open");
        self.position = Some(position);
    }

    pub fn take_position(&mut self) -> Option<Position> {
        self.position.take()
    }

    pub fn record_trade(&mut self, trade: ClosedTrade) {
        self.closed_trades.push(trade);
    }

    pub fn record_equity(&mut self, date: NaiveDate, equity: f64) {
        self.equity_curve.push(EquityPoint { date, equity });
    }

    /// Cash plus the open position marked at the given price.
    pub fn total_equity(&self, price: f64) -> f64 {
        let position_value = self
            .position
            .as_ref()
            .map(|pos| pos.market_value(price))
            .unwrap_or(0.0);
        self.cash + position_value
    }
}
