//! Open position and closed trade records. Long-only: no strategy here ever
//! shorts.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub quantity: i64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity as f64 * (price - self.entry_price)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub symbol: String,
    pub quantity: i64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub pnl: f64,
}

impl ClosedTrade {
    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_position() -> Position {
        Position {
            symbol: "TSLA".into(),
            quantity: 100,
            entry_price: 200.0,
            entry_date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
        }
    }

    #[test]
    fn market_value() {
        let pos = sample_position();
        assert!((pos.market_value(210.0) - 21_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unrealized_pnl_profit() {
        let pos = sample_position();
        assert!((pos.unrealized_pnl(210.0) - 1_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unrealized_pnl_loss() {
        let pos = sample_position();
        assert!((pos.unrealized_pnl(190.0) - (-1_000.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn holding_days() {
        let trade = ClosedTrade {
            symbol: "TSLA".into(),
            quantity: 100,
            entry_price: 200.0,
            exit_price: 205.0,
            entry_date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            exit_date: NaiveDate::from_ymd_opt(2021, 3, 29).unwrap(),
            pnl: 500.0,
        };
        assert_eq!(trade.holding_days(), 28);
    }
}
