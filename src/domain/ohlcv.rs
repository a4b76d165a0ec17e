//! Daily OHLCV bar representation.

use chrono::NaiveDate;

use crate::domain::error::LunatraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// Close-to-close return against the previous session's close.
    pub fn daily_return(&self, prev_close: f64) -> f64 {
        if prev_close > 0.0 {
            (self.close - prev_close) / prev_close
        } else {
            0.0
        }
    }
}

/// Validate a bar series before it enters the engine.
///
/// Dates must be strictly increasing (which also rules out duplicates) and
/// every price must be finite. Volume may be zero (halted sessions).
pub fn validate_series(bars: &[OhlcvBar]) -> Result<(), LunatraderError> {
    for pair in bars.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(LunatraderError::Data {
                reason: format!(
                    "bars out of order: {} followed by {}",
                    pair[0].date, pair[1].date
                ),
            });
        }
    }

    for bar in bars {
        let prices = [bar.open, bar.high, bar.low, bar.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(LunatraderError::Data {
                reason: format!("non-finite price in {} bar on {}", bar.symbol, bar.date),
            });
        }
    }

    Ok(())
}
