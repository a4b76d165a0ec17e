//! Data access port trait.

use chrono::NaiveDate;

use crate::domain::error::LunatraderError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// Ordered bars for one symbol within the inclusive date range.
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, LunatraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, LunatraderError>;

    /// (first date, last date, bar count) for a symbol, or `None` if the
    /// cache holds nothing for it.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, LunatraderError>;
}
