//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::LunatraderError;
use crate::domain::strategy::Strategy;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        strategy: &Strategy,
        output_path: &str,
    ) -> Result<(), LunatraderError>;
}
