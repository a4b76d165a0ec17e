//! Plain-text report adapter implementing ReportPort.

use std::fmt::Write as _;
use std::fs;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::LunatraderError;
use crate::domain::metrics::Metrics;
use crate::domain::strategy::Strategy;
use crate::ports::report_port::ReportPort;

pub struct TextReportAdapter {
    risk_free_rate: f64,
}

impl TextReportAdapter {
    pub fn new(risk_free_rate: f64) -> Self {
        Self { risk_free_rate }
    }

    pub fn render(&self, result: &BacktestResult, strategy: &Strategy) -> String {
        let portfolio = &result.portfolio;
        let metrics = Metrics::compute(portfolio, self.risk_free_rate);

        let starting = portfolio.initial_capital;
        let final_equity = portfolio
            .equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(starting);

        let mut out = String::new();
        let _ = writeln!(out, "Backtest Report: {}", strategy.name);
        let _ = writeln!(out, "Strategy kind:   {}", strategy.kind);
        if !strategy.description.is_empty() {
            let _ = writeln!(out, "Description:     {}", strategy.description);
        }
        if let (Some(first), Some(last)) =
            (portfolio.equity_curve.first(), portfolio.equity_curve.last())
        {
            let _ = writeln!(out, "Period:          {} to {}", first.date, last.date);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Starting Portfolio Value: {:.2}", starting);
        let _ = writeln!(out, "Final Portfolio Value:    {:.2}", final_equity);
        let _ = writeln!(out);
        let _ = writeln!(out, "Total Return:     {:.2}%", metrics.total_return * 100.0);
        let _ = writeln!(
            out,
            "Annualized:       {:.2}%",
            metrics.annualized_return * 100.0
        );
        let _ = writeln!(out, "Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
        let _ = writeln!(out, "Sortino Ratio:    {:.2}", metrics.sortino_ratio);
        let _ = writeln!(out, "Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
        let _ = writeln!(out, "Total Trades:     {}", metrics.total_trades());
        let _ = writeln!(out, "Win Rate:         {:.1}%", metrics.win_rate * 100.0);
        let _ = writeln!(out, "Profit Factor:    {:.2}", metrics.profit_factor);

        if !portfolio.closed_trades.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Closed Trades:");
            for trade in &portfolio.closed_trades {
                let _ = writeln!(
                    out,
                    "  {} {} x {:.2} -> {} x {:.2}  pnl {:+.2}  ({} days)",
                    trade.entry_date,
                    trade.quantity,
                    trade.entry_price,
                    trade.exit_date,
                    trade.exit_price,
                    trade.pnl,
                    trade.holding_days(),
                );
            }
        }

        if let Some(pos) = &portfolio.position {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Open Position:    {} x {:.2} since {}",
                pos.quantity, pos.entry_price, pos.entry_date,
            );
        }

        out
    }
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        strategy: &Strategy,
        output_path: &str,
    ) -> Result<(), LunatraderError> {
        let content = self.render(result, strategy);
        fs::write(output_path, content)?;
        Ok(())
    }
}
