//! CSV cache data adapter.
//!
//! Reads per-symbol files named `<SYMBOL>.csv` from a cache directory, in the
//! column order the download scripts write them: Date, Open, High, Low,
//! Close, Volume.

use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::domain::error::LunatraderError;
use crate::domain::ohlcv::{self, OhlcvBar};
use crate::ports::data_port::DataPort;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<OhlcvBar>, LunatraderError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| LunatraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| LunatraderError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let field = |idx: usize, name: &str| -> Result<&str, LunatraderError> {
                record.get(idx).ok_or_else(|| LunatraderError::Data {
                    reason: format!("missing {} column in {}", name, path.display()),
                })
            };

            let date = NaiveDate::parse_from_str(field(0, "date")?, "%Y-%m-%d").map_err(|e| {
                LunatraderError::Data {
                    reason: format!("invalid date in {}: {}", path.display(), e),
                }
            })?;

            let parse_price = |idx: usize, name: &str| -> Result<f64, LunatraderError> {
                field(idx, name)?.parse().map_err(|e| LunatraderError::Data {
                    reason: format!("invalid {} value in {}: {}", name, path.display(), e),
                })
            };

            let volume: i64 = field(5, "volume")?
                .parse::<f64>()
                .map_err(|e| LunatraderError::Data {
                    reason: format!("invalid volume value in {}: {}", path.display(), e),
                })? as i64;

            bars.push(OhlcvBar {
                symbol: symbol.to_string(),
                date,
                open: parse_price(1, "open")?,
                high: parse_price(2, "high")?,
                low: parse_price(3, "low")?,
                close: parse_price(4, "close")?,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        ohlcv::validate_series(&bars)?;
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, LunatraderError> {
        let mut bars = self.read_all(symbol)?;
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, LunatraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| LunatraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LunatraderError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(stem) = name_str.strip_suffix(".csv") {
                symbols.push(stem.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, LunatraderError> {
        if !self.csv_path(symbol).exists() {
            return Ok(None);
        }
        let bars = self.read_all(symbol)?;
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, bars.len()))),
            _ => Ok(None),
        }
    }
}
