//! CSV bar fetcher, for offline runs and replaying saved data.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use screener_core::error::DataError;
use screener_core::traits::BarFetcher;
use screener_core::types::{Bar, BarSeries, Lookback, Timeframe};

use crate::yahoo::trim;

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "date", alias = "Datetime", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

/// Reads `{dir}/{SYMBOL}_{timeframe}.csv`, falling back to
/// `{dir}/{SYMBOL}.csv`.
pub struct CsvFetcher {
    dir: PathBuf,
}

impl CsvFetcher {
    /// Create a new CSV fetcher rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, DataError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(DataError::NoDataAvailable);
        }
        Ok(Self { dir })
    }

    fn path_for(&self, symbol: &str, timeframe: Timeframe) -> Option<PathBuf> {
        [
            self.dir.join(format!("{}_{}.csv", symbol, timeframe)),
            self.dir.join(format!("{}.csv", symbol)),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }
}

#[async_trait]
impl BarFetcher for CsvFetcher {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        lookback: Lookback,
    ) -> Result<BarSeries, DataError> {
        let path = self
            .path_for(symbol, timeframe)
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;

        let bars = load_bars(&path)?;
        let series = BarSeries::from_bars(symbol, timeframe, bars);
        debug!(symbol, path = %path.display(), bars = series.len(), "Loaded CSV bars");

        Ok(match lookback {
            Lookback::Days(days) => {
                let Some(last) = series.last() else {
                    return Ok(series);
                };
                let cutoff = last.timestamp - i64::from(days) * 86_400_000;
                let bars = series
                    .iter()
                    .filter(|b| b.timestamp > cutoff)
                    .copied()
                    .collect();
                BarSeries::from_bars(symbol, timeframe, bars)
            }
            Lookback::Bars(_) => trim(series, lookback),
        })
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Load all bars from a CSV file.
pub fn load_bars(path: &Path) -> Result<Vec<Bar>, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::ParseError(e.to_string()))?;

    let mut bars = Vec::new();

    for result in reader.deserialize() {
        let record: CsvRecord = result.map_err(|e| DataError::ParseError(e.to_string()))?;

        let timestamp = parse_timestamp(&record.date)?;

        bars.push(Bar::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        ));
    }

    Ok(bars)
}

/// Parse various timestamp formats to unix milliseconds.
fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(dt.timestamp_millis());
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y/%m/%d %H:%M:%S"];
    for format in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    for format in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            return Ok(d.and_time(NaiveTime::MIN).and_utc().timestamp_millis());
        }
    }

    // Unix timestamp; assume milliseconds if > 10 digits
    if let Ok(ts) = date_str.parse::<i64>() {
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::ParseError(format!(
        "Could not parse date: {}",
        date_str
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = "Date,Open,High,Low,Close,Volume\n\
        2024-06-03,100,102,99,101,1000\n\
        2024-06-04,101,103,100,102,1100\n\
        2024-06-05,102,104,101,103,1200\n\
        2024-06-06,103,105,102,104,1300\n";

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("2024-01-15").unwrap(), 1705276800000);
        assert!(parse_timestamp("2024-01-15 10:30:00").is_ok());
        assert!(parse_timestamp("2024-01-15T10:30:00+05:30").is_ok());
        assert_eq!(parse_timestamp("1705312800000").unwrap(), 1705312800000); // Unix ms
        assert_eq!(parse_timestamp("1705312800").unwrap(), 1705312800000); // Unix sec
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[tokio::test]
    async fn test_fetch_with_timeframe_specific_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("TCS_1d.csv"), SAMPLE).unwrap();

        let fetcher = CsvFetcher::new(dir.path()).unwrap();
        let series = fetcher
            .fetch("TCS", Timeframe::Daily, Lookback::Bars(3))
            .await
            .unwrap();

        assert_eq!(series.closes(), vec![102.0, 103.0, 104.0]);
    }

    #[tokio::test]
    async fn test_fetch_days_lookback() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("TCS.csv"), SAMPLE).unwrap();

        let fetcher = CsvFetcher::new(dir.path()).unwrap();
        let series = fetcher
            .fetch("TCS", Timeframe::Daily, Lookback::Days(2))
            .await
            .unwrap();

        assert_eq!(series.closes(), vec![103.0, 104.0]);
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let dir = TempDir::new().unwrap();
        let fetcher = CsvFetcher::new(dir.path()).unwrap();
        assert!(matches!(
            fetcher.fetch("NOPE", Timeframe::Daily, Lookback::Days(15)).await,
            Err(DataError::SymbolNotFound(_))
        ));
    }

    #[test]
    fn test_missing_directory() {
        assert!(CsvFetcher::new("/definitely/not/here").is_err());
    }
}
