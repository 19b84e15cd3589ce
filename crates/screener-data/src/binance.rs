//! Binance spot klines fetcher.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use screener_core::error::DataError;
use screener_core::traits::BarFetcher;
use screener_core::types::{Bar, BarSeries, Lookback, Timeframe};

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Largest page the klines endpoint returns.
const MAX_LIMIT: usize = 1000;

/// Map a timeframe to a Binance kline interval.
pub fn binance_interval(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::Minute1 => "1m",
        Timeframe::Minute3 => "3m",
        Timeframe::Minute5 => "5m",
        Timeframe::Minute15 => "15m",
        Timeframe::Minute30 => "30m",
        Timeframe::Hour1 => "1h",
        Timeframe::Hour4 => "4h",
        Timeframe::Daily => "1d",
        Timeframe::Weekly => "1w",
    }
}

/// Binance REST client for klines.
pub struct BinanceFetcher {
    base_url: String,
    client: Client,
}

impl BinanceFetcher {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DataError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl BarFetcher for BinanceFetcher {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        lookback: Lookback,
    ) -> Result<BarSeries, DataError> {
        let limit = lookback.bar_count(timeframe).clamp(1, MAX_LIMIT);
        let url = format!("{}/api/v3/klines", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.to_uppercase()),
                ("interval", binance_interval(timeframe).to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            // -1121 is Binance's "Invalid symbol."
            if text.contains("-1121") {
                return Err(DataError::SymbolNotFound(symbol.to_string()));
            }
            return Err(DataError::ApiError(format!("{}: {}", status, text)));
        }

        let rows: Vec<Vec<Value>> = resp
            .json()
            .await
            .map_err(|e| DataError::ParseError(e.to_string()))?;
        let series = parse_klines(symbol, timeframe, &rows)?;

        debug!(symbol, %timeframe, bars = series.len(), "Fetched Binance klines");
        Ok(series)
    }

    fn name(&self) -> &str {
        "binance"
    }
}

/// Binance sends prices as strings and times as integers.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn parse_klines(symbol: &str, timeframe: Timeframe, rows: &[Vec<Value>]) -> Result<BarSeries, DataError> {
    let bars = rows
        .iter()
        .map(|row| {
            let get = |i: usize| row.get(i).and_then(number);
            match (get(0), get(1), get(2), get(3), get(4), get(5)) {
                (Some(t), Some(o), Some(h), Some(l), Some(c), Some(v)) => {
                    Ok(Bar::new(t as i64, o, h, l, c, v))
                }
                _ => Err(DataError::ParseError(format!("Malformed kline: {:?}", row))),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    if bars.is_empty() {
        return Err(DataError::NoDataAvailable);
    }
    Ok(BarSeries::from_bars(symbol, timeframe, bars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_klines() {
        let rows: Vec<Vec<Value>> = serde_json::from_str(
            r#"[
                [1717459200000, "67000.10", "67100.00", "66900.00", "67050.50", "12.345", 1717459499999, "0", 10, "0", "0", "0"],
                [1717459500000, "67050.50", "67200.00", "67000.00", "67150.00", "8.5", 1717459799999, "0", 10, "0", "0", "0"]
            ]"#,
        )
        .unwrap();

        let series = parse_klines("BTCUSDT", Timeframe::Minute5, &rows).unwrap();
        assert_eq!(series.len(), 2);
        let last = series.last().unwrap();
        assert_eq!(last.timestamp, 1717459500000);
        assert_eq!(last.close, 67150.0);
        assert_eq!(last.volume, 8.5);
    }

    #[test]
    fn test_malformed_kline() {
        let rows: Vec<Vec<Value>> = serde_json::from_str(r#"[[1717459200000, "abc"]]"#).unwrap();
        assert!(matches!(
            parse_klines("BTCUSDT", Timeframe::Minute5, &rows),
            Err(DataError::ParseError(_))
        ));
    }

    #[test]
    fn test_empty_response() {
        assert!(matches!(
            parse_klines("BTCUSDT", Timeframe::Minute5, &[]),
            Err(DataError::NoDataAvailable)
        ));
    }

    #[test]
    fn test_every_timeframe_has_an_interval() {
        for tf in Timeframe::all() {
            assert_eq!(binance_interval(*tf), tf.to_string());
        }
    }
}
