//! Yahoo Finance chart API fetcher.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::debug;

use screener_core::error::DataError;
use screener_core::traits::BarFetcher;
use screener_core::types::{Bar, BarSeries, Lookback, Timeframe};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo fetcher configuration.
#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    /// Appended to every symbol, e.g. `.NS` for NSE listings
    pub symbol_suffix: String,
    /// Scale OHLC by the adjusted close ratio
    pub auto_adjust: bool,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            symbol_suffix: ".NS".to_string(),
            auto_adjust: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Map a timeframe to a Yahoo chart interval.
pub fn yahoo_interval(timeframe: Timeframe) -> Result<&'static str, DataError> {
    match timeframe {
        Timeframe::Minute1 => Ok("1m"),
        Timeframe::Minute5 => Ok("5m"),
        Timeframe::Minute15 => Ok("15m"),
        Timeframe::Minute30 => Ok("30m"),
        Timeframe::Hour1 => Ok("60m"),
        Timeframe::Daily => Ok("1d"),
        Timeframe::Weekly => Ok("1wk"),
        Timeframe::Minute3 | Timeframe::Hour4 => Err(DataError::InvalidTimeframe(format!(
            "{} is not offered by Yahoo",
            timeframe
        ))),
    }
}

/// Calendar days to request so that `lookback` bars survive market closures.
fn request_days(lookback: Lookback, timeframe: Timeframe) -> i64 {
    match lookback {
        Lookback::Days(days) => i64::from(days),
        // exchanges trade a fraction of each day, and not at weekends
        Lookback::Bars(_) => i64::from(lookback.days(timeframe)) * 4 + 3,
    }
}

/// Yahoo Finance chart client.
pub struct YahooFetcher {
    config: YahooConfig,
    client: Client,
}

impl YahooFetcher {
    pub fn new(config: YahooConfig) -> Result<Self, DataError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("Mozilla/5.0 (screener)"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Ticker as sent to Yahoo.
    pub fn ticker(&self, symbol: &str) -> String {
        if self.config.symbol_suffix.is_empty() || symbol.contains('.') {
            symbol.to_string()
        } else {
            format!("{}{}", symbol, self.config.symbol_suffix)
        }
    }
}

#[async_trait]
impl BarFetcher for YahooFetcher {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        lookback: Lookback,
    ) -> Result<BarSeries, DataError> {
        let interval = yahoo_interval(timeframe)?;
        let end = Utc::now();
        let start = end - Duration::days(request_days(lookback, timeframe));
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.config.base_url,
            self.ticker(symbol)
        );

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("interval", interval.to_string()),
                ("period1", start.timestamp().to_string()),
                ("period2", end.timestamp().to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound(symbol.to_string()));
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DataError::ApiError(format!("{}: {}", status, text)));
        }

        let body: ChartResponse = resp
            .json()
            .await
            .map_err(|e| DataError::ParseError(e.to_string()))?;
        let series = parse_chart(symbol, timeframe, body, self.config.auto_adjust)?;

        debug!(symbol, %timeframe, bars = series.len(), "Fetched Yahoo chart");
        Ok(trim(series, lookback))
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

/// Keep the most recent bars of a `Bars` lookback.
pub(crate) fn trim(series: BarSeries, lookback: Lookback) -> BarSeries {
    match lookback {
        Lookback::Bars(n) if series.len() > n => BarSeries::from_bars(
            series.symbol.clone(),
            series.timeframe,
            series.last_n(n).to_vec(),
        ),
        _ => series,
    }
}

fn field(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

fn parse_chart(
    symbol: &str,
    timeframe: Timeframe,
    body: ChartResponse,
    auto_adjust: bool,
) -> Result<BarSeries, DataError> {
    if let Some(err) = body.chart.error {
        return Err(if err.code == "Not Found" {
            DataError::SymbolNotFound(symbol.to_string())
        } else {
            DataError::ApiError(format!("{}: {}", err.code, err.description))
        });
    }

    let result = body
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or(DataError::NoDataAvailable)?;
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or(DataError::NoDataAvailable)?;
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let bars: Vec<Bar> = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            // rows with a missing price are holidays or halted sessions
            let open = field(&quote.open, i)?;
            let high = field(&quote.high, i)?;
            let low = field(&quote.low, i)?;
            let close = field(&quote.close, i)?;
            let volume = field(&quote.volume, i).unwrap_or(0.0);

            let factor = match field(&adjclose, i) {
                Some(adj) if auto_adjust && close != 0.0 => adj / close,
                _ => 1.0,
            };

            Some(Bar::new(
                ts * 1000,
                open * factor,
                high * factor,
                low * factor,
                close * factor,
                volume,
            ))
        })
        .collect();

    if bars.is_empty() {
        return Err(DataError::NoDataAvailable);
    }
    Ok(BarSeries::from_bars(symbol, timeframe, bars))
}
