//! Bar fetchers for the signal screener.

mod binance;
mod csv_source;
mod yahoo;

pub use binance::{binance_interval, BinanceFetcher};
pub use csv_source::{load_bars, CsvFetcher};
pub use yahoo::{yahoo_interval, YahooConfig, YahooFetcher};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use screener_core::error::DataError;
use screener_core::traits::BarFetcher;

/// Market-data provider selected in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Yahoo Finance chart API (equities)
    #[default]
    Yahoo,
    /// Binance spot klines (crypto)
    Binance,
    /// Local CSV files
    Csv,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Yahoo => write!(f, "yahoo"),
            Provider::Binance => write!(f, "binance"),
            Provider::Csv => write!(f, "csv"),
        }
    }
}

/// Settings needed to construct any provider's fetcher.
#[derive(Debug, Clone, Default)]
pub struct FetcherOptions {
    /// Exchange suffix for Yahoo tickers
    pub symbol_suffix: String,
    /// Overrides the provider's default endpoint
    pub base_url: Option<String>,
    /// Directory for the CSV provider
    pub csv_dir: Option<PathBuf>,
}

/// Build the fetcher for `provider`.
pub fn build_fetcher(
    provider: Provider,
    options: &FetcherOptions,
) -> Result<Box<dyn BarFetcher>, DataError> {
    match provider {
        Provider::Yahoo => {
            let config = YahooConfig {
                base_url: options
                    .base_url
                    .clone()
                    .unwrap_or_else(|| yahoo::DEFAULT_BASE_URL.to_string()),
                symbol_suffix: options.symbol_suffix.clone(),
                ..Default::default()
            };
            Ok(Box::new(YahooFetcher::new(config)?))
        }
        Provider::Binance => {
            let base_url = options
                .base_url
                .as_deref()
                .unwrap_or(binance::DEFAULT_BASE_URL);
            Ok(Box::new(BinanceFetcher::new(base_url)?))
        }
        Provider::Csv => {
            let dir = options.csv_dir.clone().unwrap_or_else(|| PathBuf::from("data"));
            Ok(Box::new(CsvFetcher::new(dir)?))
        }
    }
}
