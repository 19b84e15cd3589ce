//! Core data types for the screener.

mod classification;
mod ohlcv;
mod timeframe;

pub use classification::{Classification, TrendDirection};
pub use ohlcv::{Bar, BarSeries};
pub use timeframe::{Lookback, Timeframe};
