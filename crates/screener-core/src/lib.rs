//! Core types and traits for the signal screener.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries, Timeframe, Lookback)
//! - The classification vocabulary shared by classifiers, alerts and reports
//! - Core traits for indicators, bar fetchers and notification sinks

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ScreenerError, ScreenerResult};
pub use traits::*;
pub use types::*;
