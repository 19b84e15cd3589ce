//! Technical indicators for the signal screener.
//!
//! Batch implementations recomputed from scratch over a fetched window:
//! - Moving averages (SMA, span-based EMA)
//! - Momentum indicators (RSI, MACD)
//! - Volatility indicators (StdDev, ATR, Bollinger Bands and band crosses)
//! - Trend indicators (Supertrend)
//!
//! [`IndicatorSnapshot`] bundles the latest value of each for one series.

pub mod momentum;
pub mod moving_average;
pub mod snapshot;
pub mod trend;
pub mod volatility;

pub use momentum::{Macd, MacdOutput, MacdRegime, Rsi, RsiZone};
pub use moving_average::{Ema, EmaWeighting, Sma};
pub use snapshot::{IndicatorParams, IndicatorSnapshot};
pub use trend::{Supertrend, SupertrendPoint};
pub use volatility::{detect_band_cross, Atr, BandCross, BollingerBands, BollingerOutput, StdDev};
