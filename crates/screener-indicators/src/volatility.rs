//! Volatility indicators.

use screener_core::traits::{Indicator, MultiOutputIndicator, OhlcvIndicator};
use screener_core::types::Bar;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;

use crate::moving_average::Sma;

/// Rolling sample standard deviation (ddof = 1).
#[derive(Debug, Clone)]
pub struct StdDev {
    period: usize,
}

impl StdDev {
    /// Create a new standard deviation indicator.
    pub fn new(period: usize) -> Self {
        assert!(period > 1, "Period must be greater than 1");
        Self { period }
    }
}

impl Indicator for StdDev {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.period {
            return vec![];
        }

        data.windows(self.period).map(|w| w.std_dev()).collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "StdDev"
    }
}

/// Average True Range (ATR).
///
/// Simple rolling mean of the true range. The first bar has no previous
/// close, so its true range is its high-low range.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    /// Create a new ATR indicator.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// True range for every bar.
    pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
        let mut prev_close = None;
        bars.iter()
            .map(|bar| {
                let tr = bar.true_range(prev_close);
                prev_close = Some(bar.close);
                tr
            })
            .collect()
    }
}

impl OhlcvIndicator for Atr {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> Vec<f64> {
        if bars.len() < self.period {
            return vec![];
        }

        let period_f64 = self.period as f64;
        Self::true_ranges(bars)
            .windows(self.period)
            .map(|w| w.iter().sum::<f64>() / period_f64)
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "ATR"
    }
}

/// Bollinger Bands output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerOutput {
    /// Upper band
    pub upper: f64,
    /// Middle band (SMA)
    pub middle: f64,
    /// Lower band
    pub lower: f64,
    /// Sample standard deviation of the window
    pub std_dev: f64,
}

impl BollingerOutput {
    /// Check if price is above upper band.
    pub fn is_above(&self, price: f64) -> bool {
        price > self.upper
    }

    /// Check if price is below lower band.
    pub fn is_below(&self, price: f64) -> bool {
        price < self.lower
    }
}

/// Result of comparing the last two closes against their bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BandCross {
    /// Close moved from inside/at the upper band to above it.
    #[serde(rename = "UP")]
    Up,
    /// Close moved from inside/at the lower band to below it.
    #[serde(rename = "DOWN")]
    Down,
    #[default]
    #[serde(rename = "NO_BB")]
    NoCross,
}

impl fmt::Display for BandCross {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandCross::Up => write!(f, "UP"),
            BandCross::Down => write!(f, "DOWN"),
            BandCross::NoCross => write!(f, "NO_BB"),
        }
    }
}

/// Compare two consecutive closes against their bands.
///
/// The breakout test runs first, so on a degenerate band where both
/// conditions hold the result is [`BandCross::Up`].
pub fn detect_band_cross(
    prev_close: f64,
    close: f64,
    prev: &BollingerOutput,
    current: &BollingerOutput,
) -> BandCross {
    if prev_close <= prev.upper && close > current.upper {
        BandCross::Up
    } else if prev_close >= prev.lower && close < current.lower {
        BandCross::Down
    } else {
        BandCross::NoCross
    }
}

/// Bollinger Bands.
///
/// Middle band is the SMA of close; the bands sit `multiplier` sample
/// standard deviations away.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
    multiplier: f64,
}

impl BollingerBands {
    /// Create new Bollinger Bands with default parameters (20, 2.0).
    pub fn new() -> Self {
        Self::with_params(20, 2.0)
    }

    /// Create Bollinger Bands with custom parameters.
    pub fn with_params(period: usize, multiplier: f64) -> Self {
        assert!(period > 1, "Period must be greater than 1");
        assert!(multiplier > 0.0, "Std dev multiplier must be positive");
        Self { period, multiplier }
    }

    /// Bars needed before a cross can be evaluated.
    pub fn cross_period(&self) -> usize {
        self.period + 2
    }

    /// Band cross between the last two closes.
    ///
    /// Returns [`BandCross::NoCross`] when fewer than
    /// [`cross_period`](Self::cross_period) closes are available.
    pub fn band_cross(&self, closes: &[f64]) -> BandCross {
        if closes.len() < self.cross_period() {
            return BandCross::NoCross;
        }

        let bands = self.calculate(closes);
        match (bands.as_slice(), closes) {
            ([.., prev, current], [.., prev_close, close]) => {
                detect_band_cross(*prev_close, *close, prev, current)
            }
            _ => BandCross::NoCross,
        }
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiOutputIndicator for BollingerBands {
    type Outputs = BollingerOutput;

    fn calculate(&self, data: &[f64]) -> Vec<BollingerOutput> {
        if data.len() < self.period {
            return vec![];
        }

        let middles = Sma::new(self.period).calculate(data);
        let deviations = StdDev::new(self.period).calculate(data);

        middles
            .into_iter()
            .zip(deviations)
            .map(|(middle, std_dev)| BollingerOutput {
                upper: middle + self.multiplier * std_dev,
                middle,
                lower: middle - self.multiplier * std_dev,
                std_dev,
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Bollinger Bands"
    }
}
