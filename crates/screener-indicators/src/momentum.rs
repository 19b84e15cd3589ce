//! Momentum indicators.

use screener_core::traits::{Indicator, MultiOutputIndicator};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::moving_average::Ema;

/// Relative Strength Index (RSI).
///
/// Gains and losses are averaged with a simple rolling mean over `period`
/// close-to-close deltas, so `period + 1` closes are needed for the first
/// value.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    ///
    /// Common periods are 14 (default) or 9.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    fn from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        // no losses in the window: RS is unbounded and RSI saturates
        if avg_loss == 0.0 {
            return 100.0;
        }
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() <= self.period {
            return vec![];
        }

        let (gains, losses): (Vec<f64>, Vec<f64>) = data
            .windows(2)
            .map(|w| {
                let change = w[1] - w[0];
                (change.max(0.0), (-change).max(0.0))
            })
            .unzip();

        let period_f64 = self.period as f64;
        gains
            .windows(self.period)
            .zip(losses.windows(self.period))
            .map(|(g, l)| {
                let avg_gain = g.iter().sum::<f64>() / period_f64;
                let avg_loss = l.iter().sum::<f64>() / period_f64;
                Self::from_averages(avg_gain, avg_loss)
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period + 1 // Need period+1 data points
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// RSI band an observation falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiZone {
    /// Classify with strict thresholds: above `overbought`, below `oversold`.
    pub fn classify(rsi: f64, overbought: f64, oversold: f64) -> Self {
        if rsi > overbought {
            RsiZone::Overbought
        } else if rsi < oversold {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }
}

impl fmt::Display for RsiZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RsiZone::Overbought => write!(f, "Overbought"),
            RsiZone::Oversold => write!(f, "Oversold"),
            RsiZone::Neutral => write!(f, "Neutral"),
        }
    }
}

/// MACD regime at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdRegime {
    Bullish,
    Bearish,
}

impl fmt::Display for MacdRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacdRegime::Bullish => write!(f, "Bullish"),
            MacdRegime::Bearish => write!(f, "Bearish"),
        }
    }
}

/// MACD (Moving Average Convergence Divergence) output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: f64,
    /// Signal line (EMA of MACD)
    pub signal: f64,
    /// Histogram (MACD - Signal)
    pub histogram: f64,
}

impl MacdOutput {
    /// Bullish iff the MACD line is strictly above the signal line.
    pub fn regime(&self) -> MacdRegime {
        if self.macd > self.signal {
            MacdRegime::Bullish
        } else {
            MacdRegime::Bearish
        }
    }
}

/// MACD indicator.
///
/// Both EMAs and the signal line use span smoothing seeded from the first
/// close, so a value exists for every bar.
#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
}

impl Macd {
    /// Create a new MACD with default parameters (12, 26, 9).
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast > 0 && slow > 0 && signal > 0);
        assert!(fast < slow, "Fast period must be less than slow period");
        Self {
            fast: Ema::new(fast),
            slow: Ema::new(slow),
            signal: Ema::new(signal),
        }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiOutputIndicator for Macd {
    type Outputs = MacdOutput;

    fn calculate(&self, data: &[f64]) -> Vec<MacdOutput> {
        let fast = self.fast.calculate(data);
        let slow = self.slow.calculate(data);

        let macd_line: Vec<f64> = fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect();
        let signal_line = self.signal.calculate(&macd_line);

        macd_line
            .iter()
            .zip(signal_line.iter())
            .map(|(&macd, &signal)| MacdOutput {
                macd,
                signal,
                histogram: macd - signal,
            })
            .collect()
    }

    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_bounds() {
        let rsi = Rsi::new(14);
        let data: Vec<f64> = (0..30)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0)
            .collect();

        let result = rsi.calculate(&data);
        assert_eq!(result.len(), data.len() - 14);

        for value in &result {
            assert!(*value >= 0.0 && *value <= 100.0);
        }
    }

    #[test]
    fn test_rsi_all_gains_saturates_without_dividing_by_zero() {
        let rsi = Rsi::new(14);
        let data: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let result = rsi.calculate(&data);

        assert!(!result.is_empty());
        for value in result {
            assert!(value.is_finite());
            assert!((value - 100.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_rsi_all_losses() {
        let rsi = Rsi::new(5);
        let data = vec![7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        let result = rsi.calculate(&data);

        assert!(!result.is_empty());
        assert!(result[0].abs() < 1e-10);
    }

    #[test]
    fn test_rsi_rolling_mean() {
        // deltas: +2, -1, +1 => avg gain 1, avg loss 1/3, RS 3, RSI 75
        let rsi = Rsi::new(3);
        let result = rsi.calculate(&[10.0, 12.0, 11.0, 12.0]);

        assert_eq!(result.len(), 1);
        assert!((result[0] - 75.0).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let rsi = Rsi::new(14);
        let data: Vec<f64> = (0..14).map(|i| i as f64).collect();
        assert!(rsi.calculate(&data).is_empty());
        assert!(rsi.latest(&data).is_err());
    }

    #[test]
    fn test_rsi_zones() {
        assert_eq!(RsiZone::classify(75.0, 70.0, 30.0), RsiZone::Overbought);
        assert_eq!(RsiZone::classify(70.0, 70.0, 30.0), RsiZone::Neutral);
        assert_eq!(RsiZone::classify(25.0, 70.0, 30.0), RsiZone::Oversold);
    }

    #[test]
    fn test_macd_uptrend_is_bullish() {
        let macd = Macd::new();
        let data: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let result = macd.calculate(&data);

        assert_eq!(result.len(), data.len());
        let last = result.last().unwrap();
        assert!(last.macd > 0.0);
        assert_eq!(last.regime(), MacdRegime::Bullish);
    }

    #[test]
    fn test_macd_downtrend_is_bearish() {
        let macd = Macd::new();
        let data: Vec<f64> = (0..50).map(|i| 200.0 - i as f64).collect();
        let last = macd.latest(&data).unwrap();

        assert!(last.macd < 0.0);
        assert_eq!(last.regime(), MacdRegime::Bearish);
    }

    #[test]
    fn test_macd_equal_lines_are_bearish() {
        let flat = MacdOutput {
            macd: 0.0,
            signal: 0.0,
            histogram: 0.0,
        };
        assert_eq!(flat.regime(), MacdRegime::Bearish);
    }

    #[test]
    fn test_macd_short_series_is_defined() {
        let macd = Macd::with_periods(5, 10, 3);
        let result = macd.calculate(&[100.0, 101.0, 102.0]);
        assert_eq!(result.len(), 3);
        assert!(result[0].macd.abs() < 1e-12);
    }
}
