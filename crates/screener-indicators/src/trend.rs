//! Trend indicators.

use screener_core::traits::OhlcvIndicator;
use screener_core::types::Bar;
use serde::{Deserialize, Serialize};

use crate::volatility::Atr;

/// Supertrend state at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupertrendPoint {
    /// `(high + low) / 2 + multiplier * ATR`, absent during ATR warm-up
    pub upper: Option<f64>,
    /// `(high + low) / 2 - multiplier * ATR`, absent during ATR warm-up
    pub lower: Option<f64>,
    /// true = bullish band regime
    pub bullish: bool,
}

/// Supertrend: a volatility band around the bar midpoint whose regime flips
/// when the close crosses the band computed on the previous bar.
///
/// The state machine starts bullish at the first bar of the window and is
/// replayed over the whole window on every call, so a short window and a
/// long window over the same instrument can disagree.
#[derive(Debug, Clone)]
pub struct Supertrend {
    atr: Atr,
    period: usize,
    multiplier: f64,
}

impl Supertrend {
    /// Create a Supertrend with default parameters (10, 3.0).
    pub fn new() -> Self {
        Self::with_params(10, 3.0)
    }

    /// Create a Supertrend with custom ATR period and band multiplier.
    pub fn with_params(period: usize, multiplier: f64) -> Self {
        assert!(multiplier > 0.0, "Multiplier must be positive");
        Self {
            atr: Atr::new(period),
            period,
            multiplier,
        }
    }

    /// Regime at the last bar, if the window is long enough.
    pub fn is_bullish(&self, bars: &[Bar]) -> Option<bool> {
        self.latest(bars).ok().map(|p| p.bullish)
    }
}

impl Default for Supertrend {
    fn default() -> Self {
        Self::new()
    }
}

impl OhlcvIndicator for Supertrend {
    type Output = SupertrendPoint;

    /// One point per bar, including the warm-up bars.
    fn calculate(&self, bars: &[Bar]) -> Vec<SupertrendPoint> {
        let atr = self.atr.calculate(bars);
        // atr[k] belongs to bar k + offset
        let offset = self.period - 1;

        let mut points: Vec<SupertrendPoint> = Vec::with_capacity(bars.len());
        for (i, bar) in bars.iter().enumerate() {
            let band_width = i
                .checked_sub(offset)
                .and_then(|k| atr.get(k))
                .map(|a| self.multiplier * a);
            let basis = bar.median_price();
            let upper = band_width.map(|w| basis + w);
            let lower = band_width.map(|w| basis - w);

            let bullish = match points.last() {
                None => true,
                Some(prev) => match (prev.bullish, prev.lower, prev.upper) {
                    (true, Some(prev_lower), _) => bar.close >= prev_lower,
                    (false, _, Some(prev_upper)) => bar.close > prev_upper,
                    // previous bands still warming up
                    (state, _, _) => state,
                },
            };

            points.push(SupertrendPoint {
                upper,
                lower,
                bullish,
            });
        }

        points
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "Supertrend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(i: usize, close: f64) -> Bar {
        Bar::new(i as i64 * 60_000, close, close + 1.0, close - 1.0, close, 1000.0)
    }

    fn rising(n: usize) -> Vec<Bar> {
        (0..n).map(|i| bar(i, 100.0 + i as f64)).collect()
    }

    #[test]
    fn test_rising_series_stays_bullish() {
        let st = Supertrend::new();
        let points = st.calculate(&rising(40));

        assert_eq!(points.len(), 40);
        assert!(points.iter().all(|p| p.bullish));
        assert_eq!(st.is_bullish(&rising(40)), Some(true));
    }

    #[test]
    fn test_bands_absent_during_warm_up() {
        let st = Supertrend::with_params(10, 3.0);
        let points = st.calculate(&rising(12));

        assert!(points[..9].iter().all(|p| p.upper.is_none() && p.lower.is_none()));
        assert!(points[9].upper.is_some());
        let p = points[11];
        assert!(p.upper.unwrap() > p.lower.unwrap());
    }

    #[test]
    fn test_crash_flips_bearish_then_recovery_flips_back() {
        let st = Supertrend::with_params(3, 1.0);
        let mut bars = rising(10);
        // close far below the previous lower band
        bars.push(bar(10, 80.0));
        let points = st.calculate(&bars);
        assert!(!points.last().unwrap().bullish);

        // close far above the previous upper band
        bars.push(bar(11, 130.0));
        let points = st.calculate(&bars);
        assert!(points.last().unwrap().bullish);
    }

    #[test]
    fn test_bearish_holds_at_upper_band() {
        let st = Supertrend::with_params(2, 1.0);
        let bars = vec![
            bar(0, 100.0),
            bar(1, 100.0),
            bar(2, 90.0), // below lower band of bar 1 (100 - 2 = 98): flips bearish
        ];
        let points = st.calculate(&bars);
        assert!(!points[2].bullish);

        // bar 2 upper band = 90 + ATR; closing exactly on it stays bearish
        let upper = points[2].upper.unwrap();
        let mut held = bars.clone();
        held.push(bar(3, upper));
        assert!(!st.calculate(&held)[3].bullish);
    }

    #[test]
    fn test_insufficient_bars() {
        let st = Supertrend::with_params(10, 3.0);
        assert!(st.latest(&rising(10)).is_err());
        assert_eq!(st.is_bullish(&rising(10)), None);
        assert!(st.latest(&rising(11)).is_ok());
    }

    #[test]
    fn test_window_length_changes_the_answer() {
        // a window that starts inside a downtrend begins bullish, so it can
        // disagree with a longer window over the same bars
        let st = Supertrend::with_params(3, 0.5);
        let mut bars: Vec<Bar> = (0..20).map(|i| bar(i, 200.0 - 3.0 * i as f64)).collect();
        bars.push(bar(20, 141.5));

        let long = st.calculate(&bars);
        let short = st.calculate(&bars[18..]);
        assert!(!long.last().unwrap().bullish);
        assert_eq!(short.len(), 3);
        assert!(short.last().unwrap().bullish);
    }
}
