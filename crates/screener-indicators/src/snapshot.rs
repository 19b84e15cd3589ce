//! Latest indicator values for one bar series.

use screener_core::error::IndicatorError;
use screener_core::traits::{Indicator, MultiOutputIndicator, OhlcvIndicator};
use screener_core::types::{BarSeries, Timeframe};
use serde::{Deserialize, Serialize};

use crate::momentum::{Macd, MacdOutput, MacdRegime, Rsi, RsiZone};
use crate::moving_average::Ema;
use crate::trend::Supertrend;
use crate::volatility::{BandCross, BollingerBands, BollingerOutput};

/// Indicator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    /// Span of the trend EMA shown alongside the signal.
    pub ema_span: usize,
    pub bb_length: usize,
    pub bb_multiplier: f64,
    pub supertrend_period: usize,
    pub supertrend_multiplier: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            ema_span: 20,
            bb_length: 20,
            bb_multiplier: 1.0,
            supertrend_period: 10,
            supertrend_multiplier: 3.0,
        }
    }
}

impl IndicatorParams {
    /// Check the parameters before any indicator is constructed with them.
    pub fn validate(&self) -> Result<(), IndicatorError> {
        let invalid = |msg: &str| Err(IndicatorError::InvalidParameter(msg.to_string()));

        if self.rsi_period == 0 {
            return invalid("rsi_period must be greater than 0");
        }
        if !(0.0..=100.0).contains(&self.rsi_oversold)
            || !(0.0..=100.0).contains(&self.rsi_overbought)
            || self.rsi_oversold >= self.rsi_overbought
        {
            return invalid("RSI thresholds must satisfy 0 <= oversold < overbought <= 100");
        }
        if self.macd_fast == 0 || self.macd_signal == 0 || self.macd_fast >= self.macd_slow {
            return invalid("MACD periods must be positive with fast < slow");
        }
        if self.ema_span == 0 {
            return invalid("ema_span must be greater than 0");
        }
        if self.bb_length < 2 || !(self.bb_multiplier > 0.0) {
            return invalid("Bollinger length must be >= 2 and multiplier positive");
        }
        if self.supertrend_period == 0 || !(self.supertrend_multiplier > 0.0) {
            return invalid("Supertrend period and multiplier must be positive");
        }
        Ok(())
    }

    pub fn rsi(&self) -> Rsi {
        Rsi::new(self.rsi_period)
    }

    pub fn macd(&self) -> Macd {
        Macd::with_periods(self.macd_fast, self.macd_slow, self.macd_signal)
    }

    pub fn ema(&self) -> Ema {
        Ema::new(self.ema_span)
    }

    pub fn bollinger(&self) -> BollingerBands {
        BollingerBands::with_params(self.bb_length, self.bb_multiplier)
    }

    pub fn supertrend(&self) -> Supertrend {
        Supertrend::with_params(self.supertrend_period, self.supertrend_multiplier)
    }
}

/// Indicator values at the latest bar of a series.
///
/// Fields are `None` when the series is shorter than that indicator's
/// minimum window. Recomputed from scratch on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Timestamp of the latest bar (unix ms)
    pub timestamp: i64,
    pub bars: usize,
    pub close: f64,
    pub prev_close: Option<f64>,
    pub volume: f64,
    pub rsi: Option<f64>,
    pub macd: Option<MacdOutput>,
    pub ema: Option<f64>,
    pub bollinger: Option<BollingerOutput>,
    pub band_cross: BandCross,
    /// Supertrend regime, true = bullish
    pub trend_bullish: Option<bool>,
}

impl IndicatorSnapshot {
    /// Compute every indicator over `series`.
    ///
    /// Fails only for an empty series; short series yield `None` fields.
    /// The parameters must already be validated.
    pub fn compute(series: &BarSeries, params: &IndicatorParams) -> Result<Self, IndicatorError> {
        let last = series.last().ok_or(IndicatorError::InsufficientData {
            required: 1,
            available: 0,
        })?;
        let closes = series.closes();

        Ok(Self {
            symbol: series.symbol.clone(),
            timeframe: series.timeframe,
            timestamp: last.timestamp,
            bars: series.len(),
            close: last.close,
            prev_close: series.previous().map(|b| b.close),
            volume: last.volume,
            rsi: params.rsi().latest(&closes).ok(),
            macd: params.macd().latest(&closes).ok(),
            ema: params.ema().latest(&closes).ok(),
            bollinger: params.bollinger().latest(&closes).ok(),
            band_cross: params.bollinger().band_cross(&closes),
            trend_bullish: params.supertrend().is_bullish(series.bars()),
        })
    }

    /// RSI band, using the thresholds in `params`.
    pub fn rsi_zone(&self, params: &IndicatorParams) -> Option<RsiZone> {
        self.rsi
            .map(|rsi| RsiZone::classify(rsi, params.rsi_overbought, params.rsi_oversold))
    }

    pub fn macd_regime(&self) -> Option<MacdRegime> {
        self.macd.map(|m| m.regime())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::types::Bar;

    fn series(closes: &[f64]) -> BarSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64 * 86_400_000, c, c + 1.0, c - 1.0, c, 1000.0))
            .collect();
        BarSeries::from_bars("TEST", Timeframe::Daily, bars)
    }

    #[test]
    fn test_default_params_are_valid() {
        assert!(IndicatorParams::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_params() {
        let params = IndicatorParams {
            macd_fast: 26,
            macd_slow: 12,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = IndicatorParams {
            rsi_overbought: 20.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_snapshot_on_long_series() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let snap = IndicatorSnapshot::compute(&series(&closes), &IndicatorParams::default()).unwrap();

        assert_eq!(snap.bars, 40);
        assert_eq!(snap.close, 139.0);
        assert_eq!(snap.prev_close, Some(138.0));
        assert_eq!(snap.rsi, Some(100.0));
        assert_eq!(snap.macd_regime(), Some(MacdRegime::Bullish));
        assert!(snap.bollinger.is_some());
        assert_eq!(snap.trend_bullish, Some(true));
        assert_eq!(
            snap.rsi_zone(&IndicatorParams::default()),
            Some(RsiZone::Overbought)
        );
    }

    #[test]
    fn test_snapshot_on_short_series_reports_missing_values() {
        let snap =
            IndicatorSnapshot::compute(&series(&[100.0, 101.0, 99.0]), &IndicatorParams::default())
                .unwrap();

        assert!(snap.rsi.is_none());
        assert!(snap.bollinger.is_none());
        assert!(snap.trend_bullish.is_none());
        assert_eq!(snap.band_cross, BandCross::NoCross);
        // span-seeded EMAs are defined from the first bar
        assert!(snap.macd.is_some());
        assert!(snap.ema.is_some());
    }

    #[test]
    fn test_snapshot_of_empty_series_fails() {
        let empty = BarSeries::empty("TEST", Timeframe::Daily);
        assert!(IndicatorSnapshot::compute(&empty, &IndicatorParams::default()).is_err());
    }

    #[test]
    fn test_snapshot_is_deterministic() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.7).sin() * 4.0).collect();
        let s = series(&closes);
        let params = IndicatorParams::default();
        assert_eq!(
            IndicatorSnapshot::compute(&s, &params).unwrap(),
            IndicatorSnapshot::compute(&s, &params).unwrap()
        );
    }
}
