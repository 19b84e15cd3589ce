//! Classifier trait and evaluation result.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use screener_core::types::{BarSeries, Classification, Lookback, Timeframe, TrendDirection};

use crate::footprint::FootprintReading;
use crate::multi_timeframe::TimeframeReading;

/// Fetched series for one instrument, keyed by timeframe.
pub type SeriesSet = BTreeMap<Timeframe, BarSeries>;

/// A named classification strategy.
///
/// Implementations are pure: the same series always produce the same
/// evaluation.
pub trait Classifier: Send + Sync {
    /// Get the strategy name.
    fn name(&self) -> &str;

    /// Get the strategy description.
    fn description(&self) -> &str;

    /// Series the classifier needs for one instrument.
    fn requirements(&self) -> Vec<(Timeframe, Lookback)>;

    /// Classify one instrument. Missing or short series yield
    /// [`Classification::NoData`], never an error.
    fn classify(&self, symbol: &str, series: &SeriesSet) -> SignalEvaluation;
}

/// Supporting values behind a classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalDetail {
    Footprint(FootprintReading),
    MultiTimeframe { timeframes: Vec<TimeframeReading> },
    Unavailable { reason: String },
}

/// Classification of one instrument in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvaluation {
    pub symbol: String,
    pub classification: Classification,
    /// Latest close, when any bar was available.
    pub close: Option<f64>,
    pub detail: SignalDetail,
}

impl SignalEvaluation {
    /// A NO_DATA evaluation.
    pub fn unavailable(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            classification: Classification::NoData,
            close: None,
            detail: SignalDetail::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn footprint(&self) -> Option<&FootprintReading> {
        match &self.detail {
            SignalDetail::Footprint(reading) => Some(reading),
            _ => None,
        }
    }

    pub fn timeframes(&self) -> Option<&[TimeframeReading]> {
        match &self.detail {
            SignalDetail::MultiTimeframe { timeframes } => Some(timeframes),
            _ => None,
        }
    }

    /// One-line summary of the supporting values, for tables.
    pub fn summary(&self) -> String {
        let mark = |b: bool| if b { "✓" } else { "✗" };
        match &self.detail {
            SignalDetail::Footprint(r) => format!(
                "BO {} VS {} PS {} | MACD {} | RSI {}",
                mark(r.breakout),
                mark(r.volume_surge),
                mark(r.price_strength),
                r.macd,
                r.rsi_zone.map_or_else(|| "n/a".to_string(), |z| z.to_string()),
            ),
            SignalDetail::MultiTimeframe { timeframes } => timeframes
                .iter()
                .map(|tf| {
                    let trend = match tf.trend {
                        Some(TrendDirection::Bullish) => "▲",
                        Some(TrendDirection::Bearish) => "▼",
                        None => "?",
                    };
                    match tf.band_cross {
                        Some(cross) => format!("{} {} {}", tf.timeframe, trend, cross),
                        None => format!("{} {}", tf.timeframe, trend),
                    }
                })
                .collect::<Vec<_>>()
                .join(" | "),
            SignalDetail::Unavailable { reason } => reason.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_indicators::BandCross;

    #[test]
    fn test_multi_timeframe_summary() {
        let eval = SignalEvaluation {
            symbol: "ETHUSDT".into(),
            classification: Classification::Mixed,
            close: Some(3500.0),
            detail: SignalDetail::MultiTimeframe {
                timeframes: vec![
                    TimeframeReading {
                        timeframe: Timeframe::Minute5,
                        trend: Some(TrendDirection::Bullish),
                        band_cross: Some(BandCross::Up),
                        close: Some(3500.0),
                    },
                    TimeframeReading {
                        timeframe: Timeframe::Hour1,
                        trend: None,
                        band_cross: None,
                        close: None,
                    },
                ],
            },
        };
        assert_eq!(eval.summary(), "5m ▲ UP | 1h ?");
    }

    #[test]
    fn test_unavailable_summary_is_reason() {
        let eval = SignalEvaluation::unavailable("X", "need 10 bars, have 4");
        assert_eq!(eval.classification, Classification::NoData);
        assert_eq!(eval.summary(), "need 10 bars, have 4");
    }
}
