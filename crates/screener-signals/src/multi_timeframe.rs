//! Multi-timeframe trend classifiers.
//!
//! Each configured timeframe contributes a Supertrend direction; a subset of
//! the shorter timeframes also contributes a Bollinger band cross. A
//! [`TrendPolicy`] turns those votes into a classification. The strict
//! [`Unanimous`] and softer [`Majority`] policies are separate strategies.

use serde::{Deserialize, Serialize};
use tracing::debug;

use screener_core::{
    error::StrategyError,
    types::{Classification, Lookback, Timeframe, TrendDirection},
};
use screener_indicators::{BandCross, IndicatorParams};

use crate::classifier::{Classifier, SeriesSet, SignalDetail, SignalEvaluation};

/// Configuration shared by the multi-timeframe strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiTimeframeConfig {
    /// Timeframes whose trend direction votes
    pub timeframes: Vec<Timeframe>,
    /// Timeframes whose band cross can confirm a unanimous trend
    pub band_timeframes: Vec<Timeframe>,
    /// Bars fetched per timeframe
    pub lookback_bars: usize,
}

impl Default for MultiTimeframeConfig {
    fn default() -> Self {
        Self {
            timeframes: vec![Timeframe::Minute5, Timeframe::Minute15, Timeframe::Hour1],
            band_timeframes: vec![Timeframe::Minute5, Timeframe::Minute15],
            lookback_bars: 150,
        }
    }
}

impl MultiTimeframeConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.timeframes.is_empty() {
            return Err(StrategyError::InvalidConfig(
                "At least one timeframe required".into(),
            ));
        }
        if let Some(tf) = self
            .band_timeframes
            .iter()
            .find(|tf| !self.timeframes.contains(tf))
        {
            return Err(StrategyError::InvalidConfig(format!(
                "Band timeframe {} is not among the trend timeframes",
                tf
            )));
        }
        if self.lookback_bars < 2 {
            return Err(StrategyError::InvalidConfig(
                "lookback_bars must be at least 2".into(),
            ));
        }
        Ok(())
    }
}

/// One timeframe's contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeReading {
    pub timeframe: Timeframe,
    /// Supertrend direction; absent when the series is missing or short
    pub trend: Option<TrendDirection>,
    /// Band cross, only for band timeframes
    pub band_cross: Option<BandCross>,
    pub close: Option<f64>,
}

/// A complete vote: every timeframe has a direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendVote {
    pub direction: TrendDirection,
    pub band_cross: Option<BandCross>,
}

/// Turns per-timeframe votes into a classification.
pub trait TrendPolicy: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// `votes` is never empty.
    fn decide(&self, votes: &[TrendVote]) -> Classification;
}

/// Shared unanimous rule: BUY/SELL with a confirming band event, otherwise
/// TREND_ONLY. `None` when the votes disagree.
fn unanimous(votes: &[TrendVote]) -> Option<Classification> {
    let first = votes.first()?.direction;
    if votes.iter().any(|v| v.direction != first) {
        return None;
    }

    let confirming = match first {
        TrendDirection::Bullish => BandCross::Up,
        TrendDirection::Bearish => BandCross::Down,
    };
    let confirmed = votes.iter().any(|v| v.band_cross == Some(confirming));

    Some(match (first, confirmed) {
        (TrendDirection::Bullish, true) => Classification::Buy,
        (TrendDirection::Bearish, true) => Classification::Sell,
        (direction, false) => Classification::TrendOnly(direction),
    })
}

/// Every timeframe must agree; disagreement is MIXED.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unanimous;

impl TrendPolicy for Unanimous {
    fn name(&self) -> &str {
        "mtf_unanimous"
    }

    fn description(&self) -> &str {
        "All timeframes agree on trend and a shorter timeframe breaks its band"
    }

    fn decide(&self, votes: &[TrendVote]) -> Classification {
        unanimous(votes).unwrap_or(Classification::Mixed)
    }
}

/// Unanimous cases as [`Unanimous`]; otherwise a strict majority gives a
/// BIAS, and a tie is MIXED.
#[derive(Debug, Clone, Copy, Default)]
pub struct Majority;

impl TrendPolicy for Majority {
    fn name(&self) -> &str {
        "mtf_majority"
    }

    fn description(&self) -> &str {
        "Unanimous trend with band confirmation, else majority-vote bias"
    }

    fn decide(&self, votes: &[TrendVote]) -> Classification {
        if let Some(classification) = unanimous(votes) {
            return classification;
        }

        let bullish = votes
            .iter()
            .filter(|v| v.direction == TrendDirection::Bullish)
            .count();
        let bearish = votes.len() - bullish;

        if bullish * 2 > votes.len() {
            Classification::Bias(TrendDirection::Bullish)
        } else if bearish * 2 > votes.len() {
            Classification::Bias(TrendDirection::Bearish)
        } else {
            Classification::Mixed
        }
    }
}

/// Multi-timeframe classifier parameterized by its voting policy.
pub struct MultiTimeframeClassifier {
    config: MultiTimeframeConfig,
    params: IndicatorParams,
    policy: Box<dyn TrendPolicy>,
}

impl MultiTimeframeClassifier {
    pub fn new(
        config: MultiTimeframeConfig,
        params: IndicatorParams,
        policy: Box<dyn TrendPolicy>,
    ) -> Self {
        Self {
            config,
            params,
            policy,
        }
    }

    pub fn unanimous(config: MultiTimeframeConfig, params: IndicatorParams) -> Self {
        Self::new(config, params, Box::new(Unanimous))
    }

    pub fn majority(config: MultiTimeframeConfig, params: IndicatorParams) -> Self {
        Self::new(config, params, Box::new(Majority))
    }

    /// Per-timeframe readings in configured order.
    pub fn readings(&self, series: &SeriesSet) -> Vec<TimeframeReading> {
        let supertrend = self.params.supertrend();
        let bollinger = self.params.bollinger();

        self.config
            .timeframes
            .iter()
            .map(|&timeframe| {
                let series = series.get(&timeframe);
                let trend = series
                    .and_then(|s| supertrend.is_bullish(s.bars()))
                    .map(TrendDirection::from_bullish);
                let band_cross = self
                    .config
                    .band_timeframes
                    .contains(&timeframe)
                    .then(|| {
                        series
                            .map(|s| bollinger.band_cross(&s.closes()))
                            .unwrap_or_default()
                    });

                TimeframeReading {
                    timeframe,
                    trend,
                    band_cross,
                    close: series.and_then(|s| s.last()).map(|b| b.close),
                }
            })
            .collect()
    }
}

impl Classifier for MultiTimeframeClassifier {
    fn name(&self) -> &str {
        self.policy.name()
    }

    fn description(&self) -> &str {
        self.policy.description()
    }

    fn requirements(&self) -> Vec<(Timeframe, Lookback)> {
        self.config
            .timeframes
            .iter()
            .map(|&tf| (tf, Lookback::Bars(self.config.lookback_bars)))
            .collect()
    }

    fn classify(&self, symbol: &str, series: &SeriesSet) -> SignalEvaluation {
        let readings = self.readings(series);
        let votes: Option<Vec<TrendVote>> = readings
            .iter()
            .map(|r| {
                r.trend.map(|direction| TrendVote {
                    direction,
                    band_cross: r.band_cross,
                })
            })
            .collect();

        let classification = match votes {
            Some(votes) if !votes.is_empty() => self.policy.decide(&votes),
            _ => Classification::NoData,
        };

        debug!(
            symbol,
            policy = self.policy.name(),
            signal = %classification,
            "Multi-timeframe classified"
        );

        SignalEvaluation {
            symbol: symbol.to_string(),
            classification,
            close: readings.iter().find_map(|r| r.close),
            detail: SignalDetail::MultiTimeframe {
                timeframes: readings,
            },
        }
    }
}
