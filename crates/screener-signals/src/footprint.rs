//! Single-timeframe "footprint" classifier.
//!
//! Looks for institutional accumulation on the latest bar: a close above
//! the recent closing high on a volume surge with a strong up move and a
//! bullish MACD. A strong up move against a bearish MACD is a SELL.

use serde::{Deserialize, Serialize};
use tracing::debug;

use screener_core::{
    error::StrategyError,
    types::{BarSeries, Classification, Lookback, Timeframe},
};
use screener_indicators::{IndicatorParams, IndicatorSnapshot, MacdRegime, RsiZone};

use crate::classifier::{Classifier, SeriesSet, SignalDetail, SignalEvaluation};

/// Configuration for the footprint classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FootprintConfig {
    /// Bar interval to fetch
    pub timeframe: Timeframe,
    /// Calendar days of history to fetch. RSI needs `rsi_period + 1`
    /// bars; the default 15 days yields about 10 trading days, so the RSI
    /// zone stays empty unless this is raised to roughly 25 or more.
    pub lookback_days: u32,
    /// Prior bars compared against the latest one
    pub lookback: usize,
    /// Series shorter than this classify as NO_DATA
    pub min_bars: usize,
    /// Volume surge threshold as a multiple of the prior average
    pub volume_surge_ratio: f64,
    /// Price strength threshold as a multiple of the previous close
    pub price_strength_ratio: f64,
}

impl Default for FootprintConfig {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::Daily,
            lookback_days: 15,
            lookback: 5,
            min_bars: 10,
            volume_surge_ratio: 1.5,
            price_strength_ratio: 1.01,
        }
    }
}

impl FootprintConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.lookback == 0 {
            return Err(StrategyError::InvalidConfig(
                "Footprint lookback must be greater than 0".into(),
            ));
        }
        if self.lookback_days == 0 {
            return Err(StrategyError::InvalidConfig(
                "lookback_days must be greater than 0".into(),
            ));
        }
        if !(self.volume_surge_ratio > 0.0) || !(self.price_strength_ratio > 0.0) {
            return Err(StrategyError::InvalidConfig(
                "Footprint ratios must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Bars required before a reading is produced.
    pub fn required_bars(&self) -> usize {
        self.min_bars.max(self.lookback + 1).max(2)
    }
}

/// Footprint values at the latest bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintReading {
    pub close: f64,
    pub prev_close: f64,
    pub volume: f64,
    /// Mean volume of the prior bars
    pub avg_volume: f64,
    /// Highest close of the prior bars
    pub recent_high: f64,
    /// Today's volume as a percentage of the prior average, 2 decimals.
    /// Absent when the prior average is zero.
    pub delivery_pct: Option<f64>,
    pub breakout: bool,
    pub volume_surge: bool,
    pub price_strength: bool,
    pub macd: MacdRegime,
    pub rsi: Option<f64>,
    pub rsi_zone: Option<RsiZone>,
    /// Trend EMA of close
    pub ema: Option<f64>,
    pub long_buildup: bool,
    pub short_buildup: bool,
}

impl FootprintReading {
    /// BUY needs every predicate; SELL is strength against a bearish MACD.
    pub fn classification(&self) -> Classification {
        let bullish = self.macd == MacdRegime::Bullish;
        if self.breakout && self.volume_surge && self.price_strength && bullish {
            Classification::Buy
        } else if self.price_strength && !bullish {
            Classification::Sell
        } else {
            Classification::Avoid
        }
    }
}

/// Footprint classifier.
pub struct FootprintClassifier {
    config: FootprintConfig,
    params: IndicatorParams,
}

impl FootprintClassifier {
    /// Create a new footprint classifier.
    pub fn new(config: FootprintConfig, params: IndicatorParams) -> Self {
        Self { config, params }
    }

    pub fn config(&self) -> &FootprintConfig {
        &self.config
    }

    /// Compute the reading for a series, or the reason it cannot be.
    pub fn read(&self, series: &BarSeries) -> Result<FootprintReading, String> {
        let required = self.config.required_bars();
        if series.len() < required {
            return Err(format!("need {} bars, have {}", required, series.len()));
        }

        let bars = series.bars();
        let (last, earlier) = match bars.split_last() {
            Some(split) => split,
            None => return Err("empty series".to_string()),
        };
        let prior = &earlier[earlier.len() - self.config.lookback..];
        let prev_close = earlier[earlier.len() - 1].close;

        let recent_high = prior.iter().map(|b| b.close).fold(f64::NEG_INFINITY, f64::max);
        let avg_volume = prior.iter().map(|b| b.volume).sum::<f64>() / prior.len() as f64;

        let snapshot = IndicatorSnapshot::compute(series, &self.params).map_err(|e| e.to_string())?;
        let macd = snapshot
            .macd_regime()
            .ok_or_else(|| "MACD undefined".to_string())?;

        let delivery_pct = (avg_volume > 0.0)
            .then(|| (last.volume / avg_volume * 100.0 * 100.0).round() / 100.0);

        Ok(FootprintReading {
            close: last.close,
            prev_close,
            volume: last.volume,
            avg_volume,
            recent_high,
            delivery_pct,
            breakout: last.close > recent_high,
            volume_surge: last.volume > self.config.volume_surge_ratio * avg_volume,
            price_strength: last.close > self.config.price_strength_ratio * prev_close,
            macd,
            rsi: snapshot.rsi,
            rsi_zone: snapshot.rsi_zone(&self.params),
            ema: snapshot.ema,
            long_buildup: last.close > prev_close && last.volume > avg_volume,
            short_buildup: last.close < prev_close && last.volume > avg_volume,
        })
    }
}

impl Classifier for FootprintClassifier {
    fn name(&self) -> &str {
        "footprint"
    }

    fn description(&self) -> &str {
        "Breakout on a volume surge with price strength, confirmed by MACD"
    }

    fn requirements(&self) -> Vec<(Timeframe, Lookback)> {
        vec![(self.config.timeframe, Lookback::Days(self.config.lookback_days))]
    }

    fn classify(&self, symbol: &str, series: &SeriesSet) -> SignalEvaluation {
        let Some(series) = series.get(&self.config.timeframe) else {
            return SignalEvaluation::unavailable(symbol, "no series fetched");
        };

        match self.read(series) {
            Ok(reading) => {
                let classification = reading.classification();
                debug!(
                    symbol,
                    signal = %classification,
                    breakout = reading.breakout,
                    volume_surge = reading.volume_surge,
                    price_strength = reading.price_strength,
                    macd = %reading.macd,
                    "Footprint classified"
                );
                SignalEvaluation {
                    symbol: symbol.to_string(),
                    classification,
                    close: Some(reading.close),
                    detail: SignalDetail::Footprint(reading),
                }
            }
            Err(reason) => {
                debug!(symbol, %reason, "Footprint unavailable");
                SignalEvaluation {
                    close: series.last().map(|b| b.close),
                    ..SignalEvaluation::unavailable(symbol, reason)
                }
            }
        }
    }
}
