//! Classification vocabulary shared by classifiers, alerts and reports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a trend regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Bullish,
    Bearish,
}

impl TrendDirection {
    /// Map a Supertrend state (true = bullish) to a direction.
    pub fn from_bullish(bullish: bool) -> Self {
        if bullish {
            TrendDirection::Bullish
        } else {
            TrendDirection::Bearish
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Bullish => write!(f, "BULLISH"),
            TrendDirection::Bearish => write!(f, "BEARISH"),
        }
    }
}

/// Discrete signal for one instrument in one evaluation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Buy,
    Sell,
    /// Displayed as "Wait".
    Avoid,
    /// Required series missing or too short.
    NoData,
    /// Timeframes disagree.
    Mixed,
    /// All timeframes agree but no band event confirmed it.
    TrendOnly(TrendDirection),
    /// Majority of timeframes agree (majority policy only).
    Bias(TrendDirection),
}

impl Classification {
    /// Only BUY and SELL ever produce a notification.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Classification::Buy | Classification::Sell)
    }

    /// Stable upper-case label, also used in alert keys.
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Buy => "BUY",
            Classification::Sell => "SELL",
            Classification::Avoid => "AVOID",
            Classification::NoData => "NO_DATA",
            Classification::Mixed => "MIXED",
            Classification::TrendOnly(TrendDirection::Bullish) => "TREND_ONLY_BULLISH",
            Classification::TrendOnly(TrendDirection::Bearish) => "TREND_ONLY_BEARISH",
            Classification::Bias(TrendDirection::Bullish) => "BIAS_BULLISH",
            Classification::Bias(TrendDirection::Bearish) => "BIAS_BEARISH",
        }
    }

    /// Human action label shown next to the signal.
    pub fn action(&self) -> &'static str {
        match self {
            Classification::Buy => "📈 Buy",
            Classification::Sell => "📉 Sell",
            Classification::NoData => "⚠️ No data",
            _ => "⏸️ Wait",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_buy_and_sell_are_actionable() {
        assert!(Classification::Buy.is_actionable());
        assert!(Classification::Sell.is_actionable());
        for c in [
            Classification::Avoid,
            Classification::NoData,
            Classification::Mixed,
            Classification::TrendOnly(TrendDirection::Bullish),
            Classification::Bias(TrendDirection::Bearish),
        ] {
            assert!(!c.is_actionable(), "{} should not notify", c);
        }
    }

    #[test]
    fn test_trend_only_is_distinct_from_mixed() {
        let trend_only = Classification::TrendOnly(TrendDirection::Bearish);
        assert_ne!(trend_only, Classification::Mixed);
        assert_eq!(trend_only.label(), "TREND_ONLY_BEARISH");
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(Classification::Buy.action(), "📈 Buy");
        assert_eq!(Classification::Avoid.action(), "⏸️ Wait");
        assert_eq!(Classification::Mixed.action(), "⏸️ Wait");
    }
}
