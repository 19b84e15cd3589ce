//! Signal classifiers.
//!
//! This crate turns fetched bar series into a [`Classification`] per
//! instrument:
//! - Footprint (single timeframe breakout on volume)
//! - Multi-timeframe trend, unanimous policy
//! - Multi-timeframe trend, majority policy
//!
//! [`Classification`]: screener_core::types::Classification

mod classifier;
mod footprint;
mod multi_timeframe;
mod registry;

pub use classifier::{Classifier, SeriesSet, SignalDetail, SignalEvaluation};
pub use footprint::{FootprintClassifier, FootprintConfig, FootprintReading};
pub use multi_timeframe::{
    Majority, MultiTimeframeClassifier, MultiTimeframeConfig, TimeframeReading, TrendPolicy,
    TrendVote, Unanimous,
};
pub use registry::{StrategyInfo, StrategyRegistry};
