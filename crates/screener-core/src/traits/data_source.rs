//! Bar fetcher trait definition.

use crate::error::DataError;
use crate::types::{BarSeries, Lookback, Timeframe};
use async_trait::async_trait;

/// Source of historical bars.
///
/// Implementations must not fail a whole cycle for one bad instrument:
/// unknown or delisted symbols come back as an error (or an empty series)
/// that the caller treats as "data unavailable".
#[async_trait]
pub trait BarFetcher: Send + Sync {
    /// Fetch bars for one instrument.
    ///
    /// # Arguments
    /// * `symbol` - The instrument identifier as configured
    /// * `timeframe` - The bar interval
    /// * `lookback` - How far back to reach
    ///
    /// # Returns
    /// A series ordered from oldest to newest
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        lookback: Lookback,
    ) -> Result<BarSeries, DataError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}
