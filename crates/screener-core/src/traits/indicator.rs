//! Indicator trait definitions.

use crate::error::IndicatorError;
use crate::types::Bar;

fn check_len(required: usize, available: usize) -> Result<(), IndicatorError> {
    if available < required {
        return Err(IndicatorError::InsufficientData {
            required,
            available,
        });
    }
    Ok(())
}

/// Trait for single-valued indicators over a price slice.
///
/// `calculate` returns one value per input point starting at the first
/// point where the indicator is defined, so the last element always belongs
/// to the last input. Inputs shorter than [`Indicator::period`] produce an
/// empty vector.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values for the given data.
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Validate that there's enough data.
    fn validate_data(&self, data: &[f64]) -> Result<(), IndicatorError> {
        check_len(self.period(), data.len())
    }

    /// Value at the last input point.
    fn latest(&self, data: &[f64]) -> Result<Self::Output, IndicatorError> {
        self.validate_data(data)?;
        self.calculate(data)
            .pop()
            .ok_or(IndicatorError::InsufficientData {
                required: self.period(),
                available: data.len(),
            })
    }
}

/// Multi-output indicator (e.g., Bollinger Bands, MACD).
///
/// Same alignment rules as [`Indicator`].
pub trait MultiOutputIndicator: Send + Sync {
    /// The output type containing multiple values.
    type Outputs;

    /// Calculate indicator values for the given data.
    fn calculate(&self, data: &[f64]) -> Vec<Self::Outputs>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Validate that there's enough data.
    fn validate_data(&self, data: &[f64]) -> Result<(), IndicatorError> {
        check_len(self.period(), data.len())
    }

    /// Outputs at the last input point.
    fn latest(&self, data: &[f64]) -> Result<Self::Outputs, IndicatorError> {
        self.validate_data(data)?;
        self.calculate(data)
            .pop()
            .ok_or(IndicatorError::InsufficientData {
                required: self.period(),
                available: data.len(),
            })
    }
}

/// Indicator that needs full bars (high/low as well as close).
pub trait OhlcvIndicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values from bars ordered oldest first.
    fn calculate(&self, bars: &[Bar]) -> Vec<Self::Output>;

    /// Get the minimum bars required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Validate that there are enough bars.
    fn validate_bars(&self, bars: &[Bar]) -> Result<(), IndicatorError> {
        check_len(self.period(), bars.len())
    }

    /// Value at the last bar.
    fn latest(&self, bars: &[Bar]) -> Result<Self::Output, IndicatorError> {
        self.validate_bars(bars)?;
        self.calculate(bars)
            .pop()
            .ok_or(IndicatorError::InsufficientData {
                required: self.period(),
                available: bars.len(),
            })
    }
}
