//! Moving average indicators.

use screener_core::traits::Indicator;
use serde::{Deserialize, Serialize};

/// Simple Moving Average (SMA).
///
/// Calculates the arithmetic mean of the last N values.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.period {
            return vec![];
        }

        let period_f64 = self.period as f64;
        data.windows(self.period)
            .map(|w| w.iter().sum::<f64>() / period_f64)
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// How past observations are weighted by [`Ema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmaWeighting {
    /// Weights `(1-α)^i` normalised over the history seen so far.
    #[default]
    Adjusted,
    /// `ema = α·x + (1-α)·ema_prev`, seeded with the first value.
    Recursive,
}

/// Exponential Moving Average (EMA) with span-based smoothing.
///
/// `α = 2 / (span + 1)`. The average is seeded from the first value, so it
/// is defined from the first input point on; there is no SMA warm-up.
#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    alpha: f64,
    weighting: EmaWeighting,
}

impl Ema {
    /// Create a new EMA with the specified span and adjusted weighting.
    pub fn new(span: usize) -> Self {
        Self::with_weighting(span, EmaWeighting::Adjusted)
    }

    /// Create an EMA with an explicit weighting scheme.
    pub fn with_weighting(span: usize, weighting: EmaWeighting) -> Self {
        assert!(span > 0, "Span must be greater than 0");
        Self {
            span,
            alpha: 2.0 / (span as f64 + 1.0),
            weighting,
        }
    }

    /// The configured span.
    pub fn span(&self) -> usize {
        self.span
    }

    /// The smoothing factor.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let decay = 1.0 - self.alpha;
        let mut result = Vec::with_capacity(data.len());

        match self.weighting {
            EmaWeighting::Adjusted => {
                let mut numerator = 0.0;
                let mut denominator = 0.0;
                for &value in data {
                    numerator = value + decay * numerator;
                    denominator = 1.0 + decay * denominator;
                    result.push(numerator / denominator);
                }
            }
            EmaWeighting::Recursive => {
                let mut iter = data.iter();
                if let Some(&first) = iter.next() {
                    let mut ema = first;
                    result.push(ema);
                    for &value in iter {
                        ema = self.alpha * value + decay * ema;
                        result.push(ema);
                    }
                }
            }
        }

        result
    }

    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "EMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let sma = Sma::new(3);
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma.calculate(&data);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 1e-10); // (1+2+3)/3
        assert!((result[1] - 3.0).abs() < 1e-10); // (2+3+4)/3
        assert!((result[2] - 4.0).abs() < 1e-10); // (3+4+5)/3
    }

    #[test]
    fn test_sma_insufficient_data() {
        let sma = Sma::new(5);
        assert!(sma.calculate(&[1.0, 2.0, 3.0]).is_empty());
        assert!(sma.latest(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_ema_adjusted_matches_hand_computation() {
        // span 3 => alpha 0.5, weights 1, 0.5, 0.25
        let ema = Ema::new(3);
        let result = ema.calculate(&[1.0, 2.0, 3.0]);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 1.0).abs() < 1e-10);
        assert!((result[1] - (2.0 + 0.5) / 1.5).abs() < 1e-10);
        assert!((result[2] - (3.0 + 1.0 + 0.25) / 1.75).abs() < 1e-10);
    }

    #[test]
    fn test_ema_recursive() {
        let ema = Ema::with_weighting(3, EmaWeighting::Recursive);
        let result = ema.calculate(&[1.0, 2.0, 3.0]);

        assert!((result[0] - 1.0).abs() < 1e-10);
        assert!((result[1] - 1.5).abs() < 1e-10);
        assert!((result[2] - 2.25).abs() < 1e-10);
    }

    #[test]
    fn test_ema_constant_series_is_constant() {
        let ema = Ema::new(20);
        for value in ema.calculate(&[42.0; 30]) {
            assert!((value - 42.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ema_empty_input() {
        assert!(Ema::new(12).calculate(&[]).is_empty());
    }
}
