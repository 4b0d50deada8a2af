//! Stochastic Oscillator indicator.

use crate::types::PriceBar;

/// Stochastic Oscillator.
///
/// Compares closing price to price range over a period:
/// %K = (Current Close - Lowest Low) / (Highest High - Lowest Low) * 100
/// %D = SMA of %K over `d_period`.
///
/// Leading positions that cannot be computed hold 0.0, and a flat range
/// (highest high == lowest low) yields %K = 0.0.
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 9,
            d_period: 3,
        }
    }
}

impl Stochastic {
    /// Bars needed before the first defined %D.
    pub fn min_periods(&self) -> usize {
        self.k_period + self.d_period - 1
    }

    /// Calculate `(%K, %D)` for every bar.
    pub fn calculate(&self, bars: &[PriceBar]) -> (Vec<f64>, Vec<f64>) {
        let len = bars.len();
        let mut k_values = vec![0.0; len];
        let mut d_values = vec![0.0; len];

        if self.k_period == 0 || self.d_period == 0 {
            return (k_values, d_values);
        }

        for i in (self.k_period - 1)..len {
            let window = &bars[(i + 1 - self.k_period)..=i];

            let lowest_low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
            let highest_high = window
                .iter()
                .map(|c| c.high)
                .fold(f64::NEG_INFINITY, f64::max);

            let range = highest_high - lowest_low;
            k_values[i] = if range != 0.0 {
                ((bars[i].close - lowest_low) / range) * 100.0
            } else {
                0.0
            };
        }

        let first_d = self.min_periods() - 1;
        for i in first_d..len {
            d_values[i] =
                k_values[(i + 1 - self.d_period)..=i].iter().sum::<f64>() / self.d_period as f64;
        }

        (k_values, d_values)
    }
}
