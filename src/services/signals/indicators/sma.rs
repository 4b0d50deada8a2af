//! Simple Moving Average (SMA) indicator.

/// SMA (Simple Moving Average) indicator.
///
/// Calculates the trailing mean of closing prices over a period.
/// Positions before the window is full hold 0.0 rather than being omitted.
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Calculate the SMA at every position of `values`.
    pub fn calculate(&self, values: &[f64]) -> Vec<f64> {
        if self.period == 0 {
            return vec![0.0; values.len()];
        }

        (0..values.len())
            .map(|i| {
                if i + 1 < self.period {
                    0.0
                } else {
                    values[(i + 1 - self.period)..=i].iter().sum::<f64>() / self.period as f64
                }
            })
            .collect()
    }
}
