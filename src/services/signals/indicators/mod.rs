//! Technical indicator implementations.

pub mod resample;
pub mod sma;
pub mod stochastic;

pub use resample::{period_end, resample};
pub use sma::Sma;
pub use stochastic::Stochastic;

use tracing::debug;

use crate::types::{IndicatorSeries, PriceBar};

/// Bars required before any indicator is computed (the MA60 window).
pub const MIN_INDICATOR_BARS: usize = 60;

/// Compute MA5/MA20/MA60 and the 9/3 stochastic for a daily series.
///
/// Returns `None` when the series is shorter than [`MIN_INDICATOR_BARS`];
/// callers skip analysis that depends on the long-period averages.
pub fn calculate_indicators(bars: &[PriceBar]) -> Option<IndicatorSeries> {
    if bars.len() < MIN_INDICATOR_BARS {
        debug!(
            "Only {} bars, need {} for long-period indicators",
            bars.len(),
            MIN_INDICATOR_BARS
        );
        return None;
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let (k, d) = Stochastic::default().calculate(bars);

    Some(IndicatorSeries {
        ma5: Sma::new(5).calculate(&closes),
        ma20: Sma::new(20).calculate(&closes),
        ma60: Sma::new(60).calculate(&closes),
        k,
        d,
    })
}
