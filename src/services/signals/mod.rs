//! Technical signal engine.
//!
//! Indicator calculation plus the three latching trackers. Every function
//! here is a pure computation over an already-fetched series; each call
//! builds its state from scratch and returns a fresh record.

pub mod breakout;
pub mod indicators;
pub mod inertia;
pub mod ma_cross;

pub use breakout::{analyze_breakout, BreakoutTracker};
pub use indicators::{calculate_indicators, resample, MIN_INDICATOR_BARS};
pub use inertia::{analyze_all_inertia, analyze_inertia, InertiaTracker};
pub use ma_cross::{analyze_ma_cross, CrossDetector};

use crate::types::{PriceBar, TechnicalSnapshot, Timeframe};

/// Run every tracker over a daily series.
///
/// Returns `None` only for an empty series; short series degrade to each
/// tracker's neutral result.
pub fn analyze_technical(bars: &[PriceBar]) -> Option<TechnicalSnapshot> {
    let last = bars.last()?;
    let indicators = calculate_indicators(bars);

    Some(TechnicalSnapshot {
        last_date: last.date,
        last_close: last.close,
        ma20: indicators.as_ref().and_then(|ind| ind.ma20.last().copied()),
        inertia: analyze_all_inertia(bars),
        breakout: analyze_breakout(bars, Timeframe::Daily),
        cross: analyze_ma_cross(bars, indicators.as_ref()),
    })
}
