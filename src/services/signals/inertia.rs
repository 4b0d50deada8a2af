//! Inertia trend tracker.
//!
//! Latches a direction from successive higher-high/higher-low/higher-close
//! (or the strict inverse) comparisons between neighbouring bars. Bars that
//! match neither leave the state untouched.

use chrono::NaiveDate;

use super::indicators::resample;
use crate::types::{tail, InertiaDirection, InertiaSignal, MultiTimeframeInertia, PriceBar, Timeframe};

/// Inertia tracker configuration.
pub struct InertiaTracker {
    window: usize,
}

impl Default for InertiaTracker {
    fn default() -> Self {
        Self { window: 60 }
    }
}

#[derive(Default)]
struct InertiaState {
    direction: InertiaDirection,
    run_count: usize,
    trigger_dates: Vec<NaiveDate>,
}

impl InertiaState {
    fn apply(mut self, transition: InertiaDirection, date: NaiveDate) -> Self {
        if transition == InertiaDirection::Neutral {
            return self;
        }
        if self.direction == transition {
            self.run_count += 1;
            self.trigger_dates.push(date);
        } else {
            self.direction = transition;
            self.run_count = 1;
            self.trigger_dates = vec![date];
        }
        self
    }
}

/// Classify `today` against `yesterday`.
fn transition(yesterday: &PriceBar, today: &PriceBar) -> InertiaDirection {
    if today.high > yesterday.high && today.low > yesterday.low && today.close > yesterday.close {
        InertiaDirection::Up
    } else if today.high < yesterday.high
        && today.low < yesterday.low
        && today.close < yesterday.close
    {
        InertiaDirection::Down
    } else {
        InertiaDirection::Neutral
    }
}

impl InertiaTracker {
    pub fn min_periods(&self) -> usize {
        2
    }

    /// Scan the trailing window of `bars`.
    pub fn analyze(&self, bars: &[PriceBar], timeframe: Timeframe) -> InertiaSignal {
        let window = tail(bars, self.window);
        if window.len() < self.min_periods() {
            return InertiaSignal::neutral(timeframe);
        }

        let state = window
            .windows(2)
            .fold(InertiaState::default(), |state, pair| {
                state.apply(transition(&pair[0], &pair[1]), pair[1].date)
            });

        InertiaSignal {
            timeframe,
            direction: state.direction,
            run_count: state.run_count,
            trigger_dates: state.trigger_dates,
        }
    }
}

/// Inertia over the trailing 60 bars of `bars`.
pub fn analyze_inertia(bars: &[PriceBar], timeframe: Timeframe) -> InertiaSignal {
    InertiaTracker::default().analyze(bars, timeframe)
}

/// Daily inertia plus weekly and monthly inertia on resampled bars.
///
/// A higher timeframe is reported only when at least two resampled bars exist.
pub fn analyze_all_inertia(daily: &[PriceBar]) -> MultiTimeframeInertia {
    let tracker = InertiaTracker::default();

    let higher = |timeframe: Timeframe| {
        let bars = resample(daily, timeframe);
        (bars.len() >= tracker.min_periods()).then(|| tracker.analyze(&bars, timeframe))
    };

    MultiTimeframeInertia {
        daily: tracker.analyze(daily, Timeframe::Daily),
        weekly: higher(Timeframe::Weekly),
        monthly: higher(Timeframe::Monthly),
    }
}
