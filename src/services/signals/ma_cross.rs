//! MA20/MA60 cross state machine.
//!
//! A cross starts an observation period counting the crossing bar as day 1.
//! If MA20 stays on the new side through day 3 the cross is confirmed;
//! if it falls back earlier, the machine returns to the last confirmed
//! phase (or Neutral when nothing has been confirmed yet).

use crate::types::{
    tail, ConfirmedCross, CrossKind, CrossPhase, CrossSignal, IndicatorSeries, PriceBar, TriggerPrice,
};

/// Cross detector configuration.
pub struct CrossDetector {
    window: usize,
    min_bars: usize,
    confirm_bars: u8,
    /// Bars on each side of the cross date used for the key price.
    band_radius: usize,
    /// Maximum distance of the trigger price from the last close, as a fraction.
    trigger_tolerance: f64,
}

impl Default for CrossDetector {
    fn default() -> Self {
        Self {
            window: 90,
            min_bars: 10,
            confirm_bars: 3,
            band_radius: 3,
            trigger_tolerance: 0.10,
        }
    }
}

/// Bars needed to solve for the trigger price (the MA60 window).
const TRIGGER_MIN_BARS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Neutral,
    Observing { kind: CrossKind, day: u8, start: usize },
    Confirmed(CrossKind),
}

/// Fold state: the active phase plus the last confirmed cross to fall back to.
struct CrossState {
    phase: Phase,
    last_confirmed: Option<ConfirmedCross>,
}

impl CrossState {
    fn fallback(&self) -> Phase {
        match self.last_confirmed {
            Some(cross) => Phase::Confirmed(cross.kind),
            None => Phase::Neutral,
        }
    }
}

impl CrossDetector {
    /// Scan the trailing window of `bars` with its aligned indicators.
    ///
    /// Missing or misaligned indicators give the default signal.
    pub fn analyze(&self, bars: &[PriceBar], indicators: Option<&IndicatorSeries>) -> CrossSignal {
        let Some(indicators) = indicators.filter(|ind| ind.is_aligned_with(bars.len())) else {
            return CrossSignal::default();
        };

        let bars = tail(bars, self.window);
        let indicators = indicators.tail(self.window);
        if bars.len() < self.min_bars {
            return CrossSignal::default();
        }

        let ma20 = &indicators.ma20;
        let ma60 = &indicators.ma60;

        let mut state = CrossState {
            phase: Phase::Neutral,
            last_confirmed: None,
        };

        for i in 1..bars.len() {
            let above = ma20[i] > ma60[i];
            let below = ma20[i] < ma60[i];

            let phase = state.phase;
            state.phase = match phase {
                Phase::Neutral | Phase::Confirmed(_) => {
                    if ma20[i - 1] <= ma60[i - 1] && above {
                        Phase::Observing { kind: CrossKind::Golden, day: 1, start: i }
                    } else if ma20[i - 1] >= ma60[i - 1] && below {
                        Phase::Observing { kind: CrossKind::Death, day: 1, start: i }
                    } else {
                        phase
                    }
                }
                Phase::Observing { kind, day, start } => {
                    let holds = match kind {
                        CrossKind::Golden => above,
                        CrossKind::Death => below,
                    };
                    if !holds {
                        state.fallback()
                    } else if day + 1 >= self.confirm_bars {
                        state.last_confirmed = Some(self.confirm(bars, kind, start));
                        Phase::Confirmed(kind)
                    } else {
                        Phase::Observing { kind, day: day + 1, start }
                    }
                }
            };
        }

        let (phase, observation_count) = match state.phase {
            Phase::Neutral => (CrossPhase::Neutral, 0),
            Phase::Observing { kind: CrossKind::Golden, day, .. } => (CrossPhase::GoldenObserving, day),
            Phase::Observing { kind: CrossKind::Death, day, .. } => (CrossPhase::DeathObserving, day),
            Phase::Confirmed(CrossKind::Golden) => (CrossPhase::GoldenConfirmed, 0),
            Phase::Confirmed(CrossKind::Death) => (CrossPhase::DeathConfirmed, 0),
        };

        CrossSignal {
            phase,
            observation_count,
            confirmed: state.last_confirmed,
            trigger: self.trigger_price(bars, &indicators),
        }
    }

    /// Key price and band around the bar where MA20 first crossed.
    fn confirm(&self, bars: &[PriceBar], kind: CrossKind, start: usize) -> ConfirmedCross {
        let from = start.saturating_sub(self.band_radius);
        let to = (start + self.band_radius).min(bars.len() - 1);
        let around = &bars[from..=to];

        let band_high = around.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let band_low = around.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

        ConfirmedCross {
            kind,
            date: bars[start].date,
            key_price: match kind {
                CrossKind::Golden => band_high,
                CrossKind::Death => band_low,
            },
            band_low,
            band_high,
        }
    }

    /// Close that would make tomorrow's MA20 equal tomorrow's MA60.
    ///
    /// Tomorrow's MA20 drops `close[t-19]` and tomorrow's MA60 drops
    /// `close[t-59]`, so equating the two updated means gives
    /// `P = 30 * (MA60 - MA20) + 1.5 * close[t-19] - 0.5 * close[t-59]`.
    fn trigger_price(&self, bars: &[PriceBar], indicators: &IndicatorSeries) -> Option<TriggerPrice> {
        if bars.len() < TRIGGER_MIN_BARS {
            return None;
        }

        let t = bars.len() - 1;
        let ma20 = indicators.ma20[t];
        let ma60 = indicators.ma60[t];
        let close = bars[t].close;

        let price = 30.0 * (ma60 - ma20) + 1.5 * bars[t - 19].close - 0.5 * bars[t - 59].close;

        if close <= 0.0 || (price - close).abs() > close * self.trigger_tolerance {
            return None;
        }

        let kind = if ma20 < ma60 {
            CrossKind::Golden
        } else {
            CrossKind::Death
        };

        Some(TriggerPrice { kind, price })
    }
}

/// MA cross state over the trailing 90 bars of `bars`.
pub fn analyze_ma_cross(bars: &[PriceBar], indicators: Option<&IndicatorSeries>) -> CrossSignal {
    CrossDetector::default().analyze(bars, indicators)
}
