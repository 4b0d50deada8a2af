//! Three-bar channel breakout tracker.
//!
//! Each bar is compared with the high/low channel of the three bars before
//! it. A close strictly above the channel high latches "above high" and
//! records the reference bar that set the high as a support zone; a close
//! strictly below the channel low latches "below low" with a resistance
//! zone. Anything else, including a close exactly on the boundary, holds.

use chrono::NaiveDate;

use crate::types::{tail, BreakoutDirection, BreakoutSignal, PriceBar, PriceZone, Timeframe, ZoneKind};

/// Number of reference bars forming the channel.
const CHANNEL_BARS: usize = 3;

/// Breakout tracker configuration.
pub struct BreakoutTracker {
    window: usize,
}

impl Default for BreakoutTracker {
    fn default() -> Self {
        Self { window: 60 }
    }
}

#[derive(Default)]
struct BreakoutState {
    direction: BreakoutDirection,
    run_count: usize,
    trigger_dates: Vec<NaiveDate>,
    zone: Option<PriceZone>,
}

impl BreakoutState {
    fn trigger(&mut self, direction: BreakoutDirection, date: NaiveDate, zone: PriceZone) {
        if self.direction == direction {
            self.run_count += 1;
            self.trigger_dates.push(date);
        } else {
            self.direction = direction;
            self.run_count = 1;
            self.trigger_dates = vec![date];
        }
        self.zone = Some(zone);
    }
}

/// Band of the first reference bar matching `pick`.
fn zone_from(reference: &[PriceBar], kind: ZoneKind, pick: impl Fn(&PriceBar) -> bool) -> Option<PriceZone> {
    reference.iter().find(|bar| pick(bar)).map(|bar| PriceZone {
        kind,
        low: bar.low,
        high: bar.high,
        date: bar.date,
    })
}

impl BreakoutTracker {
    pub fn min_periods(&self) -> usize {
        CHANNEL_BARS + 1
    }

    /// Scan the trailing window of `bars`.
    pub fn analyze(&self, bars: &[PriceBar], timeframe: Timeframe) -> BreakoutSignal {
        let window = tail(bars, self.window);
        if window.len() < self.min_periods() {
            return BreakoutSignal::neutral(timeframe);
        }

        let mut state = BreakoutState::default();

        for i in CHANNEL_BARS..window.len() {
            let reference = &window[(i - CHANNEL_BARS)..i];
            let today = &window[i];

            let channel_high = reference.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let channel_low = reference.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

            if today.close > channel_high {
                if let Some(zone) = zone_from(reference, ZoneKind::Support, |b| b.high == channel_high) {
                    state.trigger(BreakoutDirection::AboveHigh, today.date, zone);
                }
            } else if today.close < channel_low {
                if let Some(zone) = zone_from(reference, ZoneKind::Resistance, |b| b.low == channel_low) {
                    state.trigger(BreakoutDirection::BelowLow, today.date, zone);
                }
            }
        }

        BreakoutSignal {
            timeframe,
            direction: state.direction,
            run_count: state.run_count,
            trigger_dates: state.trigger_dates,
            zone: state.zone,
        }
    }
}

/// Breakout state over the trailing 60 bars of `bars`.
pub fn analyze_breakout(bars: &[PriceBar], timeframe: Timeframe) -> BreakoutSignal {
    BreakoutTracker::default().analyze(bars, timeframe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn bars(rows: &[(f64, f64, f64)]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        rows.iter()
            .enumerate()
            .map(|(i, &(high, low, close))| {
                PriceBar::new(start + Days::new(i as u64), close, high, low, close)
            })
            .collect()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_three_bars_is_neutral() {
        let signal = analyze_breakout(
            &bars(&[(100.0, 90.0, 95.0), (105.0, 95.0, 100.0), (110.0, 100.0, 105.0)]),
            Timeframe::Daily,
        );
        assert_eq!(signal, BreakoutSignal::neutral(Timeframe::Daily));
    }

    #[test]
    fn test_breakdown_after_breakout() {
        let signal = analyze_breakout(
            &bars(&[
                (100.0, 90.0, 95.0),
                (105.0, 95.0, 100.0),
                (110.0, 100.0, 105.0),
                (115.0, 105.0, 112.0), // above 110
                (110.0, 108.0, 109.0), // hold
                (98.0, 80.0, 85.0),    // below 100
            ]),
            Timeframe::Daily,
        );
        assert_eq!(signal.direction, BreakoutDirection::BelowLow);
        assert_eq!(signal.run_count, 1);
        assert_eq!(signal.trigger_dates, vec![day(6)]);
        assert_eq!(
            signal.zone,
            Some(PriceZone {
                kind: ZoneKind::Resistance,
                low: 100.0,
                high: 110.0,
                date: day(3),
            })
        );
    }

    #[test]
    fn test_zone_uses_first_matching_reference_bar() {
        let signal = analyze_breakout(
            &bars(&[
                (100.0, 90.0, 95.0),
                (100.0, 92.0, 96.0),
                (99.0, 93.0, 97.0),
                (101.0, 95.0, 100.5),
            ]),
            Timeframe::Daily,
        );
        let zone = signal.zone.unwrap();
        assert_eq!(zone.date, day(1));
        assert_eq!((zone.low, zone.high), (90.0, 100.0));
    }

    #[test]
    fn test_close_on_low_boundary_holds() {
        let signal = analyze_breakout(
            &bars(&[
                (100.0, 90.0, 95.0),
                (100.0, 90.0, 95.0),
                (100.0, 90.0, 95.0),
                (95.0, 90.0, 90.0),
            ]),
            Timeframe::Daily,
        );
        assert_eq!(signal.direction, BreakoutDirection::Neutral);
        assert!(signal.zone.is_none());
    }
}
