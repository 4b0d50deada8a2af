/**
 * Signal Engine Tests
 *
 * Hand-built price series through the public signal API:
 * - Inertia and three-bar breakout trackers
 * - MA20/MA60 cross confirmation and trigger price
 * - Recompute idempotence
 */

use chrono::{Days, NaiveDate};
use trendwatch::services::signals::{
    analyze_all_inertia, analyze_breakout, analyze_inertia, analyze_ma_cross, analyze_technical,
    calculate_indicators,
};
use trendwatch::types::*;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn date(i: usize) -> NaiveDate {
    start() + Days::new(i as u64)
}

/// Daily bars from (high, low, close) triples.
fn bars(rows: &[(f64, f64, f64)]) -> Vec<PriceBar> {
    rows.iter()
        .enumerate()
        .map(|(i, &(high, low, close))| PriceBar::new(date(i), close, high, low, close))
        .collect()
}

/// Bars closing around 100 with a five-bar repeating wiggle.
fn wiggle(len: usize) -> Vec<PriceBar> {
    (0..len)
        .map(|i| {
            let close = 100.0 + ((i * 7) % 5) as f64 * 0.2 - 0.4;
            PriceBar::new(date(i), close, close + 1.0, close - 1.0, close)
        })
        .collect()
}

fn with_mas(ma20: &[f64], ma60: &[f64]) -> (Vec<PriceBar>, IndicatorSeries) {
    let bars = wiggle(ma20.len());
    let zeros = vec![0.0; ma20.len()];
    let indicators = IndicatorSeries {
        ma5: zeros.clone(),
        ma20: ma20.to_vec(),
        ma60: ma60.to_vec(),
        k: zeros.clone(),
        d: zeros,
    };
    (bars, indicators)
}

// =========================================================================
// Short series
// =========================================================================

#[test]
fn test_short_series_is_neutral() {
    let one = bars(&[(100.0, 90.0, 95.0)]);

    assert_eq!(analyze_inertia(&one, Timeframe::Daily), InertiaSignal::neutral(Timeframe::Daily));
    assert_eq!(analyze_breakout(&one, Timeframe::Daily), BreakoutSignal::neutral(Timeframe::Daily));
    assert_eq!(analyze_ma_cross(&one, None), CrossSignal::default());
    assert!(calculate_indicators(&wiggle(59)).is_none());

    let all = analyze_all_inertia(&one);
    assert!(all.weekly.is_none());
    assert!(all.monthly.is_none());
}

#[test]
fn test_empty_series_has_no_snapshot() {
    assert!(analyze_technical(&[]).is_none());
}

// =========================================================================
// Inertia
// =========================================================================

#[test]
fn test_inertia_strictly_increasing() {
    let series = bars(&[
        (10.0, 8.0, 9.0),
        (11.0, 9.0, 10.0),
        (12.0, 10.0, 11.0),
        (13.0, 11.0, 12.0),
        (14.0, 12.0, 13.0),
    ]);
    let signal = analyze_inertia(&series, Timeframe::Daily);

    assert_eq!(signal.direction, InertiaDirection::Up);
    assert!(signal.run_count >= 4);
    assert_eq!(signal.trigger_dates[0], date(1));
}

// =========================================================================
// Breakout
// =========================================================================

fn breakout_rows() -> Vec<(f64, f64, f64)> {
    vec![
        (100.0, 90.0, 95.0),
        (105.0, 95.0, 100.0),
        (110.0, 100.0, 105.0),
        (115.0, 105.0, 112.0),
    ]
}

#[test]
fn test_breakout_above_channel_high() {
    let signal = analyze_breakout(&bars(&breakout_rows()), Timeframe::Daily);

    assert_eq!(signal.direction, BreakoutDirection::AboveHigh);
    assert_eq!(signal.run_count, 1);
    assert_eq!(signal.trigger_dates, vec![date(3)]);

    let zone = signal.zone.unwrap();
    assert_eq!(zone.kind, ZoneKind::Support);
    assert_eq!((zone.low, zone.high), (100.0, 110.0));
    assert_eq!(zone.date, date(2));
}

#[test]
fn test_close_on_channel_high_does_not_trigger() {
    let series = bars(&[
        (100.0, 90.0, 95.0),
        (100.0, 90.0, 95.0),
        (100.0, 90.0, 95.0),
        (100.0, 95.0, 100.0),
    ]);
    let signal = analyze_breakout(&series, Timeframe::Daily);
    assert_eq!(signal.direction, BreakoutDirection::Neutral);
    assert_eq!(signal.run_count, 0);
    assert!(signal.zone.is_none());
}

#[test]
fn test_breakout_consecutive_count() {
    let mut rows = breakout_rows();
    // pullback inside the channel holds
    rows.push((113.0, 106.0, 108.0));
    let held = analyze_breakout(&bars(&rows), Timeframe::Daily);
    assert_eq!(held.direction, BreakoutDirection::AboveHigh);
    assert_eq!(held.run_count, 1);

    // channel of bars 2..=4 tops out at 115
    rows.push((118.0, 110.0, 116.0));
    let signal = analyze_breakout(&bars(&rows), Timeframe::Daily);
    assert_eq!(signal.run_count, 2);
    assert_eq!(signal.trigger_dates, vec![date(3), date(5)]);
    assert_eq!(signal.zone.unwrap().date, date(3));
}

// =========================================================================
// MA cross
// =========================================================================

#[test]
fn test_golden_cross_confirms_on_third_bar() {
    let ma60 = [10.0; 10];
    let ma20 = [9.0, 9.0, 9.0, 9.0, 9.0, 11.0, 11.0, 11.0, 11.0, 11.0];
    let (series, indicators) = with_mas(&ma20, &ma60);

    let signal = analyze_ma_cross(&series, Some(&indicators));
    assert_eq!(signal.phase, CrossPhase::GoldenConfirmed);

    let confirmed = signal.confirmed.unwrap();
    assert_eq!(confirmed.kind, CrossKind::Golden);
    assert_eq!(confirmed.date, date(5));
}

#[test]
fn test_two_bar_run_reverts_to_last_confirmed() {
    let ma60 = [10.0; 12];
    let ma20 = [11.0, 11.0, 9.0, 9.0, 9.0, 9.0, 11.0, 11.0, 9.0, 9.0, 9.0, 9.0];
    let (series, indicators) = with_mas(&ma20, &ma60);

    let signal = analyze_ma_cross(&series, Some(&indicators));
    assert_eq!(signal.phase, CrossPhase::DeathConfirmed);
    assert_eq!(signal.observation_count, 0);
    assert_eq!(signal.confirmed.unwrap().date, date(2));
}

#[test]
fn test_trigger_price_solves_next_cross() {
    let mut series = wiggle(60);
    let indicators = calculate_indicators(&series).unwrap();
    let signal = analyze_ma_cross(&series, Some(&indicators));
    let trigger = signal.trigger.expect("MAs are close enough for a trigger price");

    let last = *series.last().unwrap();
    assert!((trigger.price - last.close).abs() <= last.close * 0.10);

    let next = date(60);
    series.push(PriceBar::new(next, trigger.price, trigger.price, trigger.price, trigger.price));
    let next_ind = calculate_indicators(&series).unwrap();
    let t = series.len() - 1;
    assert!((next_ind.ma20[t] - next_ind.ma60[t]).abs() < 1e-6);
}

#[test]
fn test_no_trigger_below_sixty_bars() {
    let (series, indicators) = with_mas(&[10.0; 30], &[10.0; 30]);
    assert!(analyze_ma_cross(&series, Some(&indicators)).trigger.is_none());
}

// wiggle(60): close[40] == close[0] == 99.6 and the last close is 100.2,
// so the trigger price is 30 * (MA60 - MA20) + 99.6.

#[test]
fn test_trigger_beyond_ten_percent_is_dropped() {
    // 30 * 1.0 + 99.6 = 129.6, about 29% above the last close
    let (series, indicators) = with_mas(&[99.0; 60], &[100.0; 60]);
    assert!(analyze_ma_cross(&series, Some(&indicators)).trigger.is_none());

    // the same gap below the close
    let (series, indicators) = with_mas(&[101.0; 60], &[100.0; 60]);
    assert!(analyze_ma_cross(&series, Some(&indicators)).trigger.is_none());
}

#[test]
fn test_trigger_below_ma60_is_golden() {
    let (series, indicators) = with_mas(&[99.9; 60], &[100.0; 60]);
    let trigger = analyze_ma_cross(&series, Some(&indicators)).trigger.unwrap();

    assert_eq!(trigger.kind, CrossKind::Golden);
    assert!((trigger.price - 102.6).abs() < 1e-6);
}

#[test]
fn test_trigger_above_ma60_is_death() {
    let (series, indicators) = with_mas(&[100.1; 60], &[100.0; 60]);
    let trigger = analyze_ma_cross(&series, Some(&indicators)).trigger.unwrap();

    assert_eq!(trigger.kind, CrossKind::Death);
    assert!((trigger.price - 96.6).abs() < 1e-6);
}

#[test]
fn test_trigger_with_equal_mas_is_death() {
    let (series, indicators) = with_mas(&[100.0; 60], &[100.0; 60]);
    let trigger = analyze_ma_cross(&series, Some(&indicators)).trigger.unwrap();

    assert_eq!(trigger.kind, CrossKind::Death);
    assert!((trigger.price - 99.6).abs() < 1e-6);
}

// =========================================================================
// Idempotence
// =========================================================================

#[test]
fn test_recompute_is_identical() {
    let series = wiggle(120);
    let first = analyze_technical(&series).unwrap();
    let second = analyze_technical(&series).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.last_date, date(119));
}
