//! Daily to weekly/monthly bar resampling.

use chrono::{Datelike, Days, NaiveDate};

use crate::types::{PriceBar, Timeframe};

/// Last calendar day of the period `date` falls in.
///
/// Weeks run Monday through Sunday.
pub fn period_end(date: NaiveDate, timeframe: Timeframe) -> NaiveDate {
    match timeframe {
        Timeframe::Daily => date,
        Timeframe::Weekly => {
            let to_sunday = 6 - date.weekday().num_days_from_monday() as u64;
            date.checked_add_days(Days::new(to_sunday)).unwrap_or(date)
        }
        Timeframe::Monthly => {
            let (year, month) = if date.month() == 12 {
                (date.year() + 1, 1)
            } else {
                (date.year(), date.month() + 1)
            };
            NaiveDate::from_ymd_opt(year, month, 1)
                .and_then(|first| first.pred_opt())
                .unwrap_or(date)
        }
    }
}

/// Aggregate ascending daily bars into one bar per period.
///
/// open = first, high = max, low = min, close = last. Each output bar is
/// dated at its period end; periods without source bars are absent.
pub fn resample(bars: &[PriceBar], timeframe: Timeframe) -> Vec<PriceBar> {
    if timeframe == Timeframe::Daily {
        return bars.to_vec();
    }

    let mut out: Vec<PriceBar> = Vec::new();
    for bar in bars {
        let label = period_end(bar.date, timeframe);
        match out.last_mut() {
            Some(current) if current.date == label => {
                current.high = current.high.max(bar.high);
                current.low = current.low.min(bar.low);
                current.close = bar.close;
            }
            _ => out.push(PriceBar {
                date: label,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
            }),
        }
    }
    out
}
