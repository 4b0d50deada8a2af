//! Monthly revenue analysis.

use crate::types::{MonthlyRevenue, RevenueHigh, RevenueUpdate};

/// Trailing windows checked for an N-month high, longest first.
const HIGH_WINDOWS: [usize; 3] = [12, 6, 3];

/// Percentage change from `base` to `current`, 0 when `base` is not positive.
pub(crate) fn pct_change(current: f64, base: f64) -> f64 {
    if base > 0.0 {
        (current - base) / base * 100.0
    } else {
        0.0
    }
}

/// Analyze the newest revenue month if it is past `last_period`.
///
/// `last_period` is the `YYYY-MM` cursor; an empty cursor counts as none.
pub fn analyze_revenue(rows: &[MonthlyRevenue], last_period: Option<&str>) -> Option<RevenueUpdate> {
    let mut rows = rows.to_vec();
    rows.sort_by_key(|r| r.date);

    let latest = rows.last()?;
    let period = format!("{}-{:02}", latest.revenue_year, latest.revenue_month);

    if let Some(cursor) = last_period.filter(|c| !c.is_empty()) {
        if period.as_str() <= cursor {
            return None;
        }
    }

    let revenue = latest.revenue;

    let mom_pct = rows
        .len()
        .checked_sub(2)
        .map(|i| pct_change(revenue, rows[i].revenue))
        .unwrap_or(0.0);

    let yoy_pct = rows
        .iter()
        .find(|r| r.revenue_year == latest.revenue_year - 1 && r.revenue_month == latest.revenue_month)
        .map(|r| pct_change(revenue, r.revenue))
        .unwrap_or(0.0);

    let max_of = |rows: &[MonthlyRevenue]| rows.iter().map(|r| r.revenue).fold(f64::NEG_INFINITY, f64::max);

    let high = if revenue >= max_of(&rows) {
        Some(RevenueHigh::AllTime)
    } else {
        HIGH_WINDOWS
            .iter()
            .find(|&&w| rows.len() >= w && revenue >= max_of(&rows[rows.len() - w..]))
            .map(|&w| RevenueHigh::Months(w as u32))
    };

    Some(RevenueUpdate {
        year: latest.revenue_year,
        month: latest.revenue_month,
        revenue,
        mom_pct,
        yoy_pct,
        high,
        period,
        estimate: None,
    })
}
