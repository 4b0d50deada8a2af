//! Plain-text report rendering.
//!
//! All human-readable labels live here; signal records carry enums only.

use chrono::NaiveDate;

use crate::types::{
    BreakoutDirection, BreakoutSignal, CrossKind, CrossPhase, CrossSignal, FinancialUpdate, HolderChange,
    HolderMetric, HolderTrend, InertiaDirection, InertiaSignal, MarketIndex, RevenueHigh, RevenueUpdate,
    TechnicalSnapshot, WatchlistEntry, ZoneKind,
};

/// First line of every delivered report.
pub const REPORT_HEADER: &str = "[Daily Taiwan stock report]\n";

const SECTION_RULE: &str = "----------------------";

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

fn format_dates(dates: &[NaiveDate]) -> String {
    let joined: Vec<String> = dates.iter().map(|d| format_date(*d)).collect();
    format!("[{}]", joined.join(", "))
}

fn with_commas(value: f64) -> String {
    let n = value.round() as i64;
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// `"Daily inertia up (3 in a row) [..]"` or `"Daily inertia unchanged"`.
pub fn format_inertia(signal: &InertiaSignal) -> String {
    let direction = match signal.direction {
        InertiaDirection::Up => "up",
        InertiaDirection::Down => "down",
        InertiaDirection::Neutral => return format!("{} inertia unchanged", signal.timeframe.name()),
    };
    format!(
        "{} inertia {} ({} in a row) {}",
        signal.timeframe.name(),
        direction,
        signal.run_count,
        format_dates(&signal.trigger_dates)
    )
}

/// Breakout state line plus the latest support/resistance zone.
pub fn format_breakout(signal: &BreakoutSignal) -> String {
    let label = signal.timeframe.name();
    let state = match signal.direction {
        BreakoutDirection::AboveHigh => "above 3-day high",
        BreakoutDirection::BelowLow => "below 3-day low",
        BreakoutDirection::Neutral => return format!("{}: consolidating", label),
    };

    let mut line = format!("{}: {}", label, state);
    if signal.run_count > 1 {
        line.push_str(&format!(" (x{})", signal.run_count));
    }
    line.push(' ');
    line.push_str(&format_dates(&signal.trigger_dates));

    if let Some(zone) = &signal.zone {
        let kind = match zone.kind {
            ZoneKind::Support => "latest support",
            ZoneKind::Resistance => "latest resistance",
        };
        line.push_str(&format!(
            "\n   -> {}: {} ({}~{})",
            kind,
            format_date(zone.date),
            zone.low,
            zone.high
        ));
    }
    line
}

/// MA cross phase followed by the confirmed key price and trigger price.
pub fn format_cross(signal: &CrossSignal) -> Vec<String> {
    let phase = match signal.phase {
        CrossPhase::Neutral => "MA cross: none".to_string(),
        CrossPhase::GoldenObserving => format!("MA cross: golden cross observing (day {}/3)", signal.observation_count),
        CrossPhase::DeathObserving => format!("MA cross: death cross observing (day {}/3)", signal.observation_count),
        CrossPhase::GoldenConfirmed => "MA cross: golden cross confirmed".to_string(),
        CrossPhase::DeathConfirmed => "MA cross: death cross confirmed".to_string(),
    };

    let mut lines = vec![phase];

    if let Some(cross) = &signal.confirmed {
        let kind = match cross.kind {
            CrossKind::Golden => "golden",
            CrossKind::Death => "death",
        };
        lines.push(format!(
            "   -> last {} cross {} key price {:.2} (band {:.2}~{:.2})",
            kind,
            format_date(cross.date),
            cross.key_price,
            cross.band_low,
            cross.band_high
        ));
    }

    if let Some(trigger) = &signal.trigger {
        let text = match trigger.kind {
            CrossKind::Golden => format!("golden cross if tomorrow closes at or above {:.2}", trigger.price),
            CrossKind::Death => format!("death cross if tomorrow closes at or below {:.2}", trigger.price),
        };
        lines.push(format!("   -> {}", text));
    }

    lines
}

fn format_basic(tech: &TechnicalSnapshot) -> String {
    let ma20 = tech
        .ma20
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "n/a".to_string());
    format!("[Basic]\nClose: {}\nMA20: {}", tech.last_close, ma20)
}

fn format_technical(tech: &TechnicalSnapshot) -> String {
    let inertia = &tech.inertia;
    let mut lines = vec![format_inertia(&inertia.daily)];
    lines.extend(inertia.weekly.iter().map(format_inertia));
    lines.extend(inertia.monthly.iter().map(format_inertia));
    lines.push(format_breakout(&tech.breakout));
    lines.extend(format_cross(&tech.cross));
    format!("[Technical]\n{}", lines.join("\n"))
}

/// Shareholder section; `"no data"` when the source has none.
pub fn format_shareholders(trends: &[HolderTrend]) -> String {
    let Some(first) = trends.first() else {
        return "[Shareholders]\nno data".to_string();
    };

    let lines: Vec<String> = trends
        .iter()
        .map(|t| {
            let value = match t.metric {
                HolderMetric::TotalHolders => with_commas(t.current),
                _ => format!("{:.2}%", t.current),
            };
            let change = match t.change {
                HolderChange::Increase => "increase",
                HolderChange::Decrease => "decrease",
                HolderChange::Flat => "flat",
            };
            let run = if t.run_count > 1 {
                format!(", {} weeks in a row", t.run_count)
            } else {
                String::new()
            };
            format!("{}: {} ({}{})", t.metric.name(), value, change, run)
        })
        .collect();

    format!("[Shareholders] ({})\n{}", format_date(first.as_of), lines.join("\n"))
}

pub fn format_revenue(update: &RevenueUpdate) -> String {
    let mut lines = vec![
        format!("[New monthly revenue] ({}-{})", update.year, update.month),
        format!("Amount: {:.2} hundred million", update.revenue / 100_000_000.0),
        format!("MoM: {:.2}%", update.mom_pct),
        format!("YoY: {:.2}%", update.yoy_pct),
    ];
    match update.high {
        Some(RevenueHigh::AllTime) => lines.push("All-time high".to_string()),
        Some(RevenueHigh::Months(n)) => lines.push(format!("{}-month high", n)),
        None => {}
    }
    if let Some(estimate) = &update.estimate {
        lines.push(String::new());
        lines.push("[Analyst EPS estimates]".to_string());
        lines.push(estimate.clone());
    }
    lines.join("\n")
}

pub fn format_financials(update: &FinancialUpdate) -> String {
    [
        format!("[New quarterly report] ({})", update.quarter),
        format!(
            "Gross margin: {:.2}% (QoQ {:+.2}%, YoY {:+.2}%)",
            update.gross_margin, update.gross_margin_qoq, update.gross_margin_yoy
        ),
        format!(
            "Operating margin: {:.2}% (QoQ {:+.2}%, YoY {:+.2}%)",
            update.operating_margin, update.operating_margin_qoq, update.operating_margin_yoy
        ),
        format!(
            "Net margin: {:.2}% (QoQ {:+.2}%, YoY {:+.2}%)",
            update.net_margin, update.net_margin_qoq, update.net_margin_yoy
        ),
        String::new(),
        "[EPS]".to_string(),
        format!(
            "Quarter: {:.2} (QoQ {:+.2}%, YoY {:+.2}%)",
            update.eps, update.eps_qoq, update.eps_yoy
        ),
        format!("Year to date: {:.2} (YoY {:+.2}%)", update.eps_ytd, update.eps_ytd_growth),
    ]
    .join("\n")
}

/// Full report for one watchlist symbol.
pub fn stock_report(
    entry: &WatchlistEntry,
    tech: &TechnicalSnapshot,
    holders: &[HolderTrend],
    revenue: Option<&RevenueUpdate>,
    financials: Option<&FinancialUpdate>,
) -> String {
    let mut fundamentals: Vec<String> = Vec::new();
    fundamentals.extend(revenue.map(format_revenue));
    fundamentals.extend(financials.map(format_financials));
    let fundamentals = if fundamentals.is_empty() {
        "no recent fundamental updates".to_string()
    } else {
        fundamentals.join("\n\n")
    };

    [
        format!("[{} report] ({})", entry.title(), tech.last_date.format("%Y-%m-%d")),
        format_basic(tech),
        format_technical(tech),
        format_shareholders(holders),
        format!("[Fundamentals]\n{}", fundamentals),
    ]
    .join("\n\n")
        + "\n"
        + SECTION_RULE
        + "\n"
}

/// Basic and technical sections for a market index.
pub fn index_report(index: &MarketIndex, tech: Option<&TechnicalSnapshot>) -> String {
    let Some(tech) = tech else {
        return format!("[{}] no data", index.name);
    };

    [
        format!("[{} ({})] ({})", index.name, index.id, tech.last_date.format("%Y-%m-%d")),
        format_basic(tech),
        format_technical(tech),
    ]
    .join("\n\n")
        + "\n"
        + SECTION_RULE
}

pub fn failure_line(symbol: &str, error: &str) -> String {
    format!("[{}] analysis failed: {}\n", symbol, error)
}

/// Header followed by the sections in order.
pub fn compose(sections: &[String]) -> String {
    format!("{}{}", REPORT_HEADER, sections.join("\n"))
}
