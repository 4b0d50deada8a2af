//! Quarterly financial statement analysis.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};

use super::revenue::pct_change;
use crate::types::{FinancialUpdate, StatementItem};

const REVENUE: &str = "Revenue";
const GROSS_PROFIT: &str = "GrossProfit";
const OPERATING_INCOME: &str = "OperatingIncome";
const NET_INCOME: &str = "IncomeAfterTaxes";
const EPS: &str = "EPS";

/// Statement items of one report date, keyed by item type.
type Statement = HashMap<String, f64>;

fn item(statement: &Statement, kind: &str) -> f64 {
    statement.get(kind).copied().unwrap_or(0.0)
}

/// Gross, operating and net margins in percent; zero without revenue.
fn margins(statement: &Statement) -> (f64, f64, f64) {
    let revenue = item(statement, REVENUE);
    if revenue > 0.0 {
        (
            item(statement, GROSS_PROFIT) / revenue * 100.0,
            item(statement, OPERATING_INCOME) / revenue * 100.0,
            item(statement, NET_INCOME) / revenue * 100.0,
        )
    } else {
        (0.0, 0.0, 0.0)
    }
}

/// `YYYY-Qn` label for a report date.
pub fn quarter_label(date: NaiveDate) -> String {
    format!("{}-Q{}", date.year(), (date.month() - 1) / 3 + 1)
}

/// Analyze the newest quarter if it is past `last_quarter`.
///
/// QoQ compares against the previous report date and YoY against the
/// report four dates back; either is zero when that report is missing.
pub fn analyze_financials(items: &[StatementItem], last_quarter: Option<&str>) -> Option<FinancialUpdate> {
    let mut pivot: BTreeMap<NaiveDate, Statement> = BTreeMap::new();
    for it in items {
        pivot
            .entry(it.date)
            .or_default()
            .entry(it.kind.clone())
            .or_insert(it.value);
    }

    let reports: Vec<(&NaiveDate, &Statement)> = pivot.iter().collect();
    let (&last_date, latest) = *reports.last()?;

    let quarter = quarter_label(last_date);
    if let Some(cursor) = last_quarter.filter(|c| !c.is_empty()) {
        if quarter.as_str() <= cursor {
            return None;
        }
    }

    let (gm, om, nm) = margins(latest);
    let eps = item(latest, EPS);

    let prev_quarter = reports.len().checked_sub(2).map(|i| reports[i].1);
    let prev_year = reports.len().checked_sub(5).map(|i| reports[i].1);

    let delta = |base: Option<&Statement>| {
        base.map(|s| {
            let (pg, po, pn) = margins(s);
            (gm - pg, om - po, nm - pn)
        })
        .unwrap_or((0.0, 0.0, 0.0))
    };
    let (gm_qoq, om_qoq, nm_qoq) = delta(prev_quarter);
    let (gm_yoy, om_yoy, nm_yoy) = delta(prev_year);

    let eps_growth = |base: Option<&Statement>| base.map(|s| pct_change(eps, item(s, EPS))).unwrap_or(0.0);

    let eps_items = || items.iter().filter(|it| it.kind == EPS);
    let eps_ytd: f64 = eps_items()
        .filter(|it| it.date.year() == last_date.year() && it.date <= last_date)
        .map(|it| it.value)
        .sum();
    let eps_ytd_last_year: f64 = eps_items()
        .filter(|it| it.date.year() == last_date.year() - 1 && it.date.month() <= last_date.month())
        .map(|it| it.value)
        .sum();

    Some(FinancialUpdate {
        quarter,
        gross_margin: gm,
        operating_margin: om,
        net_margin: nm,
        gross_margin_qoq: gm_qoq,
        operating_margin_qoq: om_qoq,
        net_margin_qoq: nm_qoq,
        gross_margin_yoy: gm_yoy,
        operating_margin_yoy: om_yoy,
        net_margin_yoy: nm_yoy,
        eps,
        eps_qoq: eps_growth(prev_quarter),
        eps_yoy: eps_growth(prev_year),
        eps_ytd,
        eps_ytd_last_year,
        eps_ytd_growth: pct_change(eps_ytd, eps_ytd_last_year),
    })
}
