//! Fundamental and shareholder-distribution records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One month of reported revenue (FinMind `TaiwanStockMonthRevenue`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    /// Publication date.
    pub date: NaiveDate,
    pub revenue_year: i32,
    pub revenue_month: u32,
    pub revenue: f64,
}

/// How the newest revenue ranks against history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueHigh {
    AllTime,
    /// Highest in the trailing N months (12, 6 or 3).
    Months(u32),
}

/// A revenue month not yet reported for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueUpdate {
    pub year: i32,
    pub month: u32,
    pub revenue: f64,
    pub mom_pct: f64,
    pub yoy_pct: f64,
    pub high: Option<RevenueHigh>,
    /// Cursor value, `YYYY-MM`.
    pub period: String,
    /// Analyst EPS estimate text looked up for this release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<String>,
}

/// One line item of a financial statement (FinMind long format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementItem {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
}

/// A financial quarter not yet reported for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialUpdate {
    /// Cursor value, `YYYY-Qn`.
    pub quarter: String,
    pub gross_margin: f64,
    pub operating_margin: f64,
    pub net_margin: f64,
    pub gross_margin_qoq: f64,
    pub operating_margin_qoq: f64,
    pub net_margin_qoq: f64,
    pub gross_margin_yoy: f64,
    pub operating_margin_yoy: f64,
    pub net_margin_yoy: f64,
    pub eps: f64,
    pub eps_qoq: f64,
    pub eps_yoy: f64,
    pub eps_ytd: f64,
    pub eps_ytd_last_year: f64,
    pub eps_ytd_growth: f64,
}

/// Weekly shareholder-distribution snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareholderSnapshot {
    pub date: NaiveDate,
    pub total_holders: f64,
    /// Percentage held by holders of more than 400 lots.
    pub over_400_pct: f64,
    /// Percentage held by holders of more than 1000 lots.
    pub over_1000_pct: f64,
}

/// Tracked shareholder metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolderMetric {
    TotalHolders,
    Over400Pct,
    Over1000Pct,
}

impl HolderMetric {
    pub const ALL: [HolderMetric; 3] = [Self::TotalHolders, Self::Over400Pct, Self::Over1000Pct];

    pub fn name(&self) -> &'static str {
        match self {
            Self::TotalHolders => "Total shareholders",
            Self::Over400Pct => "400+ lot holders",
            Self::Over1000Pct => "1000+ lot holders",
        }
    }

    pub fn value(&self, snapshot: &ShareholderSnapshot) -> f64 {
        match self {
            Self::TotalHolders => snapshot.total_holders,
            Self::Over400Pct => snapshot.over_400_pct,
            Self::Over1000Pct => snapshot.over_1000_pct,
        }
    }
}

/// Week-over-week direction of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolderChange {
    Increase,
    Decrease,
    Flat,
}

impl HolderChange {
    pub fn from_diff(diff: f64) -> Self {
        if diff > 0.0 {
            Self::Increase
        } else if diff < 0.0 {
            Self::Decrease
        } else {
            Self::Flat
        }
    }
}

/// Consecutive-week trend of one shareholder metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderTrend {
    pub metric: HolderMetric,
    pub current: f64,
    pub diff: f64,
    pub change: HolderChange,
    /// Number of consecutive weeks with the same change, 0 when flat.
    pub run_count: usize,
    pub dates: Vec<NaiveDate>,
    /// Date of the latest snapshot.
    pub as_of: NaiveDate,
}
