use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Daily OHLC price bar.
///
/// FinMind names the high/low columns `max`/`min`; both spellings deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    #[serde(alias = "max")]
    pub high: f64,
    #[serde(alias = "min")]
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
        }
    }
}

/// Indicator columns aligned index-for-index with a price series.
///
/// Positions before a window is fully populated hold `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub ma5: Vec<f64>,
    pub ma20: Vec<f64>,
    pub ma60: Vec<f64>,
    /// 9-period stochastic %K.
    pub k: Vec<f64>,
    /// 3-period mean of %K.
    pub d: Vec<f64>,
}

impl IndicatorSeries {
    /// Whether every column has exactly `len` entries.
    pub fn is_aligned_with(&self, len: usize) -> bool {
        [&self.ma5, &self.ma20, &self.ma60, &self.k, &self.d]
            .iter()
            .all(|column| column.len() == len)
    }

    /// Keep only the trailing `len` positions of every column.
    pub fn tail(&self, len: usize) -> Self {
        fn tail_of(column: &[f64], len: usize) -> Vec<f64> {
            column[column.len().saturating_sub(len)..].to_vec()
        }

        Self {
            ma5: tail_of(&self.ma5, len),
            ma20: tail_of(&self.ma20, len),
            ma60: tail_of(&self.ma60, len),
            k: tail_of(&self.k, len),
            d: tail_of(&self.d, len),
        }
    }
}

/// Trailing slice of at most `len` bars.
pub fn tail(bars: &[PriceBar], len: usize) -> &[PriceBar] {
    &bars[bars.len().saturating_sub(len)..]
}

/// Check that a series is strictly ascending by date.
///
/// Trackers assume this; an unordered or duplicated series is a caller bug.
pub fn validate_series(bars: &[PriceBar]) -> Result<()> {
    for pair in bars.windows(2) {
        if pair[1].date == pair[0].date {
            return Err(AppError::InvalidSeries(format!("duplicate date {}", pair[1].date)));
        }
        if pair[1].date < pair[0].date {
            return Err(AppError::InvalidSeries(format!(
                "{} follows {}",
                pair[1].date, pair[0].date
            )));
        }
    }
    Ok(())
}
