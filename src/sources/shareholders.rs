//! Shareholder distribution scraped from the TWSTHR stock holder pages.
//!
//! The page carries one wide HTML table per stock with a row per weekly
//! TDCC snapshot. Columns are located by their header text, so extra or
//! reordered columns do not matter.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::types::ShareholderSnapshot;

const HOLDERS_URL: &str = "https://norway.twsthr.info/StockHolders.aspx";

// The site rejects requests without a browser user agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Client for the shareholder distribution page.
pub struct ShareholderPageClient {
    client: Client,
}

impl ShareholderPageClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Weekly snapshots for `symbol`, ascending by date.
    pub async fn fetch(&self, symbol: &str) -> Result<Vec<ShareholderSnapshot>> {
        debug!("Fetching shareholder distribution for {}", symbol);

        let response = self
            .client
            .get(HOLDERS_URL)
            .query(&[("stock", symbol)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Shareholder page for {} returned {}",
                symbol,
                response.status()
            )));
        }

        let html = response.text().await?;
        parse_holder_table(&html)
    }
}

/// Column positions taken from a header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    total: usize,
    over_400: Option<usize>,
    over_1000: Option<usize>,
}

impl Columns {
    /// Recognise a header row; it must name the date and holder count.
    fn detect(header: &[String]) -> Option<Self> {
        let find = |keys: &[&str]| header.iter().position(|c| keys.iter().all(|k| c.contains(k)));

        Some(Self {
            date: find(&["資料日期"])?,
            total: find(&["總股東", "人數"])?,
            over_400: find(&["400", "持有百分比"]),
            over_1000: find(&["1000", "持有百分比"]),
        })
    }

    fn snapshot(&self, cells: &[String]) -> Option<ShareholderSnapshot> {
        let value = |index: Option<usize>| {
            index
                .and_then(|i| cells.get(i))
                .map(|text| number(text))
                .unwrap_or(0.0)
        };

        Some(ShareholderSnapshot {
            date: parse_date(cells.get(self.date)?)?,
            total_holders: value(Some(self.total)),
            over_400_pct: value(self.over_400),
            over_1000_pct: value(self.over_1000),
        })
    }
}

/// Text of the row's own cells with all whitespace removed.
fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .map(|cell| cell.text().flat_map(str::split_whitespace).collect())
        .collect()
}

/// `20251219`, also accepting separators and a trailing `.0`.
fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.strip_suffix(".0").unwrap_or(text);
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(&digits, "%Y%m%d").ok()
}

/// Numeric cell; anything unparsable counts as 0.
fn number(text: &str) -> f64 {
    text.replace(',', "").parse().unwrap_or(0.0)
}

/// Extract the weekly snapshots from a holder page.
///
/// Every row that looks like a header resets the column map; rows whose
/// date cell does not hold an eight-digit date are skipped.
pub fn parse_holder_table(html: &str) -> Result<Vec<ShareholderSnapshot>> {
    let rows = Selector::parse("tr")
        .map_err(|e| AppError::Internal(format!("row selector: {}", e)))?;
    let document = Html::parse_document(html);

    let mut columns: Option<Columns> = None;
    let mut snapshots = Vec::new();

    for row in document.select(&rows) {
        let cells = cell_texts(row);
        if let Some(header) = Columns::detect(&cells) {
            columns = Some(header);
            continue;
        }
        if let Some(snapshot) = columns.and_then(|c| c.snapshot(&cells)) {
            snapshots.push(snapshot);
        }
    }

    snapshots.sort_by_key(|s| s.date);
    snapshots.dedup_by_key(|s| s.date);
    Ok(snapshots)
}
