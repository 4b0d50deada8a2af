//! FinMind v4 API client for Taiwan stock data.
//!
//! Provides daily prices, monthly revenue, quarterly statements and
//! company names. Index ids (`TAIEX`, `TPEx`) use the same price dataset.
//! FinMind's shareholder dataset needs a paid plan, so shareholder
//! distribution is read from the holder pages instead.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::shareholders::ShareholderPageClient;
use super::MarketDataSource;
use crate::error::{AppError, Result};
use crate::types::{MonthlyRevenue, PriceBar, ShareholderSnapshot, StatementItem};

const FINMIND_URL: &str = "https://api.finmindtrade.com/api/v4/data";

const PRICE_DATASET: &str = "TaiwanStockPrice";
const REVENUE_DATASET: &str = "TaiwanStockMonthRevenue";
const STATEMENT_DATASET: &str = "TaiwanStockFinancialStatements";
const INFO_DATASET: &str = "TaiwanStockInfo";

/// History fetched for revenue and statements.
const FUNDAMENTAL_LOOKBACK_DAYS: u64 = 3 * 365;

/// FinMind response envelope.
#[derive(Debug, Deserialize)]
struct FinMindResponse<T> {
    #[serde(default)]
    msg: String,
    status: u16,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

impl<T> FinMindResponse<T> {
    fn into_rows(self) -> Result<Vec<T>> {
        if self.status != 200 {
            return Err(AppError::ExternalApi(format!(
                "FinMind status {}: {}",
                self.status, self.msg
            )));
        }
        Ok(self.data)
    }
}

#[derive(Debug, Deserialize)]
struct StockInfoRow {
    stock_id: String,
    stock_name: String,
}

/// FinMind API client.
pub struct FinMindClient {
    client: Client,
    token: Option<String>,
    holders: ShareholderPageClient,
}

impl FinMindClient {
    /// Create a client; an empty token is treated as anonymous access.
    pub fn new(token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            token: token.filter(|t| !t.is_empty()),
            holders: ShareholderPageClient::new(timeout)?,
        })
    }

    /// Fetch one dataset, optionally filtered by id and start date.
    async fn fetch<T: DeserializeOwned>(
        &self,
        dataset: &str,
        data_id: Option<&str>,
        start_date: Option<NaiveDate>,
    ) -> Result<Vec<T>> {
        let mut query: Vec<(&str, String)> = vec![("dataset", dataset.to_string())];
        if let Some(id) = data_id {
            query.push(("data_id", id.to_string()));
        }
        if let Some(start) = start_date {
            query.push(("start_date", start.format("%Y-%m-%d").to_string()));
        }

        debug!("Fetching FinMind {} for {:?}", dataset, data_id);

        let mut request = self.client.get(FINMIND_URL).query(&query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "FinMind {} returned {}",
                dataset,
                response.status()
            )));
        }

        let body: FinMindResponse<T> = response.json().await?;
        body.into_rows()
    }

    fn days_ago(days: u64) -> NaiveDate {
        let today = Local::now().date_naive();
        today.checked_sub_days(Days::new(days)).unwrap_or(today)
    }
}

/// Sort ascending and drop bars without a trade.
fn clean_bars(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    bars.retain(|b| b.close > 0.0);
    bars.sort_by_key(|b| b.date);
    bars
}

#[async_trait]
impl MarketDataSource for FinMindClient {
    async fn daily_bars(&self, symbol: &str, lookback_days: u32) -> Vec<PriceBar> {
        let start = Self::days_ago(lookback_days as u64);
        match self.fetch::<PriceBar>(PRICE_DATASET, Some(symbol), Some(start)).await {
            Ok(bars) => {
                if bars.is_empty() {
                    warn!("No price data for {}", symbol);
                }
                clean_bars(bars)
            }
            Err(e) => {
                warn!("Failed to fetch prices for {}: {}", symbol, e);
                Vec::new()
            }
        }
    }

    async fn monthly_revenue(&self, symbol: &str) -> Vec<MonthlyRevenue> {
        let start = Self::days_ago(FUNDAMENTAL_LOOKBACK_DAYS);
        self.fetch(REVENUE_DATASET, Some(symbol), Some(start))
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to fetch revenue for {}: {}", symbol, e);
                Vec::new()
            })
    }

    async fn financial_statements(&self, symbol: &str) -> Vec<StatementItem> {
        let start = Self::days_ago(FUNDAMENTAL_LOOKBACK_DAYS);
        self.fetch(STATEMENT_DATASET, Some(symbol), Some(start))
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to fetch statements for {}: {}", symbol, e);
                Vec::new()
            })
    }

    async fn shareholder_snapshots(&self, symbol: &str) -> Vec<ShareholderSnapshot> {
        match self.holders.fetch(symbol).await {
            Ok(snapshots) => {
                if snapshots.is_empty() {
                    warn!("No shareholder table for {}", symbol);
                }
                snapshots
            }
            Err(e) => {
                warn!("Failed to fetch shareholders for {}: {}", symbol, e);
                Vec::new()
            }
        }
    }

    async fn stock_name(&self, symbol: &str) -> Option<String> {
        match self.fetch::<StockInfoRow>(INFO_DATASET, Some(symbol), None).await {
            Ok(rows) => rows
                .into_iter()
                .find(|row| row.stock_id == symbol)
                .map(|row| row.stock_name),
            Err(e) => {
                warn!("Failed to fetch name for {}: {}", symbol, e);
                None
            }
        }
    }
}
