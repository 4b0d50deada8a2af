//! Market-data collaborators.

pub mod estimates;
pub mod finmind;
pub mod shareholders;

pub use estimates::{EstimateSource, GeminiEstimates, NoEstimates};
pub use finmind::FinMindClient;
pub use shareholders::ShareholderPageClient;

use async_trait::async_trait;

use crate::types::{MonthlyRevenue, PriceBar, ShareholderSnapshot, StatementItem};

/// Source of prices and fundamentals for Taiwan-listed symbols.
///
/// Implementations log fetch failures and return empty data instead of
/// erroring, so one broken symbol never aborts a run.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily bars for the last `lookback_days` calendar days, ascending.
    async fn daily_bars(&self, symbol: &str, lookback_days: u32) -> Vec<PriceBar>;

    async fn monthly_revenue(&self, symbol: &str) -> Vec<MonthlyRevenue>;

    /// Quarterly statement items in FinMind's long format.
    async fn financial_statements(&self, symbol: &str) -> Vec<StatementItem>;

    /// Weekly shareholder-distribution snapshots, ascending.
    async fn shareholder_snapshots(&self, symbol: &str) -> Vec<ShareholderSnapshot>;

    async fn stock_name(&self, symbol: &str) -> Option<String>;
}
