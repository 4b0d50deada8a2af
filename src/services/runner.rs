//! One analysis run over the market indices and the watchlist.

use std::sync::Arc;

use futures_util::{stream, StreamExt};
use tracing::{error, info, warn};

use crate::error::{AppError, Result};
use crate::services::fundamentals::{analyze_financials, analyze_revenue, analyze_shareholders};
use crate::services::notifier::Notifier;
use crate::services::report;
use crate::services::signals::analyze_technical;
use crate::services::watchlist::WatchlistStore;
use crate::sources::{EstimateSource, MarketDataSource, NoEstimates};
use crate::types::{validate_series, MarketIndex, RunSummary, TechnicalSnapshot, WatchlistEntry};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 180;
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Result of analyzing one watchlist symbol.
struct SymbolOutcome {
    report: String,
    revenue_period: Option<String>,
    financial_quarter: Option<String>,
}

/// Fetches, analyzes, reports and advances cursors.
pub struct AnalysisRunner {
    source: Arc<dyn MarketDataSource>,
    store: Arc<dyn WatchlistStore>,
    notifier: Arc<dyn Notifier>,
    estimates: Arc<dyn EstimateSource>,
    indices: Vec<MarketIndex>,
    lookback_days: u32,
    max_concurrency: usize,
}

impl AnalysisRunner {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        store: Arc<dyn WatchlistStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            store,
            notifier,
            estimates: Arc::new(NoEstimates),
            indices: Vec::new(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Look up analyst estimates whenever a new revenue month is reported.
    pub fn with_estimates(mut self, estimates: Arc<dyn EstimateSource>) -> Self {
        self.estimates = estimates;
        self
    }

    pub fn with_indices(mut self, indices: Vec<MarketIndex>) -> Self {
        self.indices = indices;
        self
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    /// Run once and deliver the combined report.
    ///
    /// A failing symbol becomes a failure line in the report. Cursors only
    /// advance after the report was delivered.
    pub async fn run(&self) -> Result<RunSummary> {
        let entries = self.store.entries().await;
        if entries.is_empty() {
            warn!("Watchlist is empty, nothing to analyze");
            return Ok(RunSummary::default());
        }

        info!(
            "Starting analysis of {} indices and {} symbols",
            self.indices.len(),
            entries.len()
        );

        let mut summary = RunSummary::default();

        let index_runs: Vec<_> = self.indices.iter().map(|index| self.analyze_index(index)).collect();
        let mut sections: Vec<String> = stream::iter(index_runs)
            .buffered(self.max_concurrency)
            .collect()
            .await;
        summary.indices = sections.len();

        // buffered keeps watchlist order in the report
        let symbol_runs: Vec<_> = entries.into_iter().map(|entry| self.analyze_symbol(entry)).collect();
        let outcomes: Vec<(String, Result<SymbolOutcome>)> = stream::iter(symbol_runs)
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut cursor_updates = Vec::new();
        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(outcome) => {
                    summary.analyzed += 1;
                    sections.push(outcome.report);
                    if outcome.revenue_period.is_some() {
                        summary.revenue_updates += 1;
                    }
                    if outcome.financial_quarter.is_some() {
                        summary.financial_updates += 1;
                    }
                    cursor_updates.push((symbol, outcome.revenue_period, outcome.financial_quarter));
                }
                Err(e) => {
                    error!("Analysis of {} failed: {}", symbol, e);
                    sections.push(report::failure_line(&symbol, &e.to_string()));
                    summary.failures.push(format!("{}: {}", symbol, e));
                }
            }
        }

        let text = report::compose(&sections);
        match self.notifier.send(&text).await {
            Ok(()) => summary.delivered = true,
            Err(e) => error!("Failed to deliver report: {}", e),
        }

        if summary.delivered {
            self.advance_cursors(cursor_updates).await;
        }

        info!(
            "Analysis finished: {} analyzed, {} failed",
            summary.analyzed,
            summary.failures.len()
        );
        Ok(summary)
    }

    async fn advance_cursors(&self, updates: Vec<(String, Option<String>, Option<String>)>) {
        for (symbol, revenue_period, financial_quarter) in updates {
            if let Some(period) = revenue_period {
                if let Err(e) = self.store.set_revenue_period(&symbol, &period).await {
                    warn!("Failed to store revenue cursor for {}: {}", symbol, e);
                }
            }
            if let Some(quarter) = financial_quarter {
                if let Err(e) = self.store.set_financial_quarter(&symbol, &quarter).await {
                    warn!("Failed to store financial cursor for {}: {}", symbol, e);
                }
            }
        }
    }

    /// Validated technical snapshot for `symbol`, `None` without price data.
    async fn technical(&self, symbol: &str) -> Result<Option<TechnicalSnapshot>> {
        let bars = self.source.daily_bars(symbol, self.lookback_days).await;
        validate_series(&bars)?;
        Ok(analyze_technical(&bars))
    }

    async fn analyze_index(&self, index: &MarketIndex) -> String {
        info!("Analyzing index {} ({})", index.name, index.id);
        let tech = self.technical(&index.id).await.unwrap_or_else(|e| {
            warn!("Index {} skipped: {}", index.id, e);
            None
        });
        report::index_report(index, tech.as_ref())
    }

    async fn analyze_symbol(&self, entry: WatchlistEntry) -> (String, Result<SymbolOutcome>) {
        let symbol = entry.symbol.clone();
        let outcome = self.analyze_entry(entry).await;
        (symbol, outcome)
    }

    async fn analyze_entry(&self, mut entry: WatchlistEntry) -> Result<SymbolOutcome> {
        let symbol = entry.symbol.clone();

        if entry.name.as_deref().map_or(true, str::is_empty) {
            if let Some(name) = self.source.stock_name(&symbol).await {
                info!("Filled name for {}: {}", symbol, name);
                if let Err(e) = self.store.set_name(&symbol, &name).await {
                    warn!("Failed to store name for {}: {}", symbol, e);
                }
                entry.name = Some(name);
            }
        }

        info!(
            "Analyzing {} (last revenue: {:?}, last quarter: {:?})",
            entry.title(),
            entry.last_revenue_period,
            entry.last_financial_quarter
        );

        let tech = self
            .technical(&symbol)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no price data for {}", symbol)))?;

        let (revenue_rows, statements, snapshots) = tokio::join!(
            self.source.monthly_revenue(&symbol),
            self.source.financial_statements(&symbol),
            self.source.shareholder_snapshots(&symbol),
        );

        let mut revenue = analyze_revenue(&revenue_rows, entry.last_revenue_period.as_deref());
        if let Some(update) = revenue.as_mut() {
            let name = entry.name.as_deref().unwrap_or(&symbol);
            update.estimate = self.estimates.eps_estimate(&symbol, name).await;
        }
        let financials = analyze_financials(&statements, entry.last_financial_quarter.as_deref());
        let holders = analyze_shareholders(&snapshots);

        let report = report::stock_report(&entry, &tech, &holders, revenue.as_ref(), financials.as_ref());

        Ok(SymbolOutcome {
            report,
            revenue_period: revenue.map(|r| r.period),
            financial_quarter: financials.map(|f| f.quarter),
        })
    }
}
