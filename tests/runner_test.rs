/**
 * Runner Tests
 *
 * End-to-end analysis runs against fake market data and notifiers:
 * - Report order, failure lines and cursor advancement
 * - Cursors persisted across restarts in SQLite
 * - Analyst estimates on new revenue months
 * - HTTP health and run endpoints
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Days, NaiveDate};
use tower::ServiceExt;

use trendwatch::config::Config;
use trendwatch::error::{AppError, Result};
use trendwatch::services::report::REPORT_HEADER;
use trendwatch::services::{AnalysisRunner, MemoryWatchlist, Notifier, SqliteWatchlist, WatchlistStore};
use trendwatch::sources::{EstimateSource, MarketDataSource};
use trendwatch::types::*;

// =========================================================================
// Fakes
// =========================================================================

#[derive(Default)]
struct FakeSource {
    bars: HashMap<String, Vec<PriceBar>>,
    revenue: HashMap<String, Vec<MonthlyRevenue>>,
    names: HashMap<String, String>,
}

#[async_trait]
impl MarketDataSource for FakeSource {
    async fn daily_bars(&self, symbol: &str, _lookback_days: u32) -> Vec<PriceBar> {
        self.bars.get(symbol).cloned().unwrap_or_default()
    }

    async fn monthly_revenue(&self, symbol: &str) -> Vec<MonthlyRevenue> {
        self.revenue.get(symbol).cloned().unwrap_or_default()
    }

    async fn financial_statements(&self, _symbol: &str) -> Vec<StatementItem> {
        Vec::new()
    }

    async fn shareholder_snapshots(&self, _symbol: &str) -> Vec<ShareholderSnapshot> {
        Vec::new()
    }

    async fn stock_name(&self, symbol: &str) -> Option<String> {
        self.names.get(symbol).cloned()
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        if self.fail {
            return Err(AppError::ExternalApi("push rejected".to_string()));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct FakeEstimates {
    asked: Mutex<Vec<String>>,
}

impl FakeEstimates {
    fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl EstimateSource for FakeEstimates {
    async fn eps_estimate(&self, symbol: &str, name: &str) -> Option<String> {
        self.asked.lock().unwrap().push(format!("{} {}", symbol, name));
        Some("2025 EPS: 58.2 (raised)".to_string())
    }
}

// =========================================================================
// Fixtures
// =========================================================================

fn rising(len: usize) -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    (0..len)
        .map(|i| {
            let close = 100.0 + i as f64;
            PriceBar::new(start + Days::new(i as u64), close, close + 1.0, close - 1.0, close)
        })
        .collect()
}

fn revenue_rows() -> Vec<MonthlyRevenue> {
    vec![
        MonthlyRevenue {
            date: NaiveDate::from_ymd_opt(2025, 10, 10).unwrap(),
            revenue_year: 2025,
            revenue_month: 9,
            revenue: 100.0,
        },
        MonthlyRevenue {
            date: NaiveDate::from_ymd_opt(2025, 11, 10).unwrap(),
            revenue_year: 2025,
            revenue_month: 10,
            revenue: 120.0,
        },
    ]
}

fn source() -> FakeSource {
    let mut source = FakeSource::default();
    source.bars.insert("TAIEX".to_string(), rising(80));
    source.bars.insert("2330".to_string(), rising(80));
    source.bars.insert("2317".to_string(), rising(30));
    source.revenue.insert("2330".to_string(), revenue_rows());
    source.names.insert("2317".to_string(), "Hon Hai".to_string());
    source
}

fn watchlist() -> Arc<MemoryWatchlist> {
    Arc::new(MemoryWatchlist::new(vec![
        WatchlistEntry::new("2330").with_name("TSMC"),
        WatchlistEntry::new("2317"),
        WatchlistEntry::new("9999"),
    ]))
}

fn indices() -> Vec<MarketIndex> {
    vec![MarketIndex {
        id: "TAIEX".to_string(),
        name: "Weighted index".to_string(),
    }]
}

fn runner(store: Arc<dyn WatchlistStore>, notifier: Arc<RecordingNotifier>) -> AnalysisRunner {
    AnalysisRunner::new(Arc::new(source()), store, notifier)
        .with_indices(indices())
        .with_max_concurrency(2)
}

// =========================================================================
// Runner
// =========================================================================

#[tokio::test]
async fn test_empty_watchlist_sends_nothing() {
    let notifier = Arc::new(RecordingNotifier::default());
    let runner = runner(Arc::new(MemoryWatchlist::new(Vec::new())), notifier.clone());

    let summary = runner.run().await.unwrap();
    assert_eq!(summary, RunSummary::default());
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_full_run_reports_in_order() {
    let store = watchlist();
    let notifier = Arc::new(RecordingNotifier::default());
    let summary = runner(store.clone(), notifier.clone()).run().await.unwrap();

    assert_eq!(summary.indices, 1);
    assert_eq!(summary.analyzed, 2);
    assert_eq!(summary.revenue_updates, 1);
    assert_eq!(summary.financial_updates, 0);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].starts_with("9999"));
    assert!(summary.delivered);

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    let text = &messages[0];
    assert!(text.starts_with(REPORT_HEADER));

    let index = text.find("[Weighted index (TAIEX)]").unwrap();
    let tsmc = text.find("[2330 TSMC report]").unwrap();
    let hon_hai = text.find("[2317 Hon Hai report]").unwrap();
    let failed = text.find("[9999] analysis failed").unwrap();
    assert!(index < tsmc && tsmc < hon_hai && hon_hai < failed);
    assert!(text.contains("[New monthly revenue] (2025-10)"));

    let entries = store.entries().await;
    assert_eq!(entries[0].last_revenue_period.as_deref(), Some("2025-10"));
    assert_eq!(entries[1].name.as_deref(), Some("Hon Hai"));
    assert!(entries[1].last_revenue_period.is_none());
}

#[tokio::test]
async fn test_second_run_skips_reported_revenue() {
    let store = watchlist();
    let notifier = Arc::new(RecordingNotifier::default());
    let runner = runner(store, notifier.clone());

    runner.run().await.unwrap();
    let summary = runner.run().await.unwrap();

    assert_eq!(summary.revenue_updates, 0);
    assert!(notifier.messages()[1].contains("no recent fundamental updates"));
}

#[tokio::test]
async fn test_failed_delivery_keeps_cursors() {
    let store = watchlist();
    let notifier = Arc::new(RecordingNotifier::failing());
    let summary = runner(store.clone(), notifier).run().await.unwrap();

    assert!(!summary.delivered);
    assert_eq!(summary.revenue_updates, 1);
    assert!(store.entries().await[0].last_revenue_period.is_none());
}

#[tokio::test]
async fn test_unordered_bars_fail_symbol() {
    let mut source = source();
    let mut bars = rising(20);
    bars.swap(3, 4);
    source.bars.insert("2330".to_string(), bars);

    let notifier = Arc::new(RecordingNotifier::default());
    let store = Arc::new(MemoryWatchlist::new(vec![WatchlistEntry::new("2330")]));
    let summary = AnalysisRunner::new(Arc::new(source), store, notifier)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.analyzed, 0);
    assert!(summary.failures[0].contains("Invalid price series"));
}

#[tokio::test]
async fn test_restart_does_not_repeat_reported_revenue() {
    let path = std::env::temp_dir().join(format!("trendwatch-{}-restart.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let seed = vec![WatchlistEntry::new("2330").with_name("TSMC"), WatchlistEntry::new("2317")];

    let notifier = Arc::new(RecordingNotifier::default());
    let first = {
        let store = Arc::new(SqliteWatchlist::open(&path, &seed).unwrap());
        runner(store, notifier.clone()).run().await.unwrap()
    };
    assert_eq!(first.revenue_updates, 1);

    // a fresh store over the same file, as after a process restart
    let store = Arc::new(SqliteWatchlist::open(&path, &seed).unwrap());
    let second = runner(store.clone(), notifier.clone()).run().await.unwrap();
    assert_eq!(second.revenue_updates, 0);
    assert!(!notifier.messages()[1].contains("[New monthly revenue]"));

    let entries = store.entries().await;
    assert_eq!(entries[0].last_revenue_period.as_deref(), Some("2025-10"));
    assert_eq!(entries[1].name.as_deref(), Some("Hon Hai"));

    drop(store);
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_estimates_only_for_new_revenue() {
    let estimates = Arc::new(FakeEstimates::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let runner = runner(watchlist(), notifier.clone()).with_estimates(estimates.clone());

    runner.run().await.unwrap();
    assert_eq!(estimates.asked(), vec!["2330 TSMC"]);

    let text = &notifier.messages()[0];
    let revenue = text.find("[New monthly revenue] (2025-10)").unwrap();
    let estimate = text.find("[Analyst EPS estimates]\n2025 EPS: 58.2 (raised)").unwrap();
    assert!(revenue < estimate);
    assert!(estimate < text.find("[2317 Hon Hai report]").unwrap());

    // the month is already reported on the second run
    runner.run().await.unwrap();
    assert_eq!(estimates.asked().len(), 1);
    assert!(!notifier.messages()[1].contains("[Analyst EPS estimates]"));
}

// =========================================================================
// HTTP
// =========================================================================

fn config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        finmind_token: None,
        line: None,
        gemini_api_key: None,
        database_path: ":memory:".to_string(),
        watchlist: vec![WatchlistEntry::new("2330")],
        market_indices: indices(),
        price_lookback_days: 180,
        max_concurrency: 2,
        http_timeout: Duration::from_secs(5),
        run_on_startup: false,
    }
}

fn state(notifier: Arc<RecordingNotifier>) -> trendwatch::AppState {
    trendwatch::AppState::new(Arc::new(config()), Arc::new(runner(watchlist(), notifier)))
}

fn app(notifier: Arc<RecordingNotifier>) -> axum::Router {
    trendwatch::app(state(notifier))
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = app(Arc::new(RecordingNotifier::default()))
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["watchlistSize"], 1);
}

#[tokio::test]
async fn test_run_endpoint_returns_summary() {
    let notifier = Arc::new(RecordingNotifier::default());
    let response = app(notifier.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/run")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["analyzed"], 2);
    assert_eq!(json["data"]["delivered"], true);
    assert_eq!(notifier.messages().len(), 1);
}

#[tokio::test]
async fn test_overlapping_run_is_conflict() {
    let notifier = Arc::new(RecordingNotifier::default());
    let state = state(notifier.clone());
    let _running = state.run_lock.lock().await;

    let response = trendwatch::app(state.clone())
        .oneshot(Request::builder().uri("/api/run").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], 409);
    assert!(notifier.messages().is_empty());
}
