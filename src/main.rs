use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trendwatch::config::Config;
use trendwatch::services::{AnalysisRunner, LineNotifier, LogNotifier, Notifier, SqliteWatchlist};
use trendwatch::sources::{EstimateSource, FinMindClient, GeminiEstimates, NoEstimates};
use trendwatch::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trendwatch=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting trendwatch on {}:{}", config.host, config.port);
    info!(
        "Watchlist: {:?}",
        config.watchlist.iter().map(|e| e.symbol.as_str()).collect::<Vec<_>>()
    );

    let source = Arc::new(FinMindClient::new(config.finmind_token.clone(), config.http_timeout)?);
    if config.finmind_token.is_none() {
        info!("FINMIND_API_TOKEN not set, using anonymous FinMind access");
    }

    let notifier: Arc<dyn Notifier> = match &config.line {
        Some(line) => Arc::new(LineNotifier::new(
            line.access_token.clone(),
            line.user_id.clone(),
            config.http_timeout,
        )?),
        None => {
            info!("LINE credentials not set, reports will be logged");
            Arc::new(LogNotifier)
        }
    };

    let estimates: Arc<dyn EstimateSource> = match &config.gemini_api_key {
        Some(key) => Arc::new(GeminiEstimates::new(key.clone(), config.http_timeout)?),
        None => {
            info!("GEMINI_API_KEY not set, analyst estimates disabled");
            Arc::new(NoEstimates)
        }
    };

    let store = Arc::new(SqliteWatchlist::open(&config.database_path, &config.watchlist)?);

    let runner = Arc::new(
        AnalysisRunner::new(source, store, notifier)
            .with_estimates(estimates)
            .with_indices(config.market_indices.clone())
            .with_lookback_days(config.price_lookback_days)
            .with_max_concurrency(config.max_concurrency),
    );

    let state = AppState::new(config.clone(), runner);

    if config.run_on_startup {
        let state = state.clone();
        tokio::spawn(async move {
            let _guard = state.run_lock.lock().await;
            match state.runner.run().await {
                Ok(summary) => info!(
                    "Startup run done: {} analyzed, {} failed",
                    summary.analyzed,
                    summary.failures.len()
                ),
                Err(e) => error!("Startup run failed: {}", e),
            }
        });
    }

    let app = trendwatch::app(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("trendwatch listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
