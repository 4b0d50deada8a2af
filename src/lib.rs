//! trendwatch - daily technical and fundamental reports for Taiwan stocks

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use std::sync::Arc;

use axum::Router;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use config::Config;
use services::AnalysisRunner;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub runner: Arc<AnalysisRunner>,
    /// Held for the duration of a run.
    pub run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Arc<Config>, runner: Arc<AnalysisRunner>) -> Self {
        Self {
            config,
            runner,
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Build the HTTP application.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
