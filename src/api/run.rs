//! Manual analysis trigger.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::info;

use crate::error::{AppError, Result};
use crate::types::RunSummary;
use crate::AppState;

/// API response wrapper.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Create the run router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(trigger_run).post(trigger_run))
}

/// Run one analysis and return its summary.
///
/// Overlapping requests get a 409 while a run is in flight.
async fn trigger_run(State(state): State<AppState>) -> Result<Json<ApiResponse<RunSummary>>> {
    let _guard = state
        .run_lock
        .try_lock()
        .map_err(|_| AppError::Conflict("An analysis run is already in progress".to_string()))?;

    info!("Analysis run requested");
    let summary = state.runner.run().await?;
    Ok(Json(ApiResponse { data: summary }))
}
