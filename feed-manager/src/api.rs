//! Feed manager HTTP API.
//!
//! Exposes `GET /api/scheduler`: refresh state machine position, cycle
//! counters and per-source poll statistics.

use axum::{extract::State, response::Json, routing::get, Router};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::scheduler::SchedulerStatus;

/// Shared state for the scheduler API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub status: Arc<Mutex<SchedulerStatus>>,
}

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/scheduler", get(get_scheduler_status))
        .with_state(state)
}

/// GET /api/scheduler - Current scheduler status
async fn get_scheduler_status(State(state): State<ApiState>) -> Json<SchedulerStatus> {
    Json(state.status.lock().await.clone())
}
