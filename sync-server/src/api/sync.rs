//! Sync trigger entrypoints
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /sync | POST | run now |
//! | /sync/stop | POST | stop the in-flight run |
//! | /sync/periodic/start | POST | arm the periodic trigger |
//! | /sync/periodic/stop | POST | disarm the periodic trigger |
//! | /sync/status | GET | supervisor status snapshot |
//!
//! Triggering while a run is in progress is not an error: the request
//! is accepted and silently ignored by the supervisor.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::core::ServerState;
use crate::sync::SyncStatus;
use crate::utils::{ok, ok_with_message, AppResponse, AppResult};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/sync", post(trigger_sync))
        .route("/sync/stop", post(stop_sync))
        .route("/sync/periodic/start", post(start_periodic))
        .route("/sync/periodic/stop", post(stop_periodic))
        .route("/sync/status", get(status))
}

async fn trigger_sync(State(state): State<ServerState>) -> AppResult<Json<AppResponse<()>>> {
    state.supervisor.request_run()?;
    Ok(ok_with_message((), "Sync requested"))
}

async fn stop_sync(State(state): State<ServerState>) -> AppResult<Json<AppResponse<()>>> {
    state.supervisor.stop_run()?;
    Ok(ok_with_message((), "Stop requested"))
}

async fn start_periodic(State(state): State<ServerState>) -> AppResult<Json<AppResponse<()>>> {
    state.supervisor.start_periodic()?;
    Ok(ok_with_message((), "Periodic sync armed"))
}

async fn stop_periodic(State(state): State<ServerState>) -> AppResult<Json<AppResponse<()>>> {
    state.supervisor.stop_periodic()?;
    Ok(ok_with_message((), "Periodic sync disarmed"))
}

async fn status(State(state): State<ServerState>) -> Json<AppResponse<SyncStatus>> {
    ok(state.supervisor.status())
}
