//! Live settings routes
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /settings | GET | current sync settings |
//! | /settings | PUT | partial update; supervisor reacts immediately |

use axum::{extract::State, routing::get, Json, Router};
use shared::sync::{SettingsPatch, SyncSettings};

use crate::core::ServerState;
use crate::utils::{ok, AppResponse};

pub fn router() -> Router<ServerState> {
    Router::new().route("/settings", get(get_settings).put(put_settings))
}

async fn get_settings(State(state): State<ServerState>) -> Json<AppResponse<SyncSettings>> {
    ok(state.settings.current())
}

async fn put_settings(
    State(state): State<ServerState>,
    Json(patch): Json<SettingsPatch>,
) -> Json<AppResponse<SyncSettings>> {
    let updated = state.settings.apply(patch);
    ok(updated)
}
