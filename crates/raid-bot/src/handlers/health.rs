//! Liveness endpoints
//!
//! The bot has no web UI; these exist so a host or orchestrator can tell the
//! process is up.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use raid_service::dto::HealthResponse;

use crate::state::AppState;

/// GET /
pub async fn root() -> String {
    format!("Response created at {}", Utc::now())
}

/// GET /ping
pub async fn ping() -> &'static str {
    "pong"
}

/// GET /health
///
/// 503 once the command queue has closed, which only happens on shutdown.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let queue_open = !state.service_context().queue().is_closed();
    let status = if queue_open {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if queue_open { "healthy" } else { "stopping" },
            version: env!("CARGO_PKG_VERSION"),
            store: state.config().store.backend.as_str(),
            queue_open,
        }),
    )
}
