//! Interaction ingress
//!
//! The gateway bridge forwards every slash command, button press, and form
//! submission here. Validation failures and permission denials are answered
//! inline through the platform; everything else is queued.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use raid_service::dto::QueuedResponse;
use raid_service::{Dispatched, Invocation};
use tracing::debug;

use crate::response::{Accepted, ApiResult};
use crate::state::AppState;

/// POST /interactions
pub async fn receive(
    State(state): State<AppState>,
    payload: Result<Json<Invocation>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(invocation) = payload?;
    debug!(command = invocation.command.name(), "Interaction received");

    match state.dispatcher().dispatch(invocation).await? {
        Dispatched::Queued { task_id } => Ok(Accepted(QueuedResponse::queued(task_id)).into_response()),
        Dispatched::Answered => Ok((StatusCode::OK, Json(QueuedResponse::answered())).into_response()),
    }
}
