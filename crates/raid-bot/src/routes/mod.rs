//! Route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{health, interactions};
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .route("/interactions", post(interactions::receive))
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/ping", get(health::ping))
        .route("/health", get(health::health_check))
}
