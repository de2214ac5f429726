//! # raid-bot
//!
//! The bot process: an Axum server for health checks and interaction ingress,
//! a client for the chat platform bridge, and the startup and shutdown
//! sequence that wires store, queue, worker, and scheduler together.

pub mod app;
pub mod bridge;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use app::run;
pub use bridge::BridgePlatform;
pub use state::AppState;
