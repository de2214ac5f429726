//! Response DTOs for the HTTP surface

use serde::Serialize;

/// A command was accepted; its answer goes back through the platform
#[derive(Debug, Clone, Serialize)]
pub struct QueuedResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<u64>,
}

impl QueuedResponse {
    pub fn queued(task_id: u64) -> Self {
        Self {
            status: "queued",
            task_id: Some(task_id),
        }
    }

    /// Answered inline without touching the queue
    pub fn answered() -> Self {
        Self {
            status: "answered",
            task_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store: &'static str,
    pub queue_open: bool,
}
