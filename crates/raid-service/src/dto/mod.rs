//! Data transfer objects for command payloads and HTTP responses

pub mod requests;
pub mod responses;

pub use requests::{
    ConfigureRequest, CreateEventRequest, JoinFormRequest, SignupRequest, UpdateEventRequest,
};
pub use responses::{HealthResponse, QueuedResponse};
