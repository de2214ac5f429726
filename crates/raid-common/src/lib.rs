//! # raid-common
//!
//! Shared utilities: configuration, application errors, and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    AppConfig, AppSettings, ConfigError, Environment, MaintenanceMode, PlatformConfig,
    ScheduleConfig, ServerConfig, StoreBackend, StoreConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
