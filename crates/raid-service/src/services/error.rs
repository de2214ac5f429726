//! Service layer error types
//!
//! Validation, authorization, and lookup failures are answered to the invoker
//! verbatim. Store and platform failures are transient: the invoker gets a
//! generic message and the worker logs the cause.

use raid_common::AppError;
use raid_core::{DomainError, PlatformError, StoreError};
use thiserror::Error;

use crate::queue::QueueClosed;

/// Generic answer for anything that went wrong outside the caller's control
pub const SOMETHING_WENT_WRONG: &str = ":x: Something went wrong...";

/// Why a caller may not perform an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("You are not the owner of this raid channel.")]
    NotEventOwner,

    #[error("You do not have permission to use this command.")]
    MissingCreatorRole,

    #[error("Only the server owner can execute this command!")]
    NotGuildOwner,
}

/// Service layer error type
#[derive(Debug, Error)]
pub enum ServiceError {
    // =========================================================================
    // Answered to the invoker
    // =========================================================================
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Unauthorized(#[from] Denial),

    #[error("The guild has not been configured yet.")]
    NotConfigured,

    #[error("This channel is not a raid channel.")]
    NotAnEventChannel,

    // =========================================================================
    // Transient
    // =========================================================================
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Command queue is closed")]
    QueueClosed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<QueueClosed> for ServiceError {
    fn from(_: QueueClosed) -> Self {
        Self::QueueClosed
    }
}

impl ServiceError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Store, platform, and plumbing failures
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::Platform(_) | Self::QueueClosed | Self::Internal(_)
        )
    }

    /// Text shown to the invoker
    pub fn user_message(&self) -> String {
        if self.is_transient() {
            SOMETHING_WENT_WRONG.to_string()
        } else {
            self.to_string()
        }
    }

    /// Get the error code for logs and API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::Unauthorized(Denial::NotEventOwner) => "NOT_EVENT_OWNER",
            Self::Unauthorized(Denial::MissingCreatorRole) => "MISSING_CREATOR_ROLE",
            Self::Unauthorized(Denial::NotGuildOwner) => "NOT_GUILD_OWNER",
            Self::NotConfigured => "NOT_CONFIGURED",
            Self::NotAnEventChannel => "NOT_AN_EVENT_CHANNEL",
            Self::Store(_) => "STORE_ERROR",
            Self::Platform(_) => "PLATFORM_ERROR",
            Self::QueueClosed => "QUEUE_CLOSED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::Store(e) => AppError::Store(e),
            ServiceError::Platform(e) => AppError::Platform(e),
            ServiceError::QueueClosed => AppError::Unavailable("Command queue is closed".into()),
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
