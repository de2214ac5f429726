//! Domain errors - validation failures and collaborator port errors

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("The name parameter is not valid. Names can only contain letters, numbers, and spaces.")]
    InvalidName,

    #[error("The date parameter is not a valid date.")]
    InvalidDate,

    #[error("The time parameter is not a valid time of day.")]
    InvalidTime,

    #[error("The date and time is in the past!")]
    DateInPast,

    #[error("Class is not valid.")]
    InvalidClass(String),

    #[error("Role is not valid.")]
    InvalidRole(String),

    #[error("Character names can be at most 12 characters.")]
    InvalidCharacterName,

    #[error("The category name must be 1-100 characters.")]
    InvalidCategoryName,
}

impl DomainError {
    /// Get an error code string for logs and HTTP responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidName => "INVALID_NAME",
            Self::InvalidDate => "INVALID_DATE",
            Self::InvalidTime => "INVALID_TIME",
            Self::DateInPast => "DATE_IN_PAST",
            Self::InvalidClass(_) => "INVALID_CLASS",
            Self::InvalidRole(_) => "INVALID_ROLE",
            Self::InvalidCharacterName => "INVALID_CHARACTER_NAME",
            Self::InvalidCategoryName => "INVALID_CATEGORY_NAME",
        }
    }

    /// Every domain error is a validation failure today
    pub fn is_validation(&self) -> bool {
        true
    }
}

/// Event store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Chat platform failures
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Platform request failed: {0}")]
    Request(String),

    #[error("Platform rejected {operation}: {status} {message}")]
    Rejected {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("Unknown {0}")]
    NotFound(&'static str),

    #[error("Unexpected platform response: {0}")]
    Decode(String),
}

impl PlatformError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
            || matches!(self, Self::Rejected { status: 404, .. })
    }
}
