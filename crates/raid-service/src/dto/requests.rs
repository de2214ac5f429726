//! Request DTOs for commands
//!
//! Event names are checked with `validator`; dates and times are parsed by
//! the services against the server timezone.

use raid_core::{validate_event_name, CharacterClass, DomainError, PlayerRole, Snowflake};
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError};

fn event_name_chars(name: &str) -> Result<(), ValidationError> {
    validate_event_name(name).map_err(|_| ValidationError::new("event_name"))
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Blank strings mean "not given"
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

// ============================================================================
// Event Requests
// ============================================================================

/// `create(name, date, time, hidden)`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(
        length(min = 1, max = 93, message = "Names must be 1-93 characters"),
        custom(function = "event_name_chars")
    )]
    pub name: String,

    pub date: String,

    pub time: String,

    #[serde(default)]
    pub hidden: bool,
}

impl CreateEventRequest {
    /// Name rules as a domain error
    pub fn check_name(&self) -> Result<(), DomainError> {
        self.validate().map_err(|_| DomainError::InvalidName)
    }
}

/// `update(name?, date?, time?)`; absent and blank fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(
        length(min = 1, max = 93, message = "Names must be 1-93 characters"),
        custom(function = "event_name_chars")
    )]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub date: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub time: Option<String>,
}

impl UpdateEventRequest {
    pub fn check_name(&self) -> Result<(), DomainError> {
        self.validate().map_err(|_| DomainError::InvalidName)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.date.is_none() && self.time.is_none()
    }
}

// ============================================================================
// Roster Requests
// ============================================================================

/// A signup as chosen from the command's option lists
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignupRequest {
    pub class: CharacterClass,
    pub role: PlayerRole,
    /// Character name, optional
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
}

/// The free-text join form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JoinFormRequest {
    #[validate(length(max = 10))]
    pub role: String,

    #[validate(length(max = 12))]
    pub class: String,

    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 12))]
    pub name: Option<String>,
}

impl JoinFormRequest {
    /// Lenient parse: class first, then role
    pub fn parse(self) -> Result<SignupRequest, DomainError> {
        if let Err(errors) = self.validate() {
            let fields = errors.field_errors();
            return Err(if fields.contains_key("class") {
                DomainError::InvalidClass(self.class)
            } else if fields.contains_key("role") {
                DomainError::InvalidRole(self.role)
            } else {
                DomainError::InvalidCharacterName
            });
        }

        let class = self
            .class
            .parse::<CharacterClass>()
            .map_err(|e| DomainError::InvalidClass(e.0))?;
        let role = self
            .role
            .parse::<PlayerRole>()
            .map_err(|e| DomainError::InvalidRole(e.0))?;
        Ok(SignupRequest {
            class,
            role,
            name: self.name,
        })
    }
}

// ============================================================================
// Guild Requests
// ============================================================================

/// `configure(category, role, button)`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConfigureRequest {
    #[validate(
        length(min = 1, max = 100, message = "Category name must be 1-100 characters"),
        custom(function = "not_blank")
    )]
    pub category: String,

    pub role_id: Snowflake,

    #[serde(default)]
    pub button: bool,
}

impl ConfigureRequest {
    pub fn check_category(&self) -> Result<(), DomainError> {
        self.validate().map_err(|_| DomainError::InvalidCategoryName)
    }
}
