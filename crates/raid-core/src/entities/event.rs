//! Event record - one per event channel

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::member::Roster;
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Longest event name that still fits a channel name with prefix and date
pub const MAX_EVENT_NAME_LEN: usize = 93;

/// The persisted state of one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub name: String,
    /// Start time, carrying the server offset in effect at that instant
    pub date: DateTime<FixedOffset>,
    pub owner_id: Snowflake,
    #[serde(default)]
    pub members: Roster,
    #[serde(default)]
    pub declaration_message_id: Option<Snowflake>,
}

impl EventRecord {
    /// A fresh event: no members, declaration not posted yet
    pub fn new(name: String, date: DateTime<FixedOffset>, owner_id: Snowflake) -> Self {
        Self {
            name,
            date,
            owner_id,
            members: Roster::new(),
            declaration_message_id: None,
        }
    }

    #[inline]
    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.owner_id == user_id
    }

    /// An event expires once its start is more than `expiry` in the past
    pub fn is_expired(&self, now: DateTime<Utc>, expiry: Duration) -> bool {
        self.date < now - expiry
    }

    /// Whether the start time lies in the past
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.date < now
    }
}

/// Event names are 1 to 93 ASCII letters, digits, and spaces
pub fn validate_event_name(name: &str) -> Result<(), DomainError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_EVENT_NAME_LEN
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ');
    if valid {
        Ok(())
    } else {
        Err(DomainError::InvalidName)
    }
}
