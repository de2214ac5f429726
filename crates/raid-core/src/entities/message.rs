//! Message payloads exchanged with the chat platform
//!
//! These carry data only; the platform adapter turns them into its own wire
//! format.

use serde::{Deserialize, Serialize};

use super::member::{CharacterClass, PlayerRole};
use crate::value_objects::Snowflake;

/// Custom ids of the interactive components the bot posts
pub mod custom_id {
    pub const JOIN: &str = "raidjoin";
    pub const LEAVE: &str = "raidleave";
    pub const NEW_EVENT: &str = "newraid:s";
    pub const NEW_HIDDEN_EVENT: &str = "newraid:h";
    pub const JOIN_FORM: &str = "raidjoin_respond";
    pub const NEW_EVENT_FORM: &str = "newraid_s";
    pub const NEW_HIDDEN_EVENT_FORM: &str = "newraid_h";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    #[default]
    Primary,
    Secondary,
    Danger,
}

/// A clickable button; `row` groups buttons into action rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub custom_id: String,
    pub style: ButtonStyle,
    #[serde(default)]
    pub row: u8,
}

impl Button {
    pub fn new(label: impl Into<String>, custom_id: impl Into<String>, style: ButtonStyle) -> Self {
        Self {
            label: label.into(),
            custom_id: custom_id.into(),
            style,
            row: 0,
        }
    }

    #[must_use]
    pub fn in_row(mut self, row: u8) -> Self {
        self.row = row;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub fields: Vec<EmbedField>,
}

impl Embed {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}

/// A message to post or an edit to apply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Button>,
    /// Only these users are pinged; an empty list pings nobody
    #[serde(default)]
    pub allowed_mentions: Vec<Snowflake>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn mentioning(mut self, user_id: Snowflake) -> Self {
        self.allowed_mentions.push(user_id);
        self
    }
}

/// A message as listed by the platform (pinned-message lookups)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: Snowflake,
    pub author_id: Snowflake,
    #[serde(default)]
    pub pinned: bool,
}

/// Values shown in the join form when a member updates their signup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinPrefill {
    pub role: Option<PlayerRole>,
    pub class: Option<CharacterClass>,
    pub character_name: Option<String>,
}

/// Ephemeral answer to an interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    /// Text visible only to the invoker
    Text {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        components: Vec<Button>,
    },
    /// Open the join form
    JoinForm { prefill: JoinPrefill },
    /// Open the new-event form
    NewEventForm { hidden: bool },
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
            components: Vec::new(),
        }
    }

    /// Text content, if this is a text reply
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Text { content, .. } => Some(content),
            _ => None,
        }
    }
}
