//! Channel reference - the platform's view of a guild channel

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Channel kind, limited to what event placement cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Guild text channel
    #[default]
    Text,
    /// Category grouping other channels
    Category,
}

/// A guild channel as listed by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: Snowflake,
    pub name: String,
    pub position: i32,
    #[serde(default)]
    pub parent_id: Option<Snowflake>,
    #[serde(default)]
    pub kind: ChannelKind,
}

impl ChannelRef {
    /// Create a text channel reference
    pub fn text(id: Snowflake, name: impl Into<String>, position: i32, parent_id: Option<Snowflake>) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            parent_id,
            kind: ChannelKind::Text,
        }
    }

    /// Create a category reference
    pub fn category(id: Snowflake, name: impl Into<String>, position: i32) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            parent_id: None,
            kind: ChannelKind::Category,
        }
    }

    #[inline]
    pub fn is_category(&self) -> bool {
        self.kind == ChannelKind::Category
    }

    /// Whether this channel sits directly under the given category
    #[inline]
    pub fn is_child_of(&self, category_id: Snowflake) -> bool {
        self.parent_id == Some(category_id)
    }
}
