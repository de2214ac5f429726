//! Chat platform port
//!
//! Everything the bot asks of the chat platform. Implementations own the wire
//! protocol; the domain only sees these calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::{ChannelRef, MessageRef, OutgoingMessage, Reply};
use crate::error::PlatformError;
use crate::value_objects::{PermissionOverwrite, Snowflake};

/// Result type for platform calls
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Handle used to answer an interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionHandle {
    pub id: Snowflake,
    pub token: String,
}

/// Parameters of a new text channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChannel {
    pub name: String,
    pub parent_id: Snowflake,
    pub position: i32,
    pub overwrites: Vec<PermissionOverwrite>,
}

/// A channel modification; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

impl ChannelEdit {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            position: None,
        }
    }

    pub fn move_to(position: i32) -> Self {
        Self {
            name: None,
            position: Some(position),
        }
    }
}

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// The bot's own user id
    fn bot_user_id(&self) -> Snowflake;

    // ========================================================================
    // Guilds and members
    // ========================================================================

    /// Guilds the bot belongs to
    async fn guild_ids(&self) -> PlatformResult<Vec<Snowflake>>;

    async fn guild_owner(&self, guild_id: Snowflake) -> PlatformResult<Snowflake>;

    /// Display name of a guild member, `None` if the user is not a member
    async fn member_display_name(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> PlatformResult<Option<String>>;

    async fn member_roles(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> PlatformResult<Vec<Snowflake>>;

    // ========================================================================
    // Channels
    // ========================================================================

    /// All channels of a guild, categories included
    async fn guild_channels(&self, guild_id: Snowflake) -> PlatformResult<Vec<ChannelRef>>;

    async fn create_category(&self, guild_id: Snowflake, name: &str) -> PlatformResult<ChannelRef>;

    async fn create_channel(
        &self,
        guild_id: Snowflake,
        channel: NewChannel,
    ) -> PlatformResult<ChannelRef>;

    async fn modify_channel(&self, channel_id: Snowflake, edit: ChannelEdit) -> PlatformResult<()>;

    async fn delete_channel(&self, channel_id: Snowflake) -> PlatformResult<()>;

    /// Add or replace the overwrite for the overwrite's target
    async fn set_permission_overwrite(
        &self,
        channel_id: Snowflake,
        overwrite: PermissionOverwrite,
    ) -> PlatformResult<()>;

    // ========================================================================
    // Messages
    // ========================================================================

    async fn send_message(
        &self,
        channel_id: Snowflake,
        message: OutgoingMessage,
    ) -> PlatformResult<MessageRef>;

    async fn edit_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        message: OutgoingMessage,
    ) -> PlatformResult<()>;

    async fn pin_message(&self, channel_id: Snowflake, message_id: Snowflake) -> PlatformResult<()>;

    async fn pinned_messages(&self, channel_id: Snowflake) -> PlatformResult<Vec<MessageRef>>;

    // ========================================================================
    // Interactions
    // ========================================================================

    /// Acknowledge an interaction; the answer follows later
    async fn defer(&self, interaction: &InteractionHandle) -> PlatformResult<()>;

    /// Ephemeral answer: an initial response or a follow-up, whichever applies
    async fn reply(&self, interaction: &InteractionHandle, reply: Reply) -> PlatformResult<()>;
}
