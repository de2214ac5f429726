//! Channel permission flags and overwrites
//!
//! Bit values follow the platform's permission bitfield so the bridge can pass
//! them through unchanged.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Snowflake;

bitflags! {
    /// Permission flags used in channel overwrites
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        const ADD_REACTIONS            = 1 << 6;
        const VIEW_CHANNEL             = 1 << 10;
        const SEND_MESSAGES            = 1 << 11;
        const MANAGE_MESSAGES          = 1 << 13;
        const EMBED_LINKS              = 1 << 14;
        const ATTACH_FILES             = 1 << 15;
        const READ_MESSAGE_HISTORY     = 1 << 16;
        const USE_EXTERNAL_EMOJIS      = 1 << 18;
        const USE_APPLICATION_COMMANDS = 1 << 31;
        const USE_EXTERNAL_STICKERS    = 1 << 37;

        /// What everyone may do in a visible event channel
        const EVENT_PARTICIPANT = Self::ADD_REACTIONS.bits()
            | Self::VIEW_CHANNEL.bits()
            | Self::SEND_MESSAGES.bits()
            | Self::EMBED_LINKS.bits()
            | Self::ATTACH_FILES.bits()
            | Self::READ_MESSAGE_HISTORY.bits()
            | Self::USE_EXTERNAL_EMOJIS.bits()
            | Self::USE_APPLICATION_COMMANDS.bits()
            | Self::USE_EXTERNAL_STICKERS.bits();

        /// What the bot and the event creator may do
        const EVENT_OWNER = Self::ADD_REACTIONS.bits()
            | Self::VIEW_CHANNEL.bits()
            | Self::SEND_MESSAGES.bits()
            | Self::MANAGE_MESSAGES.bits()
            | Self::ATTACH_FILES.bits()
            | Self::READ_MESSAGE_HISTORY.bits()
            | Self::USE_EXTERNAL_EMOJIS.bits()
            | Self::USE_APPLICATION_COMMANDS.bits()
            | Self::USE_EXTERNAL_STICKERS.bits();
    }
}

// Serialized as a decimal string, the platform's JSON representation
impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.bits())
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u64>()
            .map(Permissions::from_bits_truncate)
            .map_err(serde::de::Error::custom)
    }
}

/// Who an overwrite applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum OverwriteTarget {
    Role(Snowflake),
    Member(Snowflake),
}

/// A channel permission overwrite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    pub target: OverwriteTarget,
    pub allow: Permissions,
    pub deny: Permissions,
}

impl PermissionOverwrite {
    /// The everyone role shares its id with the guild
    pub fn everyone(guild_id: Snowflake, hidden: bool) -> Self {
        if hidden {
            Self {
                target: OverwriteTarget::Role(guild_id),
                allow: Permissions::empty(),
                deny: Permissions::VIEW_CHANNEL,
            }
        } else {
            Self {
                target: OverwriteTarget::Role(guild_id),
                allow: Permissions::EVENT_PARTICIPANT,
                deny: Permissions::empty(),
            }
        }
    }

    pub fn owner(member_id: Snowflake) -> Self {
        Self {
            target: OverwriteTarget::Member(member_id),
            allow: Permissions::EVENT_OWNER,
            deny: Permissions::empty(),
        }
    }

    /// Full access on a category for the bot itself
    pub fn allow_all(member_id: Snowflake) -> Self {
        Self {
            target: OverwriteTarget::Member(member_id),
            allow: Permissions::all(),
            deny: Permissions::empty(),
        }
    }

    #[inline]
    pub fn hides(&self) -> bool {
        self.deny.contains(Permissions::VIEW_CHANNEL)
    }
}
