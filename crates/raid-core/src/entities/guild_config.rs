//! Guild configuration - where events live and who may create them

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Per-guild settings written by the configure command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildConfig {
    pub guild_id: Snowflake,
    /// Category that holds the event channels
    pub category_id: Snowflake,
    /// Role required to create or update events
    pub creator_role_id: Snowflake,
}

impl GuildConfig {
    pub fn new(guild_id: Snowflake, category_id: Snowflake, creator_role_id: Snowflake) -> Self {
        Self {
            guild_id,
            category_id,
            creator_role_id,
        }
    }

    /// Whether a member's role list grants event creation
    pub fn allows_creation(&self, member_roles: &[Snowflake]) -> bool {
        member_roles.contains(&self.creator_role_id)
    }
}
