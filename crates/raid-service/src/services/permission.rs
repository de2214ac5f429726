//! Permission service
//!
//! Caller checks for event commands: creator role, event ownership, guild
//! ownership.

use raid_core::{EventRecord, GuildConfig, Snowflake};
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::{Denial, ServiceResult};

pub struct PermissionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PermissionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Caller must hold the guild's creator role
    #[instrument(skip(self, config), fields(guild_id = %config.guild_id))]
    pub async fn require_creator(&self, config: &GuildConfig, user_id: Snowflake) -> ServiceResult<()> {
        let roles = self
            .ctx
            .platform()
            .member_roles(config.guild_id, user_id)
            .await?;
        if config.allows_creation(&roles) {
            Ok(())
        } else {
            debug!(user_id = %user_id, "Creator role missing");
            Err(Denial::MissingCreatorRole.into())
        }
    }

    pub fn require_event_owner(&self, record: &EventRecord, user_id: Snowflake) -> ServiceResult<()> {
        if record.is_owner(user_id) {
            Ok(())
        } else {
            Err(Denial::NotEventOwner.into())
        }
    }

    #[instrument(skip(self))]
    pub async fn is_guild_owner(&self, guild_id: Snowflake, user_id: Snowflake) -> ServiceResult<bool> {
        Ok(self.ctx.platform().guild_owner(guild_id).await? == user_id)
    }

    pub async fn require_guild_owner(&self, guild_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        if self.is_guild_owner(guild_id, user_id).await? {
            Ok(())
        } else {
            Err(Denial::NotGuildOwner.into())
        }
    }

    /// Record owner, or failing that the guild owner
    pub async fn require_event_or_guild_owner(
        &self,
        record: &EventRecord,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<()> {
        if record.is_owner(user_id) || self.is_guild_owner(guild_id, user_id).await? {
            Ok(())
        } else {
            Err(Denial::NotEventOwner.into())
        }
    }
}
