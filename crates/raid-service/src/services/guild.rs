//! Guild service
//!
//! Guild configuration: which category holds event channels and which role
//! may create events.

use raid_core::{
    custom_id, Button, ButtonStyle, ChannelRef, EventStoreExt, GuildConfig, OutgoingMessage,
    PermissionOverwrite, Reply, Snowflake,
};
use tracing::{info, instrument};

use crate::dto::ConfigureRequest;

use super::context::{Caller, ServiceContext};
use super::error::{ServiceError, ServiceResult};

pub struct GuildService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> GuildService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Find or create the category, save the config, and grant the bot full
    /// access on the category. Ownership is checked by the caller.
    #[instrument(skip(self, caller, request), fields(guild_id = %caller.guild_id, category = %request.category))]
    pub async fn configure(&self, caller: &Caller, request: ConfigureRequest) -> ServiceResult<Reply> {
        let platform = self.ctx.platform();
        let category = match self.find_category(caller.guild_id, &request.category).await? {
            Some(category) => category,
            None => {
                info!("Creating event category");
                platform
                    .create_category(caller.guild_id, &request.category)
                    .await?
            }
        };

        let config = GuildConfig::new(caller.guild_id, category.id, request.role_id);
        self.ctx.store().save(caller.guild_id, &config).await?;

        platform
            .set_permission_overwrite(category.id, PermissionOverwrite::allow_all(self.ctx.bot_user_id()))
            .await?;

        if request.button {
            platform
                .send_message(caller.channel_id, new_event_buttons())
                .await?;
        }

        info!(category_id = %category.id, role_id = %request.role_id, "Guild configured");
        Ok(Reply::text("Configuration saved!"))
    }

    async fn find_category(&self, guild_id: Snowflake, name: &str) -> ServiceResult<Option<ChannelRef>> {
        let wanted = name.to_lowercase();
        Ok(self
            .ctx
            .platform()
            .guild_channels(guild_id)
            .await?
            .into_iter()
            .find(|c| c.is_category() && c.name.to_lowercase() == wanted))
    }

    pub async fn find_config(&self, guild_id: Snowflake) -> ServiceResult<Option<GuildConfig>> {
        Ok(self.ctx.store().load::<GuildConfig>(guild_id).await?)
    }

    pub async fn require_config(&self, guild_id: Snowflake) -> ServiceResult<GuildConfig> {
        self.find_config(guild_id)
            .await?
            .ok_or(ServiceError::NotConfigured)
    }
}

/// The "start a new event" affordance posted by `configure`
pub fn new_event_buttons() -> OutgoingMessage {
    OutgoingMessage {
        components: vec![
            Button::new("Start A New Raid", custom_id::NEW_EVENT, ButtonStyle::Primary).in_row(0),
            Button::new("Start A Hidden Raid", custom_id::NEW_HIDDEN_EVENT, ButtonStyle::Secondary)
                .in_row(1),
        ],
        ..OutgoingMessage::text("Raids:")
    }
}
