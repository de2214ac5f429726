//! Chat platform bridge client
//!
//! The bridge sidecar owns the platform connection. Each port call is a JSON
//! `POST {bridge_url}/{operation}`; the response body is the call's result.

use std::time::Duration;

use async_trait::async_trait;
use raid_common::PlatformConfig;
use raid_core::{
    ChannelEdit, ChannelRef, ChatPlatform, InteractionHandle, MessageRef, NewChannel,
    OutgoingMessage, PermissionOverwrite, PlatformError, PlatformResult, Reply, Snowflake,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone)]
pub struct BridgePlatform {
    client: reqwest::Client,
    base_url: String,
    bot_user_id: Snowflake,
}

impl BridgePlatform {
    pub fn new(base_url: impl Into<String>, bot_user_id: Snowflake, timeout: Duration) -> PlatformResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlatformError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bot_user_id,
        })
    }

    pub fn from_config(config: &PlatformConfig) -> PlatformResult<Self> {
        Self::new(&config.bridge_url, config.bot_user_id, config.request_timeout())
    }

    fn url(&self, operation: &str) -> String {
        format!("{}/{operation}", self.base_url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        body: &B,
    ) -> PlatformResult<reqwest::Response> {
        let response = self
            .client
            .post(self.url(operation))
            .json(body)
            .send()
            .await
            .map_err(|e| PlatformError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        warn!(operation, status = status.as_u16(), message = %message, "Bridge rejected call");
        Err(PlatformError::Rejected {
            operation,
            status: status.as_u16(),
            message,
        })
    }

    /// Call an operation and decode its result
    async fn call<B, R>(&self, operation: &'static str, body: &B) -> PlatformResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(operation, body)
            .await?
            .json::<R>()
            .await
            .map_err(|e| PlatformError::Decode(format!("{operation}: {e}")))
    }

    /// Call an operation that returns nothing
    async fn call_unit<B: Serialize + ?Sized>(&self, operation: &'static str, body: &B) -> PlatformResult<()> {
        self.send(operation, body).await?;
        debug!(operation, "Bridge call done");
        Ok(())
    }
}

#[async_trait]
impl ChatPlatform for BridgePlatform {
    fn bot_user_id(&self) -> Snowflake {
        self.bot_user_id
    }

    #[instrument(skip(self))]
    async fn guild_ids(&self) -> PlatformResult<Vec<Snowflake>> {
        self.call("guilds", &json!({})).await
    }

    #[instrument(skip(self))]
    async fn guild_owner(&self, guild_id: Snowflake) -> PlatformResult<Snowflake> {
        self.call("guild_owner", &json!({ "guild_id": guild_id })).await
    }

    async fn member_display_name(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> PlatformResult<Option<String>> {
        self.call(
            "member_display_name",
            &json!({ "guild_id": guild_id, "user_id": user_id }),
        )
        .await
    }

    async fn member_roles(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> PlatformResult<Vec<Snowflake>> {
        self.call(
            "member_roles",
            &json!({ "guild_id": guild_id, "user_id": user_id }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn guild_channels(&self, guild_id: Snowflake) -> PlatformResult<Vec<ChannelRef>> {
        self.call("guild_channels", &json!({ "guild_id": guild_id }))
            .await
    }

    #[instrument(skip(self))]
    async fn create_category(&self, guild_id: Snowflake, name: &str) -> PlatformResult<ChannelRef> {
        self.call(
            "create_category",
            &json!({ "guild_id": guild_id, "name": name }),
        )
        .await
    }

    #[instrument(skip(self, channel), fields(name = %channel.name))]
    async fn create_channel(
        &self,
        guild_id: Snowflake,
        channel: NewChannel,
    ) -> PlatformResult<ChannelRef> {
        self.call(
            "create_channel",
            &json!({ "guild_id": guild_id, "channel": channel }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn modify_channel(&self, channel_id: Snowflake, edit: ChannelEdit) -> PlatformResult<()> {
        self.call_unit(
            "modify_channel",
            &json!({ "channel_id": channel_id, "edit": edit }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete_channel(&self, channel_id: Snowflake) -> PlatformResult<()> {
        self.call_unit("delete_channel", &json!({ "channel_id": channel_id }))
            .await
    }

    async fn set_permission_overwrite(
        &self,
        channel_id: Snowflake,
        overwrite: PermissionOverwrite,
    ) -> PlatformResult<()> {
        self.call_unit(
            "set_permission_overwrite",
            &json!({ "channel_id": channel_id, "overwrite": overwrite }),
        )
        .await
    }

    async fn send_message(
        &self,
        channel_id: Snowflake,
        message: OutgoingMessage,
    ) -> PlatformResult<MessageRef> {
        self.call(
            "send_message",
            &json!({ "channel_id": channel_id, "message": message }),
        )
        .await
    }

    async fn edit_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        message: OutgoingMessage,
    ) -> PlatformResult<()> {
        self.call_unit(
            "edit_message",
            &json!({ "channel_id": channel_id, "message_id": message_id, "message": message }),
        )
        .await
    }

    async fn pin_message(&self, channel_id: Snowflake, message_id: Snowflake) -> PlatformResult<()> {
        self.call_unit(
            "pin_message",
            &json!({ "channel_id": channel_id, "message_id": message_id }),
        )
        .await
    }

    async fn pinned_messages(&self, channel_id: Snowflake) -> PlatformResult<Vec<MessageRef>> {
        self.call("pinned_messages", &json!({ "channel_id": channel_id }))
            .await
    }

    async fn defer(&self, interaction: &InteractionHandle) -> PlatformResult<()> {
        self.call_unit("defer", &json!({ "interaction": interaction }))
            .await
    }

    async fn reply(&self, interaction: &InteractionHandle, reply: Reply) -> PlatformResult<()> {
        self.call_unit(
            "reply",
            &json!({ "interaction": interaction, "reply": reply }),
        )
        .await
    }
}
