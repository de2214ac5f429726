//! In-memory chat platform and clock
//!
//! The fake platform keeps guilds, channels, and messages in one locked state
//! and records every interaction answer, so tests can assert on both the
//! resulting guild layout and what the invoker saw.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use raid_core::{
    ChannelEdit, ChannelRef, ChatPlatform, Clock, InteractionHandle, MessageRef, NewChannel,
    OutgoingMessage, PermissionOverwrite, PlatformError, PlatformResult, Reply, Snowflake,
};

/// A message the bot posted
#[derive(Debug, Clone)]
pub struct PostedMessage {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub message: OutgoingMessage,
    pub pinned: bool,
}

#[derive(Debug, Default)]
struct PlatformState {
    guilds: Vec<Snowflake>,
    owners: HashMap<Snowflake, Snowflake>,
    roles: HashMap<(Snowflake, Snowflake), Vec<Snowflake>>,
    display_names: HashMap<(Snowflake, Snowflake), String>,
    /// (guild, channel)
    channels: Vec<(Snowflake, ChannelRef)>,
    messages: Vec<PostedMessage>,
    overwrites: Vec<(Snowflake, PermissionOverwrite)>,
    defers: Vec<InteractionHandle>,
    replies: Vec<(InteractionHandle, Reply)>,
    deleted: Vec<Snowflake>,
    failing: HashSet<&'static str>,
    panicking: HashSet<&'static str>,
}

#[derive(Debug)]
pub struct FakePlatform {
    bot_user_id: Snowflake,
    next_id: AtomicU64,
    state: Mutex<PlatformState>,
}

impl FakePlatform {
    pub fn new(bot_user_id: Snowflake) -> Self {
        Self {
            bot_user_id,
            next_id: AtomicU64::new(10_000),
            state: Mutex::new(PlatformState::default()),
        }
    }

    fn allocate(&self) -> Snowflake {
        Snowflake::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn check(&self, operation: &'static str) -> PlatformResult<()> {
        let panics = self.state.lock().panicking.contains(operation);
        assert!(!panics, "{operation} blew up");
        if self.state.lock().failing.contains(operation) {
            return Err(PlatformError::Request(format!("{operation} unavailable")));
        }
        Ok(())
    }

    // ========================================================================
    // Setup
    // ========================================================================

    pub fn add_guild(&self, guild_id: Snowflake, owner_id: Snowflake) {
        let mut state = self.state.lock();
        state.guilds.push(guild_id);
        state.owners.insert(guild_id, owner_id);
    }

    pub fn grant_role(&self, guild_id: Snowflake, user_id: Snowflake, role_id: Snowflake) {
        self.state
            .lock()
            .roles
            .entry((guild_id, user_id))
            .or_default()
            .push(role_id);
    }

    pub fn set_display_name(&self, guild_id: Snowflake, user_id: Snowflake, name: &str) {
        self.state
            .lock()
            .display_names
            .insert((guild_id, user_id), name.to_string());
    }

    pub fn add_channel(&self, guild_id: Snowflake, channel: ChannelRef) {
        self.state.lock().channels.push((guild_id, channel));
    }

    /// Make every later call of `operation` fail with a request error
    pub fn fail_on(&self, operation: &'static str) {
        self.state.lock().failing.insert(operation);
    }

    /// Make every later call of `operation` panic
    pub fn panic_on(&self, operation: &'static str) {
        self.state.lock().panicking.insert(operation);
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn channel(&self, channel_id: Snowflake) -> Option<ChannelRef> {
        self.state
            .lock()
            .channels
            .iter()
            .find(|(_, c)| c.id == channel_id)
            .map(|(_, c)| c.clone())
    }

    /// Children of a category, by position
    pub fn children(&self, category_id: Snowflake) -> Vec<ChannelRef> {
        let mut children: Vec<ChannelRef> = self
            .state
            .lock()
            .channels
            .iter()
            .filter(|(_, c)| c.is_child_of(category_id))
            .map(|(_, c)| c.clone())
            .collect();
        children.sort_by_key(|c| c.position);
        children
    }

    pub fn categories(&self, guild_id: Snowflake) -> Vec<ChannelRef> {
        self.state
            .lock()
            .channels
            .iter()
            .filter(|(g, c)| *g == guild_id && c.is_category())
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn messages_in(&self, channel_id: Snowflake) -> Vec<PostedMessage> {
        self.state
            .lock()
            .messages
            .iter()
            .filter(|m| m.channel_id == channel_id)
            .cloned()
            .collect()
    }

    pub fn overwrites_on(&self, channel_id: Snowflake) -> Vec<PermissionOverwrite> {
        self.state
            .lock()
            .overwrites
            .iter()
            .filter(|(c, _)| *c == channel_id)
            .map(|(_, o)| *o)
            .collect()
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.state
            .lock()
            .replies
            .iter()
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// Text of every text reply, in order
    pub fn reply_texts(&self) -> Vec<String> {
        self.replies()
            .iter()
            .filter_map(|r| r.content().map(str::to_string))
            .collect()
    }

    pub fn last_reply_text(&self) -> Option<String> {
        self.reply_texts().pop()
    }

    pub fn defer_count(&self) -> usize {
        self.state.lock().defers.len()
    }

    pub fn deleted(&self) -> Vec<Snowflake> {
        self.state.lock().deleted.clone()
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    fn bot_user_id(&self) -> Snowflake {
        self.bot_user_id
    }

    async fn guild_ids(&self) -> PlatformResult<Vec<Snowflake>> {
        self.check("guild_ids")?;
        Ok(self.state.lock().guilds.clone())
    }

    async fn guild_owner(&self, guild_id: Snowflake) -> PlatformResult<Snowflake> {
        self.check("guild_owner")?;
        self.state
            .lock()
            .owners
            .get(&guild_id)
            .copied()
            .ok_or(PlatformError::NotFound("guild"))
    }

    async fn member_display_name(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> PlatformResult<Option<String>> {
        self.check("member_display_name")?;
        Ok(self
            .state
            .lock()
            .display_names
            .get(&(guild_id, user_id))
            .cloned())
    }

    async fn member_roles(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> PlatformResult<Vec<Snowflake>> {
        self.check("member_roles")?;
        Ok(self
            .state
            .lock()
            .roles
            .get(&(guild_id, user_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn guild_channels(&self, guild_id: Snowflake) -> PlatformResult<Vec<ChannelRef>> {
        self.check("guild_channels")?;
        Ok(self
            .state
            .lock()
            .channels
            .iter()
            .filter(|(g, _)| *g == guild_id)
            .map(|(_, c)| c.clone())
            .collect())
    }

    async fn create_category(&self, guild_id: Snowflake, name: &str) -> PlatformResult<ChannelRef> {
        self.check("create_category")?;
        let id = self.allocate();
        let mut state = self.state.lock();
        let position = state
            .channels
            .iter()
            .filter(|(g, c)| *g == guild_id && c.is_category())
            .map(|(_, c)| c.position + 1)
            .max()
            .unwrap_or(0);
        let category = ChannelRef::category(id, name, position);
        state.channels.push((guild_id, category.clone()));
        Ok(category)
    }

    async fn create_channel(
        &self,
        guild_id: Snowflake,
        channel: NewChannel,
    ) -> PlatformResult<ChannelRef> {
        self.check("create_channel")?;
        let id = self.allocate();
        let created = ChannelRef::text(id, channel.name, channel.position, Some(channel.parent_id));
        let mut state = self.state.lock();
        state.channels.push((guild_id, created.clone()));
        state
            .overwrites
            .extend(channel.overwrites.into_iter().map(|o| (id, o)));
        Ok(created)
    }

    async fn modify_channel(&self, channel_id: Snowflake, edit: ChannelEdit) -> PlatformResult<()> {
        self.check("modify_channel")?;
        let mut state = self.state.lock();
        let (_, channel) = state
            .channels
            .iter_mut()
            .find(|(_, c)| c.id == channel_id)
            .ok_or(PlatformError::NotFound("channel"))?;
        if let Some(name) = edit.name {
            channel.name = name;
        }
        if let Some(position) = edit.position {
            channel.position = position;
        }
        Ok(())
    }

    async fn delete_channel(&self, channel_id: Snowflake) -> PlatformResult<()> {
        self.check("delete_channel")?;
        let mut state = self.state.lock();
        let before = state.channels.len();
        state.channels.retain(|(_, c)| c.id != channel_id);
        if state.channels.len() == before {
            return Err(PlatformError::NotFound("channel"));
        }
        state.messages.retain(|m| m.channel_id != channel_id);
        state.deleted.push(channel_id);
        Ok(())
    }

    async fn set_permission_overwrite(
        &self,
        channel_id: Snowflake,
        overwrite: PermissionOverwrite,
    ) -> PlatformResult<()> {
        self.check("set_permission_overwrite")?;
        let mut state = self.state.lock();
        state
            .overwrites
            .retain(|(c, o)| !(*c == channel_id && o.target == overwrite.target));
        state.overwrites.push((channel_id, overwrite));
        Ok(())
    }

    async fn send_message(
        &self,
        channel_id: Snowflake,
        message: OutgoingMessage,
    ) -> PlatformResult<MessageRef> {
        self.check("send_message")?;
        let id = self.allocate();
        self.state.lock().messages.push(PostedMessage {
            id,
            channel_id,
            message,
            pinned: false,
        });
        Ok(MessageRef {
            id,
            author_id: self.bot_user_id,
            pinned: false,
        })
    }

    async fn edit_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        message: OutgoingMessage,
    ) -> PlatformResult<()> {
        self.check("edit_message")?;
        let mut state = self.state.lock();
        let posted = state
            .messages
            .iter_mut()
            .find(|m| m.channel_id == channel_id && m.id == message_id)
            .ok_or(PlatformError::NotFound("message"))?;
        posted.message = message;
        Ok(())
    }

    async fn pin_message(&self, channel_id: Snowflake, message_id: Snowflake) -> PlatformResult<()> {
        self.check("pin_message")?;
        let mut state = self.state.lock();
        let posted = state
            .messages
            .iter_mut()
            .find(|m| m.channel_id == channel_id && m.id == message_id)
            .ok_or(PlatformError::NotFound("message"))?;
        posted.pinned = true;
        Ok(())
    }

    async fn pinned_messages(&self, channel_id: Snowflake) -> PlatformResult<Vec<MessageRef>> {
        self.check("pinned_messages")?;
        Ok(self
            .state
            .lock()
            .messages
            .iter()
            .filter(|m| m.channel_id == channel_id && m.pinned)
            .map(|m| MessageRef {
                id: m.id,
                author_id: self.bot_user_id,
                pinned: true,
            })
            .collect())
    }

    async fn defer(&self, interaction: &InteractionHandle) -> PlatformResult<()> {
        self.check("defer")?;
        self.state.lock().defers.push(interaction.clone());
        Ok(())
    }

    async fn reply(&self, interaction: &InteractionHandle, reply: Reply) -> PlatformResult<()> {
        self.check("reply")?;
        self.state
            .lock()
            .replies
            .push((interaction.clone(), reply));
        Ok(())
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.0.lock();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock()
    }
}
