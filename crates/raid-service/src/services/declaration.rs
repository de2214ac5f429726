//! Declaration message - the pinned summary of an event
//!
//! Rendered from the record and rewritten after every change. The record is
//! persisted here as well, keyed by channel id, so the message and the store
//! never drift apart.

use chrono_tz::Tz;
use raid_core::{
    custom_id, Button, ButtonStyle, Embed, EventRecord, EventStoreExt, Member, OutgoingMessage,
    PlayerRole, Snowflake,
};
use tracing::{debug, info, instrument};

use super::context::{EmojiMap, ServiceContext};
use super::error::{ServiceError, ServiceResult};

const SERVER_TIME_FORMAT: &str = "%A, %B %d, %Y %I:%M %p";
const DISPLAY_NAME_WIDTH: usize = 15;

/// How to find the message to rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    /// Post and pin a fresh message
    Create,
    /// Reuse the stored id, or find the bot's pinned message
    Locate,
}

/// Render the declaration message for a record
pub fn render(record: &EventRecord, tz: Tz, emoji: &EmojiMap) -> OutgoingMessage {
    let content = format!(
        "{}, your raid will automatically delete 48 hours after the start time.\n\
         You can manually add `/raid add @user` or remove `/raid kick @user` users.\n\
         You can change this event with `/raid update`.",
        record.owner_id.user_mention()
    );

    let local = record.date.with_timezone(&tz);
    let mut embed = Embed::new(record.name.clone())
        .field(
            "Date (Server Time)",
            local.format(SERVER_TIME_FORMAT).to_string(),
            true,
        )
        .field(
            "Date (Local Time)",
            format!("<t:{}:F>", record.date.timestamp()),
            true,
        )
        .field("Total Signups", record.members.len().to_string(), false);

    for role in PlayerRole::ALL {
        let (name, value) = role_field(record, role, emoji);
        embed = embed.field(name, value, true);
    }

    OutgoingMessage {
        content,
        embed: Some(embed),
        components: vec![
            Button::new("Join or Update", custom_id::JOIN, ButtonStyle::Primary),
            Button::new("Leave", custom_id::LEAVE, ButtonStyle::Danger),
        ],
        allowed_mentions: Vec::new(),
    }
}

fn role_field(record: &EventRecord, role: PlayerRole, emoji: &EmojiMap) -> (String, String) {
    let members: Vec<&Member> = record.members.by_role(role).collect();
    let name = format!(
        "{} {} ({})",
        emoji.get(role.as_str()),
        role.heading(),
        members.len()
    )
    .trim_start()
    .to_string();

    if members.is_empty() {
        return (name, "none".to_string());
    }

    let lines: Vec<String> = members
        .into_iter()
        .map(|member| {
            let index = record.members.index_of(member.member_id).unwrap_or_default();
            format!(
                "`{index}` {} {}",
                emoji.get(member.character_class.as_str()),
                member_label(member)
            )
        })
        .collect();

    (name, lines.join("\n"))
}

fn member_label(member: &Member) -> String {
    let display = member.display_name.as_deref().filter(|d| !d.is_empty());

    match (member.character_name.as_deref(), display) {
        (Some(character), Some(display)) => {
            let mut label = format!("**{}**", capitalize(character));
            if !display.to_lowercase().contains(&character.to_lowercase()) {
                label.push_str(&format!(" ({})", truncate(display, DISPLAY_NAME_WIDTH)));
            }
            label
        }
        (Some(character), None) => format!(
            "**{}** ({})",
            capitalize(character),
            member.member_id.user_mention()
        ),
        (None, Some(display)) => format!("**{}**", truncate(display, DISPLAY_NAME_WIDTH)),
        (None, None) => member.member_id.user_mention(),
    }
}

/// `jAINA` -> `Jaina`
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Keep `text` when it fits in `width` chars, else cut to `width - 3` and add `...`
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let head: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", head.trim_end())
}

pub struct DeclarationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> DeclarationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Persist `record` for `channel_id` and bring its declaration up to date.
    ///
    /// Mentions in the message only ping `actor`. With [`Publish::Locate`] and
    /// no message to be found, nothing is persisted.
    #[instrument(skip(self, record), fields(event = %record.name))]
    pub async fn publish(
        &self,
        actor: Snowflake,
        guild_id: Snowflake,
        channel_id: Snowflake,
        record: &mut EventRecord,
        mode: Publish,
    ) -> ServiceResult<()> {
        self.resolve_display_names(guild_id, record).await?;

        match (mode, record.declaration_message_id) {
            (Publish::Create, _) => {
                let message = self.render(record).mentioning(actor);
                let sent = self.ctx.platform().send_message(channel_id, message).await?;
                self.ctx.platform().pin_message(channel_id, sent.id).await?;
                record.declaration_message_id = Some(sent.id);
                self.ctx.store().save(channel_id, &*record).await?;
                info!(message_id = %sent.id, "Declaration posted");
            }
            (Publish::Locate, Some(message_id)) => {
                self.rewrite(actor, channel_id, message_id, record).await?;
            }
            (Publish::Locate, None) => {
                let message_id = self
                    .find_pinned(channel_id)
                    .await?
                    .ok_or(ServiceError::NotAnEventChannel)?;
                record.declaration_message_id = Some(message_id);
                self.rewrite(actor, channel_id, message_id, record).await?;
            }
        }
        Ok(())
    }

    fn render(&self, record: &EventRecord) -> OutgoingMessage {
        render(record, self.ctx.tz(), self.ctx.emoji())
    }

    async fn rewrite(
        &self,
        actor: Snowflake,
        channel_id: Snowflake,
        message_id: Snowflake,
        record: &EventRecord,
    ) -> ServiceResult<()> {
        self.ctx.store().save(channel_id, record).await?;
        let message = self.render(record).mentioning(actor);
        self.ctx
            .platform()
            .edit_message(channel_id, message_id, message)
            .await?;
        debug!(message_id = %message_id, "Declaration rewritten");
        Ok(())
    }

    /// First pinned message authored by the bot
    async fn find_pinned(&self, channel_id: Snowflake) -> ServiceResult<Option<Snowflake>> {
        let bot = self.ctx.bot_user_id();
        let pinned = self.ctx.platform().pinned_messages(channel_id).await?;
        Ok(pinned.into_iter().find(|m| m.author_id == bot).map(|m| m.id))
    }

    async fn resolve_display_names(
        &self,
        guild_id: Snowflake,
        record: &mut EventRecord,
    ) -> ServiceResult<()> {
        for member in record.members.iter_mut() {
            if member.display_name.as_deref().is_some_and(|d| !d.is_empty()) {
                continue;
            }
            member.display_name = self
                .ctx
                .platform()
                .member_display_name(guild_id, member.member_id)
                .await?;
        }
        Ok(())
    }
}
