//! Event service
//!
//! Creating, updating, hiding, and deleting events. Every operation reloads
//! the record from the store; nothing is cached between commands.

use chrono::{DateTime, FixedOffset};
use raid_core::reconcile;
use raid_core::value_objects::schedule;
use raid_core::{
    ChannelEdit, DomainError, EventRecord, EventStoreExt, NewChannel, OutgoingMessage,
    PermissionOverwrite, Reply, Snowflake,
};
use tracing::{debug, info, instrument};

use crate::dto::{CreateEventRequest, UpdateEventRequest};

use super::context::{Caller, ServiceContext};
use super::declaration::{DeclarationService, Publish};
use super::error::{ServiceError, ServiceResult};
use super::guild::GuildService;
use super::permission::PermissionService;
use super::placement::PlacementService;

pub struct EventService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> EventService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// The record of `channel_id`, or an error naming the channel as foreign
    pub async fn require_record(&self, channel_id: Snowflake) -> ServiceResult<EventRecord> {
        self.ctx
            .store()
            .load::<EventRecord>(channel_id)
            .await?
            .ok_or(ServiceError::NotAnEventChannel)
    }

    /// Name, date, and time checks that need no collaborator. Returns the start.
    pub fn validate_create(&self, request: &CreateEventRequest) -> ServiceResult<DateTime<FixedOffset>> {
        request.check_name()?;

        let now = self.ctx.now();
        let tz = self.ctx.tz();
        let date = schedule::parse_date(&request.date, schedule::server_year(now, tz))
            .ok_or(DomainError::InvalidDate)?;
        let time = schedule::parse_time(&request.time).ok_or(DomainError::InvalidTime)?;

        let start = schedule::localize(date.and_time(time), tz);
        if start < now {
            return Err(DomainError::DateInPast.into());
        }
        Ok(start)
    }

    /// Create an event channel at its date-ordered slot in the category
    #[instrument(skip(self, caller, request), fields(guild_id = %caller.guild_id, name = %request.name))]
    pub async fn create(
        &self,
        caller: &Caller,
        request: CreateEventRequest,
        start: DateTime<FixedOffset>,
    ) -> ServiceResult<Reply> {
        let config = GuildService::new(self.ctx)
            .require_config(caller.guild_id)
            .await?;
        PermissionService::new(self.ctx)
            .require_creator(&config, caller.user_id)
            .await?;

        // The clock kept running while the command sat in the queue
        let mut record = EventRecord::new(request.name, start, caller.user_id);
        if record.has_started(self.ctx.now()) {
            return Err(DomainError::DateInPast.into());
        }

        let placement = PlacementService::new(self.ctx);
        let (anchor, siblings) = placement.gather_siblings(&config).await?;
        let insertion =
            reconcile::plan_insertion(siblings, start, &placement.reconcile_context(anchor));
        placement.apply_moves(&insertion.moves).await?;

        let today = schedule::server_today(self.ctx.now(), self.ctx.tz());
        let name = reconcile::channel_name(&record, today, self.ctx.tz());

        let platform = self.ctx.platform();
        let channel = platform
            .create_channel(
                caller.guild_id,
                NewChannel {
                    name,
                    parent_id: config.category_id,
                    position: insertion.slot,
                    overwrites: vec![
                        PermissionOverwrite::everyone(caller.guild_id, request.hidden),
                        PermissionOverwrite::owner(self.ctx.bot_user_id()),
                        PermissionOverwrite::owner(caller.user_id),
                    ],
                },
            )
            .await?;

        DeclarationService::new(self.ctx)
            .publish(
                caller.user_id,
                caller.guild_id,
                channel.id,
                &mut record,
                Publish::Create,
            )
            .await?;

        platform
            .send_message(
                channel.id,
                OutgoingMessage::text(format!(
                    "<@{}>, please describe your rules here:",
                    caller.user_id
                ))
                .mentioning(caller.user_id),
            )
            .await?;

        info!(channel_id = %channel.id, position = insertion.slot, hidden = request.hidden, "Event created");
        Ok(Reply::text(format!(
            "Raid Created! {}",
            channel.id.channel_mention()
        )))
    }

    /// Partial update of name, date, and time. A date alone keeps the time of
    /// day and a time alone keeps the date.
    #[instrument(skip(self, caller, request), fields(channel_id = %caller.channel_id))]
    pub async fn update(&self, caller: &Caller, request: UpdateEventRequest) -> ServiceResult<Reply> {
        let mut record = self.require_record(caller.channel_id).await?;

        let permissions = PermissionService::new(self.ctx);
        permissions.require_event_owner(&record, caller.user_id)?;
        let config = GuildService::new(self.ctx)
            .require_config(caller.guild_id)
            .await?;
        permissions.require_creator(&config, caller.user_id).await?;

        request.check_name()?;

        let now = self.ctx.now();
        let tz = self.ctx.tz();
        let date = request
            .date
            .as_deref()
            .map(|d| schedule::parse_date(d, schedule::server_year(now, tz)).ok_or(DomainError::InvalidDate))
            .transpose()?;
        let time = request
            .time
            .as_deref()
            .map(|t| schedule::parse_time(t).ok_or(DomainError::InvalidTime))
            .transpose()?;

        let previous_start = record.date;
        if let Some(start) = schedule::merge_schedule(record.date, date, time, tz) {
            record.date = start;
            if record.has_started(now) {
                return Err(DomainError::DateInPast.into());
            }
        }
        if let Some(name) = request.name {
            record.name = name;
        }

        DeclarationService::new(self.ctx)
            .publish(
                caller.user_id,
                caller.guild_id,
                caller.channel_id,
                &mut record,
                Publish::Locate,
            )
            .await?;

        let name = reconcile::channel_name(&record, schedule::server_today(now, tz), tz);
        self.ctx
            .platform()
            .modify_channel(caller.channel_id, ChannelEdit::rename(name))
            .await?;

        if record.date != previous_start {
            debug!("Start changed, reordering category");
            PlacementService::new(self.ctx).reorder(&config).await?;
        }

        info!(name = %record.name, start = %record.date, "Event updated");
        Ok(Reply::text("Raid updated."))
    }

    /// Hide the channel from everyone but its owners, or show it again
    #[instrument(skip(self, caller), fields(channel_id = %caller.channel_id))]
    pub async fn set_visibility(&self, caller: &Caller, hidden: bool) -> ServiceResult<Reply> {
        let record = self.require_record(caller.channel_id).await?;
        PermissionService::new(self.ctx).require_event_owner(&record, caller.user_id)?;
        GuildService::new(self.ctx)
            .require_config(caller.guild_id)
            .await?;

        self.ctx
            .platform()
            .set_permission_overwrite(
                caller.channel_id,
                PermissionOverwrite::everyone(caller.guild_id, hidden),
            )
            .await?;

        info!(hidden, "Event visibility changed");
        Ok(Reply::text(if hidden {
            "Channel is now hidden!"
        } else {
            "Channel is now visible!"
        }))
    }

    /// Record owner or guild owner may delete
    pub async fn authorize_delete(&self, caller: &Caller) -> ServiceResult<()> {
        let record = self.require_record(caller.channel_id).await?;
        PermissionService::new(self.ctx)
            .require_event_or_guild_owner(&record, caller.guild_id, caller.user_id)
            .await
    }

    /// Delete the channel and its record
    #[instrument(skip(self))]
    pub async fn delete(&self, channel_id: Snowflake) -> ServiceResult<()> {
        self.ctx.platform().delete_channel(channel_id).await?;
        self.ctx.store().remove::<EventRecord>(channel_id).await?;
        info!("Event deleted");
        Ok(())
    }
}
