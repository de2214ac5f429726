//! Roster service
//!
//! Signups on an event: add, join, kick, leave. Members are keyed by user id,
//! so joining twice updates the existing entry in place.

use raid_core::{EventRecord, JoinPrefill, Member, Reply, Snowflake, Upsert};
use tracing::{info, instrument};

use crate::dto::SignupRequest;

use super::context::{Caller, ServiceContext};
use super::declaration::{DeclarationService, Publish};
use super::error::ServiceResult;
use super::event::EventService;
use super::permission::PermissionService;

pub struct RosterService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RosterService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Owner signs up someone else
    #[instrument(skip(self, caller, display_name), fields(channel_id = %caller.channel_id))]
    pub async fn add(
        &self,
        caller: &Caller,
        user_id: Snowflake,
        display_name: Option<String>,
        signup: SignupRequest,
    ) -> ServiceResult<Reply> {
        let record = EventService::new(self.ctx)
            .require_record(caller.channel_id)
            .await?;
        PermissionService::new(self.ctx).require_event_owner(&record, caller.user_id)?;
        self.upsert(caller, record, user_id, display_name, signup).await
    }

    /// Caller signs up themselves
    #[instrument(skip(self, caller), fields(channel_id = %caller.channel_id, user_id = %caller.user_id))]
    pub async fn join(&self, caller: &Caller, signup: SignupRequest) -> ServiceResult<Reply> {
        let record = EventService::new(self.ctx)
            .require_record(caller.channel_id)
            .await?;
        self.upsert(caller, record, caller.user_id, caller.display_name.clone(), signup)
            .await
    }

    async fn upsert(
        &self,
        caller: &Caller,
        mut record: EventRecord,
        user_id: Snowflake,
        display_name: Option<String>,
        signup: SignupRequest,
    ) -> ServiceResult<Reply> {
        let member = Member::new(user_id, signup.class, signup.role)
            .with_character_name(signup.name)
            .with_display_name(display_name);
        let outcome = record.members.upsert(member);

        self.publish(caller, &mut record).await?;

        info!(member_id = %user_id, ?outcome, "Signup saved");
        let verb = match outcome {
            Upsert::Added => "added.",
            Upsert::Updated => "updated.",
        };
        Ok(Reply::text(format!("<@{user_id}> {verb}")))
    }

    /// Owner removes someone
    #[instrument(skip(self, caller), fields(channel_id = %caller.channel_id))]
    pub async fn kick(&self, caller: &Caller, user_id: Snowflake) -> ServiceResult<Reply> {
        let mut record = EventService::new(self.ctx)
            .require_record(caller.channel_id)
            .await?;
        PermissionService::new(self.ctx).require_event_owner(&record, caller.user_id)?;

        if !record.members.remove(user_id) {
            return Ok(Reply::text(format!("{} is not in this raid.", user_id.user_mention())));
        }

        self.publish(caller, &mut record).await?;
        info!(member_id = %user_id, "Member kicked");
        Ok(Reply::text(format!(
            "{} has been removed from this raid.",
            user_id.user_mention()
        )))
    }

    #[instrument(skip(self, caller), fields(channel_id = %caller.channel_id, user_id = %caller.user_id))]
    pub async fn leave(&self, caller: &Caller) -> ServiceResult<Reply> {
        let mut record = EventService::new(self.ctx)
            .require_record(caller.channel_id)
            .await?;

        if !record.members.remove(caller.user_id) {
            return Ok(Reply::text("You aren't in this raid."));
        }

        self.publish(caller, &mut record).await?;
        info!("Member left");
        Ok(Reply::text("You've left the raid."))
    }

    /// The join form, prefilled with the caller's current signup
    pub async fn join_form(&self, caller: &Caller) -> ServiceResult<Reply> {
        let record = EventService::new(self.ctx)
            .require_record(caller.channel_id)
            .await?;
        let prefill = record
            .members
            .get(caller.user_id)
            .map(|m| JoinPrefill {
                role: Some(m.role),
                class: Some(m.character_class),
                character_name: m.character_name.clone(),
            })
            .unwrap_or_default();
        Ok(Reply::JoinForm { prefill })
    }

    async fn publish(&self, caller: &Caller, record: &mut EventRecord) -> ServiceResult<()> {
        DeclarationService::new(self.ctx)
            .publish(
                caller.user_id,
                caller.guild_id,
                caller.channel_id,
                record,
                Publish::Locate,
            )
            .await
    }
}
