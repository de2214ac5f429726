//! Command dispatcher - routes interactions to services
//!
//! Cheap checks that touch no event state run inline and are answered right
//! away. Everything that reads or writes event state is deferred and submitted
//! to the task queue, so mutations run one at a time in arrival order.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use raid_core::{InteractionHandle, Reply, Snowflake};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::dto::{
    ConfigureRequest, CreateEventRequest, JoinFormRequest, SignupRequest, UpdateEventRequest,
};
use crate::services::{
    Caller, EventService, GuildService, PermissionService, RosterService, ServiceContext,
    ServiceError, ServiceResult, SOMETHING_WENT_WRONG,
};
use crate::worker::panic_message;

/// How the user triggered the interaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionSource {
    #[default]
    SlashCommand,
    /// A button on a message
    Component,
    /// A submitted form
    ModalSubmit,
}

/// What the user asked for
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Configure(ConfigureRequest),
    Create(CreateEventRequest),
    Update(UpdateEventRequest),
    Add {
        target_id: Snowflake,
        #[serde(default)]
        target_display_name: Option<String>,
        #[serde(flatten)]
        signup: SignupRequest,
    },
    Join(SignupRequest),
    Kick {
        target_id: Snowflake,
    },
    Leave,
    Hide,
    Show,
    Delete,
    /// "Join or Update" on the declaration message
    JoinButton,
    /// "Leave" on the declaration message
    LeaveButton,
    JoinFormSubmitted(JoinFormRequest),
    /// "Start A New Raid" / "Start A Hidden Raid"
    NewEventButton {
        #[serde(default)]
        hidden: bool,
    },
    NewEventFormSubmitted(CreateEventRequest),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Configure(_) => "configure",
            Self::Create(_) => "create",
            Self::Update(_) => "update",
            Self::Add { .. } => "add",
            Self::Join(_) => "join",
            Self::Kick { .. } => "kick",
            Self::Leave => "leave",
            Self::Hide => "hide",
            Self::Show => "show",
            Self::Delete => "delete",
            Self::JoinButton => "join_button",
            Self::LeaveButton => "leave_button",
            Self::JoinFormSubmitted(_) => "join_form_submitted",
            Self::NewEventButton { .. } => "new_event_button",
            Self::NewEventFormSubmitted(_) => "new_event_form_submitted",
        }
    }
}

/// One interaction as delivered by the gateway bridge
#[derive(Debug, Clone, Deserialize)]
pub struct Invocation {
    pub interaction: InteractionHandle,
    pub guild_id: Snowflake,
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    #[serde(default)]
    pub user_display_name: Option<String>,
    #[serde(default)]
    pub source: InteractionSource,
    #[serde(flatten)]
    pub command: Command,
}

impl Invocation {
    pub fn caller(&self) -> Caller {
        Caller {
            guild_id: self.guild_id,
            channel_id: self.channel_id,
            user_id: self.user_id,
            display_name: self.user_display_name.clone(),
        }
    }
}

/// How an invocation was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// Submitted to the task queue
    Queued { task_id: u64 },
    /// Answered inline
    Answered,
}

/// Everything a queued operation gets to work with
pub struct Invoked {
    pub ctx: Arc<ServiceContext>,
    pub caller: Caller,
    pub interaction: InteractionHandle,
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    ctx: Arc<ServiceContext>,
}

impl Dispatcher {
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<ServiceContext> {
        &self.ctx
    }

    #[instrument(skip(self, inv), fields(command = inv.command.name(), guild_id = %inv.guild_id, channel_id = %inv.channel_id, user_id = %inv.user_id))]
    pub async fn dispatch(&self, inv: Invocation) -> ServiceResult<Dispatched> {
        let command = inv.command.clone();
        match command {
            Command::Configure(request) => {
                if let Err(e) = request.check_category() {
                    return self.answer(&inv, Err(e.into())).await;
                }
                if let Err(e) = PermissionService::new(&self.ctx)
                    .require_guild_owner(inv.guild_id, inv.user_id)
                    .await
                {
                    return self.answer(&inv, Err(e)).await;
                }
                self.enqueue(inv, true, "configure", move |t| async move {
                    GuildService::new(&t.ctx)
                        .configure(&t.caller, request)
                        .await
                        .map(Some)
                })
                .await
            }

            Command::Create(request) | Command::NewEventFormSubmitted(request) => {
                let start = match EventService::new(&self.ctx).validate_create(&request) {
                    Ok(start) => start,
                    Err(e) => return self.answer(&inv, Err(e)).await,
                };
                self.enqueue(inv, true, "create", move |t| async move {
                    EventService::new(&t.ctx)
                        .create(&t.caller, request, start)
                        .await
                        .map(Some)
                })
                .await
            }

            Command::Update(request) => {
                self.enqueue(inv, true, "update", move |t| async move {
                    EventService::new(&t.ctx)
                        .update(&t.caller, request)
                        .await
                        .map(Some)
                })
                .await
            }

            Command::Add {
                target_id,
                target_display_name,
                signup,
            } => {
                self.enqueue(inv, true, "add", move |t| async move {
                    RosterService::new(&t.ctx)
                        .add(&t.caller, target_id, target_display_name, signup)
                        .await
                        .map(Some)
                })
                .await
            }

            Command::Join(signup) => {
                let quiet = inv.source == InteractionSource::Component;
                self.enqueue(inv, true, "join", move |t| async move {
                    let reply = RosterService::new(&t.ctx).join(&t.caller, signup).await?;
                    Ok((!quiet).then_some(reply))
                })
                .await
            }

            Command::JoinFormSubmitted(form) => {
                let signup = match form.parse() {
                    Ok(signup) => signup,
                    Err(e) => {
                        let text = format!("<@{}> {e}", inv.user_id);
                        return self.answer(&inv, Ok(Reply::text(text))).await;
                    }
                };
                self.enqueue(inv, true, "join", move |t| async move {
                    RosterService::new(&t.ctx)
                        .join(&t.caller, signup)
                        .await
                        .map(Some)
                })
                .await
            }

            Command::Kick { target_id } => {
                self.enqueue(inv, true, "kick", move |t| async move {
                    RosterService::new(&t.ctx)
                        .kick(&t.caller, target_id)
                        .await
                        .map(Some)
                })
                .await
            }

            Command::Leave | Command::LeaveButton => {
                self.enqueue(inv, true, "leave", |t| async move {
                    RosterService::new(&t.ctx).leave(&t.caller).await.map(Some)
                })
                .await
            }

            Command::Hide | Command::Show => {
                let hidden = matches!(inv.command, Command::Hide);
                self.enqueue(inv, true, "visibility", move |t| async move {
                    EventService::new(&t.ctx)
                        .set_visibility(&t.caller, hidden)
                        .await
                        .map(Some)
                })
                .await
            }

            Command::Delete => {
                self.enqueue(inv, true, "delete", |t| async move {
                    let events = EventService::new(&t.ctx);
                    events.authorize_delete(&t.caller).await?;
                    t.ctx
                        .platform()
                        .reply(&t.interaction, Reply::text("Deleting raid..."))
                        .await?;
                    events.delete(t.caller.channel_id).await?;
                    Ok(None)
                })
                .await
            }

            // The form has to be the first answer, so no defer here
            Command::JoinButton => {
                self.enqueue(inv, false, "join_form", |t| async move {
                    RosterService::new(&t.ctx).join_form(&t.caller).await.map(Some)
                })
                .await
            }

            Command::NewEventButton { hidden } => {
                let outcome = self.new_event_form(&inv, hidden).await;
                self.answer(&inv, outcome).await
            }
        }
    }

    /// Config and creator role checks, then the form
    async fn new_event_form(&self, inv: &Invocation, hidden: bool) -> ServiceResult<Reply> {
        let config = GuildService::new(&self.ctx)
            .require_config(inv.guild_id)
            .await?;
        PermissionService::new(&self.ctx)
            .require_creator(&config, inv.user_id)
            .await?;
        Ok(Reply::NewEventForm { hidden })
    }

    /// Answer inline with a reply or an error message
    async fn answer(&self, inv: &Invocation, outcome: ServiceResult<Reply>) -> ServiceResult<Dispatched> {
        let reply = match outcome {
            Ok(reply) => reply,
            Err(e) if e.is_transient() => {
                warn!(error = %e, "Inline check failed");
                Reply::text(SOMETHING_WENT_WRONG)
            }
            Err(e) => {
                debug!(code = e.error_code(), "Command rejected");
                Reply::text(e.user_message())
            }
        };
        self.ctx.platform().reply(&inv.interaction, reply).await?;
        Ok(Dispatched::Answered)
    }

    async fn enqueue<F, Fut>(
        &self,
        inv: Invocation,
        defer: bool,
        label: &'static str,
        op: F,
    ) -> ServiceResult<Dispatched>
    where
        F: FnOnce(Invoked) -> Fut + Send + 'static,
        Fut: Future<Output = ServiceResult<Option<Reply>>> + Send + 'static,
    {
        if defer {
            self.ctx.platform().defer(&inv.interaction).await?;
        }

        let invoked = Invoked {
            ctx: Arc::clone(&self.ctx),
            caller: inv.caller(),
            interaction: inv.interaction,
        };

        let task_id = self.ctx.queue().submit(label, move || async move {
            let ctx = Arc::clone(&invoked.ctx);
            let interaction = invoked.interaction.clone();
            // A panic still owes the invoker an answer
            let outcome = AssertUnwindSafe(op(invoked))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| {
                    Err(ServiceError::internal(format!(
                        "{label} panicked: {}",
                        panic_message(panic.as_ref())
                    )))
                });
            finish(&ctx, &interaction, outcome).await
        })?;

        debug!(task_id, "Command queued");
        Ok(Dispatched::Queued { task_id })
    }
}

/// Deliver a queued operation's outcome. Transient failures still get the
/// generic answer, then go back to the worker for logging.
async fn finish(
    ctx: &ServiceContext,
    interaction: &InteractionHandle,
    outcome: ServiceResult<Option<Reply>>,
) -> anyhow::Result<()> {
    match outcome {
        Ok(Some(reply)) => ctx.platform().reply(interaction, reply).await?,
        Ok(None) => {}
        Err(e) if !e.is_transient() => {
            debug!(code = e.error_code(), "Command rejected");
            ctx.platform()
                .reply(interaction, Reply::text(e.user_message()))
                .await?;
        }
        Err(e) => {
            if let Err(reply_err) = ctx
                .platform()
                .reply(interaction, Reply::text(SOMETHING_WENT_WRONG))
                .await
            {
                warn!(error = %reply_err, "Could not report failure to the invoker");
            }
            return Err(e.into());
        }
    }
    Ok(())
}
