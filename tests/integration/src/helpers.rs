//! Test harness
//!
//! Real services, dispatcher, and memory store over the fake platform. Queued
//! tasks are run on demand with [`Harness::run_queued`], or by a real worker
//! after [`Harness::spawn_worker`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use raid_core::{
    ChannelRef, EventRecord, EventStoreExt, GuildConfig, InteractionHandle, Snowflake,
};
use raid_service::services::EventService;
use raid_service::{
    Caller, Command, CommandWorker, Dispatcher, InteractionSource, Invocation, ServiceContext,
    ServiceContextBuilder, ServiceSettings, TaskQueue, TaskReceiver, WorkerStats,
};
use raid_store::MemoryEventStore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::fakes::{FakePlatform, FixedClock};
use crate::fixtures::{
    create_request, start_of_year, BOT, CATEGORY, CATEGORY_POSITION, CREATOR, CREATOR_ROLE,
    GUILD, GUILD_OWNER, LOBBY,
};

pub struct Harness {
    pub ctx: Arc<ServiceContext>,
    pub platform: Arc<FakePlatform>,
    pub store: Arc<MemoryEventStore>,
    pub clock: Arc<FixedClock>,
    pub cancel: CancellationToken,
    receiver: Option<TaskReceiver>,
    next_interaction: u64,
}

impl Harness {
    /// A guild with its owner and nothing else, at [`start_of_year`]
    pub fn new() -> Self {
        Self::at(start_of_year())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        let platform = Arc::new(FakePlatform::new(BOT));
        platform.add_guild(GUILD, GUILD_OWNER);
        let store = Arc::new(MemoryEventStore::new());
        let clock = Arc::new(FixedClock::new(now));
        let (queue, receiver) = TaskQueue::new();

        let ctx = ServiceContextBuilder::default()
            .store(store.clone())
            .platform(platform.clone())
            .clock(clock.clone())
            .queue(queue)
            .settings(ServiceSettings::default())
            .build()
            .unwrap();

        Self {
            ctx: Arc::new(ctx),
            platform,
            store,
            clock,
            cancel: CancellationToken::new(),
            receiver: Some(receiver),
            next_interaction: 1,
        }
    }

    /// Guild with the event category configured and [`CREATOR`] holding the
    /// creator role
    pub async fn configured() -> Self {
        let harness = Self::new();
        harness.configure_guild(GUILD).await;
        harness
    }

    pub async fn configure_guild(&self, guild_id: Snowflake) {
        self.platform.add_channel(
            guild_id,
            ChannelRef::category(CATEGORY, "Raids", CATEGORY_POSITION),
        );
        self.platform.grant_role(guild_id, CREATOR, CREATOR_ROLE);
        self.store
            .save(guild_id, &GuildConfig::new(guild_id, CATEGORY, CREATOR_ROLE))
            .await
            .unwrap();
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(Arc::clone(&self.ctx))
    }

    pub fn caller(&self, user_id: Snowflake, channel_id: Snowflake) -> Caller {
        Caller {
            guild_id: GUILD,
            channel_id,
            user_id,
            display_name: None,
        }
    }

    pub fn invocation(&mut self, user_id: Snowflake, channel_id: Snowflake, command: Command) -> Invocation {
        let id = self.next_interaction;
        self.next_interaction += 1;
        Invocation {
            interaction: InteractionHandle {
                id: Snowflake::new(id),
                token: format!("token-{id}"),
            },
            guild_id: GUILD,
            channel_id,
            user_id,
            user_display_name: None,
            source: InteractionSource::SlashCommand,
            command,
        }
    }

    /// Dispatch a slash command, then run whatever it queued
    pub async fn command(&mut self, user_id: Snowflake, channel_id: Snowflake, command: Command) {
        let inv = self.invocation(user_id, channel_id, command);
        self.dispatcher().dispatch(inv).await.unwrap();
        self.run_queued().await;
    }

    /// Run queued tasks in order until the queue is empty
    pub async fn run_queued(&mut self) -> Vec<anyhow::Result<()>> {
        let receiver = self
            .receiver
            .as_mut()
            .expect("receiver was handed to a worker");
        let mut outcomes = Vec::new();
        while receiver.pending() > 0 {
            let Some(task) = receiver.receive(&self.cancel).await else {
                break;
            };
            outcomes.push((task.run)().await);
        }
        outcomes
    }

    pub fn spawn_worker(&mut self) -> (JoinHandle<()>, Arc<WorkerStats>) {
        let receiver = self.receiver.take().expect("worker already spawned");
        let worker = CommandWorker::new(receiver, self.cancel.clone());
        let stats = worker.stats();
        (worker.spawn(), stats)
    }

    /// Create an event as [`CREATOR`] and return its channel
    pub async fn create_event(&self, name: &str, date: &str, time: &str) -> Snowflake {
        let events = EventService::new(&self.ctx);
        let request = create_request(name, date, time);
        let start = events.validate_create(&request).unwrap();
        let before: Vec<Snowflake> = self.platform.children(CATEGORY).iter().map(|c| c.id).collect();
        events
            .create(&self.caller(CREATOR, LOBBY), request, start)
            .await
            .unwrap();
        self.platform
            .children(CATEGORY)
            .into_iter()
            .map(|c| c.id)
            .find(|id| !before.contains(id))
            .expect("no channel created")
    }

    pub async fn record(&self, channel_id: Snowflake) -> Option<EventRecord> {
        self.store.load::<EventRecord>(channel_id).await.unwrap()
    }

    /// Child channel names of the category, by position
    pub fn channel_names(&self) -> Vec<String> {
        self.platform
            .children(CATEGORY)
            .into_iter()
            .map(|c| c.name)
            .collect()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Poll `condition` for up to a second
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}
