//! Service context - dependency container for services
//!
//! Holds the store, the chat platform, the clock, the task queue, and the
//! scheduling settings every service reads.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use raid_common::{AppConfig, ConfigError};
use raid_core::{ChatPlatform, Clock, EventStore, Snowflake, SystemClock};

use crate::queue::TaskQueue;

/// Emoji markup keyed by role or class name, matched case-insensitively
#[derive(Debug, Clone, Default)]
pub struct EmojiMap(HashMap<String, String>);

impl EmojiMap {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        )
    }

    /// Markup for `key`, empty when none is configured
    pub fn get(&self, key: &str) -> &str {
        self.0
            .get(&key.to_lowercase())
            .map_or("", String::as_str)
    }
}

/// Scheduling and rendering settings
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Server timezone; dates are entered and displayed in it
    pub tz: Tz,
    /// How long after its start an event is deleted
    pub expiry: Duration,
    pub emoji: EmojiMap,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            tz: chrono_tz::America::New_York,
            expiry: Duration::hours(48),
            emoji: EmojiMap::default(),
        }
    }
}

impl ServiceSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            tz: config.schedule.tz()?,
            expiry: config.schedule.expiry(),
            emoji: EmojiMap::new(config.emoji.clone()),
        })
    }
}

/// Who invoked a command, and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub guild_id: Snowflake,
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    /// Display name as delivered with the interaction
    pub display_name: Option<String>,
}

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    store: Arc<dyn EventStore>,
    platform: Arc<dyn ChatPlatform>,
    clock: Arc<dyn Clock>,
    queue: TaskQueue,
    settings: ServiceSettings,
}

impl ServiceContext {
    pub fn new(
        store: Arc<dyn EventStore>,
        platform: Arc<dyn ChatPlatform>,
        clock: Arc<dyn Clock>,
        queue: TaskQueue,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            store,
            platform,
            clock,
            queue,
            settings,
        }
    }

    // === Collaborators ===

    pub fn store(&self) -> &dyn EventStore {
        self.store.as_ref()
    }

    pub fn platform(&self) -> &dyn ChatPlatform {
        self.platform.as_ref()
    }

    /// Queue for mutating commands
    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    // === Settings ===

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn tz(&self) -> Tz {
        self.settings.tz
    }

    pub fn expiry(&self) -> Duration {
        self.settings.expiry
    }

    pub fn emoji(&self) -> &EmojiMap {
        &self.settings.emoji
    }

    /// Current instant according to the context clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn bot_user_id(&self) -> Snowflake {
        self.platform.bot_user_id()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("store", &"dyn EventStore")
            .field("platform", &"dyn ChatPlatform")
            .field("queue", &self.queue)
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    store: Option<Arc<dyn EventStore>>,
    platform: Option<Arc<dyn ChatPlatform>>,
    clock: Option<Arc<dyn Clock>>,
    queue: Option<TaskQueue>,
    settings: Option<ServiceSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: Arc<dyn EventStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn platform(mut self, platform: Arc<dyn ChatPlatform>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Defaults to the system clock
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn queue(mut self, queue: TaskQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the ServiceContext
    ///
    /// Returns an error if a required dependency is missing.
    pub fn build(self) -> Result<ServiceContext, &'static str> {
        Ok(ServiceContext::new(
            self.store.ok_or("store is required")?,
            self.platform.ok_or("platform is required")?,
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.queue.ok_or("queue is required")?,
            self.settings.unwrap_or_default(),
        ))
    }
}
