//! # raid-core
//!
//! Domain layer for raid signups: event records, rosters, channel
//! reconciliation, and the ports (store, chat platform, clock) the services
//! depend on. No infrastructure lives here.

pub mod entities;
pub mod error;
pub mod reconcile;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    custom_id, validate_event_name, Button, ButtonStyle, ChannelKind, ChannelRef, CharacterClass,
    Embed, EmbedField, EventRecord, GuildConfig, JoinPrefill, Member, MessageRef, OutgoingMessage,
    PlayerRole, Reply, Roster, Upsert,
};
pub use error::{DomainError, PlatformError, StoreError};
pub use traits::{
    ChannelEdit, ChatPlatform, Clock, EventStore, EventStoreExt, InteractionHandle, NewChannel,
    PlatformResult, RecordKind, StoreResult, StoredRecord, SystemClock,
};
pub use value_objects::{OverwriteTarget, PermissionOverwrite, Permissions, Snowflake};
