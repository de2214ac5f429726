//! Domain entities - core business objects

mod channel;
mod event;
mod guild_config;
mod member;
mod message;

pub use channel::{ChannelKind, ChannelRef};
pub use event::{validate_event_name, EventRecord, MAX_EVENT_NAME_LEN};
pub use guild_config::GuildConfig;
pub use member::{CharacterClass, Member, PlayerRole, Roster, UnknownValue, Upsert};
pub use message::{
    custom_id, Button, ButtonStyle, Embed, EmbedField, JoinPrefill, MessageRef, OutgoingMessage,
    Reply,
};
