//! Ports - what the domain needs from the outside world

mod clock;
mod platform;
mod store;

pub use clock::{Clock, SystemClock};
pub use platform::{ChannelEdit, ChatPlatform, InteractionHandle, NewChannel, PlatformResult};
pub use store::{EventStore, EventStoreExt, RecordKind, StoreResult, StoredRecord};
