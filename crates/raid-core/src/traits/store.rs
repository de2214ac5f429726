//! Event store port - key-value persistence keyed by (kind, id)
//!
//! Backends move JSON documents; typing happens in [`EventStoreExt`] so the
//! port stays object safe.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::entities::{EventRecord, GuildConfig};
use crate::error::StoreError;
use crate::value_objects::Snowflake;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// What a stored document is, so ids of different kinds never collide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Keyed by guild id
    GuildConfig,
    /// Keyed by channel id
    Event,
}

impl RecordKind {
    /// Prefix for key-value backends (`event:123`)
    pub fn key_prefix(self) -> &'static str {
        match self {
            Self::GuildConfig => "guild_config",
            Self::Event => "event",
        }
    }

    /// Type name for file backends (`EventRecord-123.json`)
    pub fn type_name(self) -> &'static str {
        match self {
            Self::GuildConfig => "GuildConfig",
            Self::Event => "EventRecord",
        }
    }

    pub fn key(self, id: Snowflake) -> String {
        format!("{}:{}", self.key_prefix(), id)
    }

    pub fn file_name(self, id: Snowflake) -> String {
        format!("{}-{}.json", self.type_name(), id)
    }
}

/// A document type that can live in the store
pub trait StoredRecord: Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: RecordKind;
}

impl StoredRecord for EventRecord {
    const KIND: RecordKind = RecordKind::Event;
}

impl StoredRecord for GuildConfig {
    const KIND: RecordKind = RecordKind::GuildConfig;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Raw JSON document, or `None` when absent
    async fn load_raw(&self, kind: RecordKind, id: Snowflake) -> StoreResult<Option<String>>;

    /// Full overwrite
    async fn save_raw(&self, kind: RecordKind, id: Snowflake, json: String) -> StoreResult<()>;

    /// Deleting an absent document succeeds
    async fn delete(&self, kind: RecordKind, id: Snowflake) -> StoreResult<()>;
}

/// Typed access on top of any [`EventStore`]
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Load a typed record. Documents that fail to parse load as absent.
    async fn load<T: StoredRecord>(&self, id: Snowflake) -> StoreResult<Option<T>> {
        let Some(raw) = self.load_raw(T::KIND, id).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(
                    kind = T::KIND.type_name(),
                    id = %id,
                    error = %e,
                    "Malformed record treated as absent"
                );
                Ok(None)
            }
        }
    }

    async fn save<T: StoredRecord>(&self, id: Snowflake, record: &T) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(record)?;
        self.save_raw(T::KIND, id, json).await
    }

    async fn remove<T: StoredRecord>(&self, id: Snowflake) -> StoreResult<()> {
        self.delete(T::KIND, id).await
    }
}

impl<S: EventStore + ?Sized> EventStoreExt for S {}
