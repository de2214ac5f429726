//! # raid-store
//!
//! Event store backends: one JSON file per record, Redis, and in-memory.

mod file_store;
mod memory_store;
mod redis_store;

use std::sync::Arc;

use raid_common::{StoreBackend, StoreConfig};
use raid_core::{EventStore, StoreError};

pub use file_store::FileEventStore;
pub use memory_store::MemoryEventStore;
pub use redis_store::RedisEventStore;

/// Shared store handle
pub type SharedEventStore = Arc<dyn EventStore>;

/// Open the backend selected in configuration
pub async fn open_store(config: &StoreConfig) -> Result<SharedEventStore, StoreError> {
    let store: SharedEventStore = match config.backend {
        StoreBackend::File => Arc::new(FileEventStore::open(&config.folder).await?),
        StoreBackend::Memory => Arc::new(MemoryEventStore::new()),
        StoreBackend::Redis => Arc::new(RedisEventStore::from_config(config)?),
    };
    tracing::info!(backend = ?config.backend, "Event store ready");
    Ok(store)
}
