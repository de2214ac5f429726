use async_trait::async_trait;
use dashmap::DashMap;
use raid_core::{EventStore, RecordKind, Snowflake, StoreResult};

/// In-process store for tests and throwaway runs
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    records: DashMap<(RecordKind, Snowflake), String>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, kind: RecordKind, id: Snowflake) -> bool {
        self.records.contains_key(&(kind, id))
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn load_raw(&self, kind: RecordKind, id: Snowflake) -> StoreResult<Option<String>> {
        Ok(self.records.get(&(kind, id)).map(|r| r.value().clone()))
    }

    async fn save_raw(&self, kind: RecordKind, id: Snowflake, json: String) -> StoreResult<()> {
        self.records.insert((kind, id), json);
        Ok(())
    }

    async fn delete(&self, kind: RecordKind, id: Snowflake) -> StoreResult<()> {
        self.records.remove(&(kind, id));
        Ok(())
    }
}
