//! Redis-backed event store. Documents live under `{kind}:{id}` keys,
//! optionally behind a namespace prefix.

use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use raid_common::StoreConfig;
use raid_core::{EventStore, RecordKind, Snowflake, StoreError, StoreResult};
use redis::AsyncCommands;
use tracing::{debug, info, instrument};

fn backend_error(err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Strip credentials before a URL goes into a log line
fn redacted(url: &str) -> &str {
    url.rsplit('@').next().unwrap_or(url)
}

#[derive(Clone)]
pub struct RedisEventStore {
    pool: Pool,
    namespace: Option<String>,
}

impl std::fmt::Debug for RedisEventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisEventStore")
            .field("namespace", &self.namespace)
            .field("pool", &self.pool.status())
            .finish()
    }
}

impl RedisEventStore {
    /// Build the connection pool. deadpool connects lazily, so an unreachable
    /// server only shows up on the first call.
    pub fn connect(url: &str, max_connections: usize) -> StoreResult<Self> {
        let pool = Config::from_url(url)
            .builder()
            .map_err(backend_error)?
            .max_size(max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(backend_error)?;

        info!(url = %redacted(url), max_connections, "Redis pool created");
        Ok(Self {
            pool,
            namespace: None,
        })
    }

    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        let url = config
            .redis_url
            .as_deref()
            .ok_or_else(|| StoreError::Backend("store.redis_url is not set".to_string()))?;
        Self::connect(url, config.max_connections as usize)
    }

    /// Prefix every key, for several bots sharing one Redis
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    fn key(&self, kind: RecordKind, id: Snowflake) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}:{}", kind.key(id)),
            None => kind.key(id),
        }
    }

    async fn conn(&self) -> StoreResult<Connection> {
        self.pool.get().await.map_err(backend_error)
    }
}

#[async_trait]
impl EventStore for RedisEventStore {
    #[instrument(skip(self), fields(kind = kind.key_prefix()))]
    async fn load_raw(&self, kind: RecordKind, id: Snowflake) -> StoreResult<Option<String>> {
        let mut conn = self.conn().await?;
        conn.get(self.key(kind, id)).await.map_err(backend_error)
    }

    #[instrument(skip(self, json), fields(kind = kind.key_prefix()))]
    async fn save_raw(&self, kind: RecordKind, id: Snowflake, json: String) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        conn.set::<_, _, ()>(self.key(kind, id), json)
            .await
            .map_err(backend_error)?;
        debug!(id = %id, "Record saved");
        Ok(())
    }

    #[instrument(skip(self), fields(kind = kind.key_prefix()))]
    async fn delete(&self, kind: RecordKind, id: Snowflake) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        let removed: i64 = conn.del(self.key(kind, id)).await.map_err(backend_error)?;
        debug!(id = %id, existed = removed > 0, "Record deleted");
        Ok(())
    }
}
