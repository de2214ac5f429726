//! JSON file per record: `{folder}/{TypeName}-{id}.json`

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use raid_core::{EventStore, RecordKind, Snowflake, StoreResult};
use tokio::fs;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct FileEventStore {
    folder: PathBuf,
}

impl FileEventStore {
    /// Use `folder`, creating it if needed
    pub async fn open(folder: impl Into<PathBuf>) -> StoreResult<Self> {
        let folder = folder.into();
        fs::create_dir_all(&folder).await?;
        debug!(folder = %folder.display(), "File store opened");
        Ok(Self { folder })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn path(&self, kind: RecordKind, id: Snowflake) -> PathBuf {
        self.folder.join(kind.file_name(id))
    }
}

#[async_trait]
impl EventStore for FileEventStore {
    #[instrument(skip(self), fields(kind = kind.type_name()))]
    async fn load_raw(&self, kind: RecordKind, id: Snowflake) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path(kind, id)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, json), fields(kind = kind.type_name()))]
    async fn save_raw(&self, kind: RecordKind, id: Snowflake, json: String) -> StoreResult<()> {
        // Readers never observe a half-written record
        let path = self.path(kind, id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(kind = kind.type_name()))]
    async fn delete(&self, kind: RecordKind, id: Snowflake) -> StoreResult<()> {
        match fs::remove_file(self.path(kind, id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
