use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

use crate::dao::storage::{SlotStore, StorageError, StorageResult};

const SLOT_EXTENSION: &str = "json";

/// Failures that can occur while touching slot files.
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// The data directory could not be created.
    #[error("failed to create data directory `{path}`")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A slot file exists but could not be read.
    #[error("failed to read slot file `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Writing or renaming the slot file failed.
    #[error("failed to write slot file `{path}`")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Removing the slot file failed.
    #[error("failed to remove slot file `{path}`")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<FileStoreError> for StorageError {
    fn from(err: FileStoreError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}

/// Slot store keeping one file per slot inside a data directory.
#[derive(Debug, Clone)]
pub struct FileSlotStore {
    dir: Arc<PathBuf>,
}

impl FileSlotStore {
    /// Open the store, creating the data directory when missing.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, FileStoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| FileStoreError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        Ok(Self { dir: Arc::new(dir) })
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{SLOT_EXTENSION}"))
    }
}

impl SlotStore for FileSlotStore {
    fn read(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let path = self.slot_path(key);
        Box::pin(async move {
            match fs::read_to_string(&path).await {
                Ok(contents) => Ok(Some(contents)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(source) => Err(FileStoreError::Read { path, source }.into()),
            }
        })
    }

    fn write(&self, key: &str, value: String) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.slot_path(key);
        Box::pin(async move {
            // Write next to the slot then rename so readers never see a partial file.
            let temp_path = path.with_extension("tmp");
            fs::write(&temp_path, value.as_bytes())
                .await
                .map_err(|source| FileStoreError::Write {
                    path: temp_path.clone(),
                    source,
                })?;
            fs::rename(&temp_path, &path)
                .await
                .map_err(|source| FileStoreError::Write {
                    path: path.clone(),
                    source,
                })?;
            debug!(path = %path.display(), bytes = value.len(), "slot written");
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.slot_path(key);
        Box::pin(async move {
            match fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(source) => Err(FileStoreError::Remove { path, source }.into()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_slot_reads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::open(temp_dir.path()).await.unwrap();
        assert_eq!(store.read("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn written_slot_is_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::open(temp_dir.path().join("nested"))
            .await
            .unwrap();

        store.write("greeting", "hello".into()).await.unwrap();
        store.write("greeting", "bonjour".into()).await.unwrap();

        assert_eq!(
            store.read("greeting").await.unwrap().as_deref(),
            Some("bonjour")
        );
        assert!(!temp_dir.path().join("nested/greeting.tmp").exists());
    }

    #[tokio::test]
    async fn removing_twice_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::open(temp_dir.path()).await.unwrap();
        store.write("slot", "1".into()).await.unwrap();

        store.remove("slot").await.unwrap();
        store.remove("slot").await.unwrap();
        assert_eq!(store.read("slot").await.unwrap(), None);
    }
}
