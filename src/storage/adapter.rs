//! Storage adapter - reads and writes against a [`ContentStore`]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::content_id::ContentId;
use crate::query::{StorageReference, validate_file_name};
use crate::{Error, Result};
use super::{ContentStore, StoredItem};

/// Reads entries by reference and writes new immutable objects.
///
/// Writes are staged to a uniquely named temporary file in `staging_dir`
/// before upload. The staging file is removed when the write returns,
/// whether it succeeded or not.
#[derive(Clone)]
pub struct StorageAdapter {
    store: Arc<dyn ContentStore>,
    staging_dir: PathBuf,
}

impl StorageAdapter {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self::with_staging_dir(store, std::env::temp_dir())
    }

    pub fn with_staging_dir(store: Arc<dyn ContentStore>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            staging_dir: staging_dir.into(),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Read the entry named by `reference` from the object it addresses
    pub async fn read(&self, reference: &StorageReference) -> Result<StoredItem> {
        validate_file_name(&reference.file_name)?;
        let bytes = self
            .store
            .fetch(&reference.content_id, &reference.file_name)
            .await?
            .ok_or_else(|| Error::NotFound {
                file_name: reference.file_name.clone(),
                cid: reference.content_id.to_string(),
            })?;

        tracing::debug!(
            backend = self.store.name(),
            file_name = %reference.file_name,
            cid = %reference.content_id,
            size = bytes.len(),
            "read entry"
        );

        let content = String::from_utf8_lossy(&bytes).into_owned();
        Ok(StoredItem::new(reference.file_name.clone(), content))
    }

    /// Persist `content` as a new object named `file_name` and return its address
    pub async fn write(&self, file_name: &str, content: &str) -> Result<ContentId> {
        validate_file_name(file_name)?;
        let staged = self.stage(content).await?;
        let id = self.store.put(file_name, staged.path()).await?;

        tracing::debug!(
            backend = self.store.name(),
            file_name,
            cid = %id,
            size = content.len(),
            "wrote object"
        );

        // Dropping `staged` removes the file on every path out of this function.
        Ok(id)
    }

    async fn stage(&self, content: &str) -> Result<NamedTempFile> {
        let staging_dir = self.staging_dir.clone();
        let content = content.to_owned();

        tokio::task::spawn_blocking(move || -> Result<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix("cidstore-")
                .suffix(".stage")
                .tempfile_in(&staging_dir)?;
            file.write_all(content.as_bytes())?;
            file.flush()?;
            Ok(file)
        })
        .await
        .map_err(|e| Error::LocalIo(std::io::Error::other(e)))?
    }
}
