//! Command handlers
//!
//! One method per command on [`QueryService`]. Every handler is built from
//! the same three steps: validate the request shape, resolve storage
//! references, call the storage adapter. delete and update share those
//! steps with exist and insert through the private helpers below rather
//! than calling each other's entry points.

use crate::query::{self, QueryRequest, StorageReference};
use crate::reply::{
    DeleteReply, ExistReply, InsertReply, SelectAllReply, SelectRowReply, UpdateReply,
};
use crate::storage::StorageAdapter;
use crate::Error;

/// Step names prefixed to failure messages
pub mod step {
    pub const BACKEND: &str = "backend";
    pub const VALIDATE_SHAPE: &str = "validate_shape";
    pub const RESOLVE_REFERENCE: &str = "resolve_reference";
    pub const EXTRACT_PAYLOAD: &str = "extract_payload";
    pub const READ: &str = "read";
    pub const WRITE: &str = "write";
}

/// A handler failure: the step that failed and why.
#[derive(Debug, thiserror::Error)]
#[error("{step}: {source}")]
pub struct CommandError {
    step: &'static str,
    #[source]
    source: Error,
}

impl CommandError {
    pub fn new(step: &'static str, source: Error) -> Self {
        Self { step, source }
    }

    pub fn step(&self) -> &'static str {
        self.step
    }

    pub fn kind(&self) -> &Error {
        &self.source
    }
}

trait AtStep<T> {
    fn at(self, step: &'static str) -> Result<T, CommandError>;
}

impl<T> AtStep<T> for crate::Result<T> {
    fn at(self, step: &'static str) -> Result<T, CommandError> {
        self.map_err(|e| CommandError::new(step, e))
    }
}

/// Runs commands against an injected storage adapter.
///
/// Built once at startup and shared read-only by every request. A service
/// built with [`QueryService::uninitialized`] fails every command with
/// [`Error::BackendUninitialized`] without touching storage.
#[derive(Clone)]
pub struct QueryService {
    adapter: Option<StorageAdapter>,
}

impl QueryService {
    pub fn new(adapter: StorageAdapter) -> Self {
        Self { adapter: Some(adapter) }
    }

    pub fn uninitialized() -> Self {
        Self { adapter: None }
    }

    fn adapter(&self) -> Result<&StorageAdapter, CommandError> {
        self.adapter
            .as_ref()
            .ok_or_else(|| CommandError::new(step::BACKEND, Error::BackendUninitialized))
    }

    /// Whether the single referenced entry has non-empty content
    pub async fn exist(&self, request: &QueryRequest) -> Result<ExistReply, CommandError> {
        let adapter = self.adapter()?;
        let reference = single_reference(request)?;
        let exists = entry_exists(adapter, &reference).await?;

        tracing::debug!(command = "exist", file_name = %reference.file_name, cid = %reference.content_id, exists);
        Ok(ExistReply { exists })
    }

    /// Content of the single referenced entry
    pub async fn select_row(&self, request: &QueryRequest) -> Result<SelectRowReply, CommandError> {
        let adapter = self.adapter()?;
        let reference = single_reference(request)?;
        let outputs = adapter.read(&reference).await.at(step::READ)?;

        tracing::debug!(command = "select-row", file_name = %reference.file_name, cid = %reference.content_id);
        Ok(SelectRowReply { outputs })
    }

    /// Content of every referenced entry, in request order.
    ///
    /// The first failing row fails the whole command.
    pub async fn select_all(&self, request: &QueryRequest) -> Result<SelectAllReply, CommandError> {
        let adapter = self.adapter()?;
        query::validate_shape(request, 0).at(step::VALIDATE_SHAPE)?;

        let mut rows = Vec::with_capacity(request.fields.len());
        for index in 0..request.fields.len() {
            let reference = query::resolve_reference_at(request, index).at(step::RESOLVE_REFERENCE)?;
            rows.push(adapter.read(&reference).await.at(step::READ)?);
        }

        tracing::debug!(command = "select-all", rows = rows.len());
        Ok(SelectAllReply { rows })
    }

    /// Store a new object from one file name and one string argument
    pub async fn insert(&self, request: &QueryRequest) -> Result<InsertReply, CommandError> {
        let adapter = self.adapter()?;
        let id = write_payload(adapter, request).await?;

        tracing::debug!(command = "insert", cid = %id);
        Ok(InsertReply { id })
    }

    /// Overwrite the referenced entry with empty content.
    ///
    /// The object behind the original identifier is immutable and stays
    /// resolvable; the reply carries the address of a new, empty object.
    pub async fn delete(&self, request: &QueryRequest) -> Result<DeleteReply, CommandError> {
        let adapter = self.adapter()?;
        let reference = single_reference(request)?;

        let existed = entry_exists(adapter, &reference).await?;
        let id = adapter
            .write(&reference.file_name, "")
            .await
            .at(step::WRITE)?
            .to_string();

        tracing::debug!(command = "delete", file_name = %reference.file_name, previous = %reference.content_id, existed, cid = %id);
        Ok(DeleteReply { id })
    }

    /// Same rules and write path as insert, tagged as an update
    pub async fn update(&self, request: &QueryRequest) -> Result<UpdateReply, CommandError> {
        let adapter = self.adapter()?;
        let id = write_payload(adapter, request).await?;

        tracing::debug!(command = "update", cid = %id);
        Ok(UpdateReply { id })
    }
}

fn single_reference(request: &QueryRequest) -> Result<StorageReference, CommandError> {
    query::validate_shape(request, 1).at(step::VALIDATE_SHAPE)?;
    query::resolve_reference_at(request, 0).at(step::RESOLVE_REFERENCE)
}

/// Empty content and a missing entry both count as "does not exist".
async fn entry_exists(adapter: &StorageAdapter, reference: &StorageReference) -> Result<bool, CommandError> {
    match adapter.read(reference).await {
        Ok(item) => Ok(!item.is_empty_entry(&reference.file_name)),
        Err(Error::NotFound { .. }) => Ok(false),
        Err(e) => Err(CommandError::new(step::READ, e)),
    }
}

async fn write_payload(adapter: &StorageAdapter, request: &QueryRequest) -> Result<String, CommandError> {
    let payload = query::extract_write_payload(request).at(step::EXTRACT_PAYLOAD)?;
    let id = adapter
        .write(&payload.file_name, &payload.content)
        .await
        .at(step::WRITE)?;
    Ok(id.to_string())
}
