//! # cidstore - CRUD-shaped queries over content-addressed storage
//!
//! Translates generic tabular query requests into reads and writes against a
//! content-addressable backend, where every stored item is addressed by a
//! content identifier (CID) plus a logical file name.
//!
//! cidstore provides:
//! - A total codec for textual content identifiers
//! - Query parameter extraction into typed storage references
//! - A storage adapter over pluggable backends (web3.storage over HTTP, in-memory)
//! - Six command handlers: exist, select-row, select-all, insert, delete, update
//! - A reply envelope and an HTTP command router

pub mod content_id;
pub mod query;
pub mod storage;
pub mod reply;
pub mod handlers;
pub mod command;
pub mod server;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use content_id::ContentId;
pub use query::{QueryRequest, StorageReference};
pub use storage::{ContentStore, StorageAdapter, StoredItem};
pub use reply::{Reply, ReplyEnvelope};
pub use handlers::{CommandError, QueryService};
pub use command::Command;

/// Result type alias for cidstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cidstore operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    ShapeMismatch(String),

    #[error("required at least 1 field, but query is empty")]
    EmptyRequest,

    #[error("index {index} is out of range ({fields} fields, {tables} tables)")]
    IndexOutOfRange {
        index: usize,
        fields: usize,
        tables: usize,
    },

    #[error("the '{text}' table is invalid cid: {reason}")]
    InvalidIdentifier { text: String, reason: String },

    #[error("{0}")]
    InvalidArgumentType(String),

    #[error("'{file_name}' is not a valid file name: {reason}")]
    InvalidFileName {
        file_name: String,
        reason: &'static str,
    },

    #[error("file {file_name} not found in {cid} cid")]
    NotFound { file_name: String, cid: String },

    #[error("storage backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("local IO error: {0}")]
    LocalIo(#[from] std::io::Error),

    #[error("storage backend is not initialized")]
    BackendUninitialized,
}
