//! Storage Layer - content-addressed backends
//!
//! Every object is immutable and addressed by a [`ContentId`]. An object
//! holds one named entry; reads open the entry by file name.
//!
//! Backends:
//! - `HttpStore`: web3.storage upload API plus an IPFS gateway for reads
//! - `MemoryStore`: in-process store for development and tests

pub mod adapter;
pub mod http;
pub mod memory;
mod retry;

pub use adapter::StorageAdapter;
pub use http::{DEFAULT_MAX_ENTRY_BYTES, HttpStore, HttpStoreConfig};
pub use memory::MemoryStore;
pub use retry::RetryPolicy;

use crate::Result;
use crate::content_id::ContentId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Capability over a remote content-addressable backend.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Bytes of entry `file_name` inside the object addressed by `id`.
    ///
    /// `Ok(None)` when either the object or the entry does not exist.
    async fn fetch(&self, id: &ContentId, file_name: &str) -> Result<Option<Vec<u8>>>;

    /// Upload the staged file as a new object with one entry named `file_name`.
    async fn put(&self, file_name: &str, staged: &Path) -> Result<ContentId>;
}

/// File name to string content, as produced by a successful read.
///
/// A present but empty entry maps to `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredItem(BTreeMap<String, String>);

impl StoredItem {
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(file_name.into(), content.into());
        Self(entries)
    }

    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.0.get(file_name).map(String::as_str)
    }

    /// True when the entry is missing or has zero length
    pub fn is_empty_entry(&self, file_name: &str) -> bool {
        self.get(file_name).is_none_or(str::is_empty)
    }
}
