//! In-memory content-addressed store using DashMap.
//!
//! Objects are keyed by [`ContentId::for_object`], so identical
//! `(file name, content)` uploads land on the same address. Nothing is
//! persisted; data is lost when the process exits.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::Result;
use crate::content_id::ContentId;
use super::ContentStore;

/// In-process [`ContentStore`] implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: DashMap<ContentId, BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct objects stored
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch(&self, id: &ContentId, file_name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .objects
            .get(id)
            .and_then(|object| object.get(file_name).cloned()))
    }

    async fn put(&self, file_name: &str, staged: &Path) -> Result<ContentId> {
        let content = tokio::fs::read(staged).await?;
        let id = ContentId::for_object(file_name, &content)?;

        self.objects
            .entry(id)
            .or_insert_with(|| BTreeMap::from([(file_name.to_string(), content)]));
        Ok(id)
    }
}
