//! In-memory document store.
//!
//! All operations are synchronous under a `parking_lot::RwLock`; the lock is
//! never held across an `.await`. Collections keep insertion order, which is
//! the default result order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use dealer_core::StoreId;
use parking_lot::RwLock;

use super::{assign_store_id, Document, DocumentStore, Filter, Sort, StoreError};

/// Thread-safe, cloneable in-memory store. Clones share data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<(StoreId, Document)>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        let mut found: Vec<Document> = {
            let guard = self.collections.read();
            guard
                .get(collection)
                .map(|docs| {
                    docs.iter()
                        .filter(|(id, doc)| filter.matches(id, doc))
                        .map(|(_, doc)| doc.clone())
                        .collect()
                })
                .unwrap_or_default()
        };
        if let Some(sort) = sort {
            // Stable: ties keep insertion order.
            found.sort_by(|a, b| sort.compare(a, b));
        }
        if let Some(limit) = limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn insert_many(
        &self,
        collection: &str,
        docs: Vec<Document>,
    ) -> Result<Vec<Document>, StoreError> {
        let prepared = docs
            .into_iter()
            .map(|doc| assign_store_id(collection, doc))
            .collect::<Result<Vec<_>, _>>()?;

        let mut guard = self.collections.write();
        let existing = guard.entry(collection.to_string()).or_default();
        let mut seen: HashSet<StoreId> = existing.iter().map(|(id, _)| *id).collect();
        for (id, _) in &prepared {
            if !seen.insert(*id) {
                return Err(StoreError::DuplicateId {
                    collection: collection.to_string(),
                    id: *id,
                });
            }
        }
        existing.extend(prepared.iter().cloned());
        Ok(prepared.into_iter().map(|(_, doc)| doc).collect())
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut guard = self.collections.write();
        let Some(docs) = guard.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|(id, doc)| !filter.matches(id, doc));
        Ok((before - docs.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
