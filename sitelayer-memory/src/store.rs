//! In-memory storage implementation for document stores.
//!
//! Documents are kept per collection in insertion order behind an async-safe
//! read-write lock.

use std::{collections::HashMap, sync::Arc};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, oid::ObjectId};

use sitelayer_core::{
    backend::{IndexKind, StoreBackend, StoreBackendBuilder},
    document::{STORE_ID_FIELD, render_id},
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Expr, Query},
};

use crate::evaluator::{DocumentEvaluator, compare_documents};

type CollectionDocs = Vec<bson::Document>;
type StoreMap = HashMap<String, CollectionDocs>;


/// Thread-safe in-memory document storage backend.
///
/// # Thread Safety
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, allowing
/// it to be safely shared across async tasks. Clones share the same underlying data.
///
/// # Performance
///
/// Queries scan every document of the collection; indexes are accepted and ignored.
///
/// # Example
///
/// ```ignore
/// use sitelayer_memory::InMemoryStore;
/// use sitelayer_core::backend::StoreBackend;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// let id = store.insert_document(doc! { "name": "Halle" }, "project").await?;
/// let stored = store.find_document(&id, "project").await?;
/// assert!(stored.is_some());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection_name -> documents in insertion order, each carrying its `_id`
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    fn matching(documents: &CollectionDocs, filter: Option<&Expr>) -> DocumentStoreResult<CollectionDocs> {
        match filter {
            Some(filter) => DocumentEvaluator::filter_documents(documents, filter),
            None => Ok(documents.clone()),
        }
    }
}


#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn insert_document(&self, mut document: bson::Document, collection: &str) -> DocumentStoreResult<Bson> {
        let id = match document.get(STORE_ID_FIELD) {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                document.insert(STORE_ID_FIELD, id.clone());
                id
            }
        };

        let mut store = self.store.write().await;
        let documents = store
            .entry(collection.to_string())
            .or_default();

        if documents.iter().any(|doc| doc.get(STORE_ID_FIELD) == Some(&id)) {
            return Err(DocumentStoreError::DocumentAlreadyExists(render_id(&id), collection.to_string()));
        }

        documents.push(document);

        Ok(id)
    }

    async fn find_document(&self, id: &Bson, collection: &str) -> DocumentStoreResult<Option<bson::Document>> {
        Ok(
            self.store
                .read()
                .await
                .get(collection)
                .and_then(|documents| {
                    documents
                        .iter()
                        .find(|doc| doc.get(STORE_ID_FIELD) == Some(id))
                        .cloned()
                })
        )
    }

    async fn query_documents(&self, query: Query, collection: &str) -> DocumentStoreResult<Vec<bson::Document>> {
        let store = self.store.read().await;
        let Some(documents) = store.get(collection) else {
            return Ok(vec![]);
        };

        let mut matched = Self::matching(documents, query.filter.as_ref())?;

        if !query.sort.is_empty() {
            matched.sort_by(|a, b| compare_documents(a, b, &query.sort));
        }

        Ok(
            matched
                .into_iter()
                .skip(query.offset.unwrap_or(0))
                .take(query.limit.unwrap_or(usize::MAX))
                .collect()
        )
    }

    async fn count_documents(&self, filter: Option<Expr>, collection: &str) -> DocumentStoreResult<u64> {
        let store = self.store.read().await;
        let Some(documents) = store.get(collection) else {
            return Ok(0);
        };

        Ok(Self::matching(documents, filter.as_ref())?.len() as u64)
    }

    async fn add_index(&self, _collection: &str, _field: &str, _kind: IndexKind) -> DocumentStoreResult<()> {
        // In-memory store does not support indexing (no-op)
        Ok(())
    }
}


/// Builder for constructing [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new, empty [`InMemoryStore`].
    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use pretty_assertions::assert_eq;
    use sitelayer_core::query::{Filter, SortDirection};

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        for (name, budget) in [("b", 300.0), ("a", 100.0), ("c", 200.0), ("d", 100.0)] {
            store
                .insert_document(doc! { "name": name, "budget": budget }, "project")
                .await
                .unwrap();
        }
        store
    }

    fn names(documents: &[bson::Document]) -> Vec<&str> {
        documents.iter().map(|d| d.get_str("name").unwrap()).collect()
    }

    #[tokio::test]
    async fn insert_assigns_object_ids_and_find_reads_them_back() {
        let store = InMemoryStore::new();

        let id = store.insert_document(doc! { "name": "a" }, "project").await.unwrap();
        let stored = store.find_document(&id, "project").await.unwrap().unwrap();

        assert!(matches!(id, Bson::ObjectId(_)));
        assert_eq!(stored.get("_id"), Some(&id));
        assert_eq!(store.find_document(&Bson::ObjectId(ObjectId::new()), "project").await.unwrap(), None);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let store = InMemoryStore::new();
        store.insert_document(doc! { "_id": "x" }, "project").await.unwrap();

        let result = store.insert_document(doc! { "_id": "x" }, "project").await;

        assert!(matches!(result, Err(DocumentStoreError::DocumentAlreadyExists(id, _)) if id == "x"));
    }

    #[tokio::test]
    async fn unsorted_queries_keep_insertion_order_and_paginate() {
        let store = seeded().await;

        let page = store
            .query_documents(Query::builder().offset(1).limit(2).build(), "project")
            .await
            .unwrap();

        assert_eq!(names(&page), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn sorts_by_multiple_keys() {
        let store = seeded().await;

        let sorted = store
            .query_documents(
                Query::builder()
                    .sort("budget", SortDirection::Asc)
                    .sort("name", SortDirection::Desc)
                    .build(),
                "project",
            )
            .await
            .unwrap();

        assert_eq!(names(&sorted), vec!["d", "a", "c", "b"]);
    }

    #[tokio::test]
    async fn count_applies_filter_but_not_pagination() {
        let store = seeded().await;
        let filter = Filter::range("budget", Some(Bson::Double(100.0)), Some(Bson::Double(200.0)));

        assert_eq!(store.count_documents(Some(filter), "project").await.unwrap(), 3);
        assert_eq!(store.count_documents(None, "project").await.unwrap(), 4);
        assert_eq!(store.count_documents(None, "missing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_collections_are_empty() {
        let store = InMemoryStore::new();

        assert!(store.query_documents(Query::new(), "missing").await.unwrap().is_empty());
    }
}
