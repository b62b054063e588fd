//! Collection adapter used by the service layer.
//!
//! A [`Collection`] binds a collection name to a backend and exposes the three
//! operations the API needs: [`create`](Collection::create), [`list`](Collection::list)
//! and [`count`](Collection::count). Every document leaving this module has its store
//! identifier rendered as a string `id` field; the raw `_id` is never exposed.
//!
//! # Example
//!
//! ```ignore
//! let projects = store.collection("project");
//!
//! let created = projects.create(doc! { "name": "Halle Freyssinet" }).await?;
//! assert!(created.contains_key("id"));
//!
//! let first_page = projects.list(None, 50, 0, Vec::new()).await?;
//! let total = projects.count(None).await?;
//! ```

use tracing::warn;

use crate::{
    backend::{IndexKind, StoreBackend},
    document::{Document, DocumentExt, expose_id},
    error::DocumentStoreResult,
    query::{Expr, Query, Sort},
};

/// A named collection with a reference to a storage backend.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the backend reference
/// * `B` - The storage backend type
#[derive(Debug)]
pub struct Collection<'a, B: StoreBackend> {
    name: String,
    backend: &'a B,
}

impl<'a, B: StoreBackend> Collection<'a, B> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts `fields` and returns the stored document with its new `id`.
    ///
    /// The document is read back by the identifier the backend generated. If that read
    /// finds nothing, the submitted fields are returned unchanged, without an `id`.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if the insert
    /// or the read-back fails.
    pub async fn create(&self, fields: bson::Document) -> DocumentStoreResult<bson::Document> {
        let id = self
            .backend
            .insert_document(fields.clone(), self.name())
            .await?;

        match self.backend.find_document(&id, self.name()).await? {
            Some(stored) => Ok(expose_id(stored)),
            None => {
                warn!(collection = %self.name, %id, "inserted document not found on read-back");
                Ok(fields)
            }
        }
    }

    /// Serializes a typed document and inserts it via [`create`](Collection::create).
    pub async fn create_typed<D: Document>(&self, document: &D) -> DocumentStoreResult<bson::Document> {
        self.create(document.to_document()?).await
    }

    /// Lists documents matching `filter`, skipping `skip` and returning at most `limit`.
    ///
    /// An empty `sort` keeps the backend's natural order.
    pub async fn list(
        &self,
        filter: Option<Expr>,
        limit: u64,
        skip: u64,
        sort: Vec<Sort>,
    ) -> DocumentStoreResult<Vec<bson::Document>> {
        let query = Query::builder()
            .maybe_filter(filter)
            .limit(limit as usize)
            .offset(skip as usize)
            .sort_by(sort)
            .build();

        Ok(self
            .backend
            .query_documents(query, self.name())
            .await?
            .into_iter()
            .map(expose_id)
            .collect())
    }

    /// Counts every document matching `filter`, ignoring pagination.
    pub async fn count(&self, filter: Option<&Expr>) -> DocumentStoreResult<u64> {
        self.backend
            .count_documents(filter.cloned(), self.name())
            .await
    }

    /// Makes sure an index of the given kind exists on `field`.
    pub async fn ensure_index(&self, field: &str, kind: IndexKind) -> DocumentStoreResult<()> {
        self.backend
            .add_index(self.name(), field, kind)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bson::{Bson, doc, oid::ObjectId};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    use crate::query::{Filter, SortDirection};

    /// Append-only backend that ignores filters. `forgetful` drops reads by id.
    #[derive(Debug, Default)]
    struct RecordingBackend {
        documents: Mutex<Vec<bson::Document>>,
        queries: Mutex<Vec<Query>>,
        forgetful: bool,
    }

    #[async_trait]
    impl StoreBackend for RecordingBackend {
        async fn insert_document(
            &self,
            mut document: bson::Document,
            _collection: &str,
        ) -> DocumentStoreResult<Bson> {
            let id = Bson::ObjectId(ObjectId::new());
            document.insert("_id", id.clone());
            self.documents.lock().unwrap().push(document);
            Ok(id)
        }

        async fn find_document(
            &self,
            id: &Bson,
            _collection: &str,
        ) -> DocumentStoreResult<Option<bson::Document>> {
            if self.forgetful {
                return Ok(None);
            }
            Ok(self
                .documents
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.get("_id") == Some(id))
                .cloned())
        }

        async fn query_documents(
            &self,
            query: Query,
            _collection: &str,
        ) -> DocumentStoreResult<Vec<bson::Document>> {
            let documents = self.documents.lock().unwrap().clone();
            let offset = query.offset.unwrap_or(0);
            let limit = query.limit.unwrap_or(usize::MAX);
            self.queries.lock().unwrap().push(query);
            Ok(documents.into_iter().skip(offset).take(limit).collect())
        }

        async fn count_documents(
            &self,
            _filter: Option<Expr>,
            _collection: &str,
        ) -> DocumentStoreResult<u64> {
            Ok(self.documents.lock().unwrap().len() as u64)
        }

        async fn add_index(&self, _: &str, _: &str, _: IndexKind) -> DocumentStoreResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn create_returns_stored_document_with_string_id() {
        let backend = RecordingBackend::default();
        let collection = Collection::new("project".into(), &backend);

        let created = collection.create(doc! { "name": "Halle" }).await.unwrap();

        let id = created.get_str("id").unwrap();
        assert_eq!(id.len(), 24);
        assert!(!created.contains_key("_id"));
        assert_eq!(created.get_str("name").unwrap(), "Halle");
    }

    #[tokio::test]
    async fn create_falls_back_to_submitted_fields_when_read_back_misses() {
        let backend = RecordingBackend { forgetful: true, ..Default::default() };
        let collection = Collection::new("project".into(), &backend);

        let created = collection.create(doc! { "name": "Halle" }).await.unwrap();

        assert_eq!(created, doc! { "name": "Halle" });
    }

    #[tokio::test]
    async fn list_forwards_pagination_and_sort_and_exposes_ids() {
        let backend = RecordingBackend::default();
        let collection = Collection::new("project".into(), &backend);
        for name in ["a", "b", "c"] {
            collection.create(doc! { "name": name }).await.unwrap();
        }

        let listed = collection
            .list(
                Some(Filter::eq("name", "b")),
                1,
                1,
                vec![Sort::new("name", SortDirection::Desc)],
            )
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].get_str("name").unwrap(), "b");
        assert!(listed[0].contains_key("id"));

        let queries = backend.queries.lock().unwrap();
        assert_eq!(queries[0].limit, Some(1));
        assert_eq!(queries[0].offset, Some(1));
        assert_eq!(queries[0].filter, Some(Filter::eq("name", "b")));
        assert_eq!(queries[0].sort, vec![Sort::new("name", SortDirection::Desc)]);
    }

    #[tokio::test]
    async fn count_ignores_pagination() {
        let backend = RecordingBackend::default();
        let collection = Collection::new("project".into(), &backend);
        for name in ["a", "b", "c"] {
            collection.create(doc! { "name": name }).await.unwrap();
        }

        assert_eq!(collection.count(None).await.unwrap(), 3);
    }
}
