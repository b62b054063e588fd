//! Storage backend abstraction for the document store.
//!
//! This module defines the traits that abstract over different storage implementations,
//! allowing the document store to run against MongoDB in production and an in-memory
//! backend in development and tests.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core trait for storage backends
//! - [`DynStoreBackend`]: Object-safe mirror of [`StoreBackend`] for runtime backend selection
//! - [`StoreBackendBuilder`]: Factory trait for creating backend instances
//!
//! # Identifiers
//!
//! Backends own identifier generation. Documents are handed over without an `_id`,
//! the backend assigns one and returns it from [`StoreBackend::insert_document`].
//! Documents read back from a backend still carry their raw `_id`; rendering it as a
//! string `id` is the job of [`crate::collection::Collection`].

use async_trait::async_trait;
use bson::Bson;
use std::fmt::Debug;

use crate::{
    error::DocumentStoreResult,
    query::{Expr, Query},
};

/// Kind of index a backend should maintain on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Spherical geometry index for GeoJSON values.
    Sphere2d,
}

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// All implementations must be thread-safe and support concurrent access from multiple
/// async tasks.
///
/// # Error Handling
///
/// Operations return [`DocumentStoreResult<T>`](crate::error::DocumentStoreResult).
/// Backends never retry; I/O failures are reported as
/// [`DocumentStoreError::Backend`](crate::error::DocumentStoreError::Backend).
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Inserts a document into a collection and returns the identifier the backend assigned.
    ///
    /// The collection is created implicitly if it doesn't exist.
    async fn insert_document(
        &self,
        document: bson::Document,
        collection: &str,
    ) -> DocumentStoreResult<Bson>;

    /// Fetches one document by its raw identifier.
    ///
    /// Returns `Ok(None)` if no document carries that identifier.
    async fn find_document(
        &self,
        id: &Bson,
        collection: &str,
    ) -> DocumentStoreResult<Option<bson::Document>>;

    /// Queries documents in a collection using a structured query.
    ///
    /// Applies the filter, then the sort specification, then `offset` and `limit`.
    /// Without a sort specification documents come back in store order.
    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<bson::Document>>;

    /// Counts the documents matching `filter`, or all documents when `filter` is `None`.
    async fn count_documents(
        &self,
        filter: Option<Expr>,
        collection: &str,
    ) -> DocumentStoreResult<u64>;

    /// Creates an index on a field if it doesn't exist yet.
    ///
    /// Backends without index support treat this as a no-op.
    async fn add_index(
        &self,
        collection: &str,
        field: &str,
        kind: IndexKind,
    ) -> DocumentStoreResult<()>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
pub trait DynStoreBackend: Send + Sync + Debug {
    async fn insert_document(
        &self,
        document: bson::Document,
        collection: &str,
    ) -> DocumentStoreResult<Bson>;
    async fn find_document(
        &self,
        id: &Bson,
        collection: &str,
    ) -> DocumentStoreResult<Option<bson::Document>>;
    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<bson::Document>>;
    async fn count_documents(
        &self,
        filter: Option<Expr>,
        collection: &str,
    ) -> DocumentStoreResult<u64>;
    async fn add_index(
        &self,
        collection: &str,
        field: &str,
        kind: IndexKind,
    ) -> DocumentStoreResult<()>;
    async fn shutdown_boxed(self: Box<Self>) -> DocumentStoreResult<()>;
}

#[async_trait]
impl<B: StoreBackend + Send + Sync + 'static> DynStoreBackend for B {
    async fn insert_document(
        &self,
        document: bson::Document,
        collection: &str,
    ) -> DocumentStoreResult<Bson> {
        StoreBackend::insert_document(self, document, collection).await
    }

    async fn find_document(
        &self,
        id: &Bson,
        collection: &str,
    ) -> DocumentStoreResult<Option<bson::Document>> {
        StoreBackend::find_document(self, id, collection).await
    }

    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<bson::Document>> {
        StoreBackend::query_documents(self, query, collection).await
    }

    async fn count_documents(
        &self,
        filter: Option<Expr>,
        collection: &str,
    ) -> DocumentStoreResult<u64> {
        StoreBackend::count_documents(self, filter, collection).await
    }

    async fn add_index(
        &self,
        collection: &str,
        field: &str,
        kind: IndexKind,
    ) -> DocumentStoreResult<()> {
        StoreBackend::add_index(self, collection, field, kind).await
    }

    async fn shutdown_boxed(self: Box<Self>) -> DocumentStoreResult<()> {
        StoreBackend::shutdown(*self).await
    }
}

#[async_trait]
impl StoreBackend for Box<dyn DynStoreBackend> {
    async fn insert_document(
        &self,
        document: bson::Document,
        collection: &str,
    ) -> DocumentStoreResult<Bson> {
        DynStoreBackend::insert_document(&**self, document, collection).await
    }

    async fn find_document(
        &self,
        id: &Bson,
        collection: &str,
    ) -> DocumentStoreResult<Option<bson::Document>> {
        DynStoreBackend::find_document(&**self, id, collection).await
    }

    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<bson::Document>> {
        DynStoreBackend::query_documents(&**self, query, collection).await
    }

    async fn count_documents(
        &self,
        filter: Option<Expr>,
        collection: &str,
    ) -> DocumentStoreResult<u64> {
        DynStoreBackend::count_documents(&**self, filter, collection).await
    }

    async fn add_index(
        &self,
        collection: &str,
        field: &str,
        kind: IndexKind,
    ) -> DocumentStoreResult<()> {
        DynStoreBackend::add_index(&**self, collection, field, kind).await
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        DynStoreBackend::shutdown_boxed(self).await
    }
}

#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
