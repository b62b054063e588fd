//! Main document store interface.
//!
//! [`DocumentStore`] owns a backend and hands out [`Collection`] adapters. The backend
//! can be a concrete type or a boxed [`DynStoreBackend`] when it is chosen at runtime
//! from configuration; [`DynDocumentStore`] names the latter.
//!
//! # Example
//!
//! ```ignore
//! use sitelayer_core::store::{DocumentStore, IntoDynDocumentStore};
//!
//! let store = DocumentStore::new(backend).into_dyn();
//! let projects = store.collection("project");
//! ```

use crate::{
    backend::{DynStoreBackend, StoreBackend},
    collection::Collection,
    document::Document,
    error::DocumentStoreResult,
};

/// A document store bound to a backend implementation.
///
/// # Type Parameters
///
/// * `B` - The backend implementation type
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

/// A document store whose backend was selected at runtime.
pub type DynDocumentStore = DocumentStore<Box<dyn DynStoreBackend>>;

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Gets the collection with the given name.
    pub fn collection(&self, name: &str) -> Collection<'_, B> {
        Collection::new(name.to_string(), &self.backend)
    }

    /// Gets the collection a document type is stored in.
    pub fn collection_for<D: Document>(&self) -> Collection<'_, B> {
        self.collection(D::collection_name())
    }

    /// Shuts down the store and releases backend resources.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown operation fails.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.backend.shutdown().await
    }
}

/// Conversion into a [`DynDocumentStore`].
pub trait IntoDynDocumentStore {
    /// Boxes the backend so stores of different backend types share one type.
    fn into_dyn(self) -> DynDocumentStore;
}

impl<B: StoreBackend + 'static> IntoDynDocumentStore for DocumentStore<B> {
    fn into_dyn(self) -> DynDocumentStore {
        DocumentStore::new(Box::new(self.backend) as Box<dyn DynStoreBackend>)
    }
}
