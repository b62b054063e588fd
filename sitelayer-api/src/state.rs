//! Application state management

use std::sync::Arc;

use sitelayer::prelude::DynDocumentStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: DynDocumentStore,
}

impl AppState {
    pub fn new(store: DynDocumentStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store }),
        }
    }

    /// Get the document store
    pub fn store(&self) -> &DynDocumentStore {
        &self.inner.store
    }

    /// Takes the store back once every other handle to the state is gone.
    pub fn into_store(self) -> Option<DynDocumentStore> {
        Arc::try_unwrap(self.inner).ok().map(|inner| inner.store)
    }
}
