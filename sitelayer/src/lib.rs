//! Main sitelayer crate providing a unified interface over the document layer.
//!
//! This crate re-exports the core types from `sitelayer-core` and gives access to the
//! storage backends.
//!
//! # Features
//!
//! - **Filter expressions** - Equality, ranges, case-insensitive patterns and geo containment
//! - **Multiple backends** - In-memory storage always, MongoDB behind the `mongodb` feature
//! - **Runtime selection** - Box any backend into a [`store::DynDocumentStore`]
//!
//! # Quick Start
//!
//! ```ignore
//! use sitelayer::{prelude::*, memory::InMemoryStore};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = DocumentStore::new(InMemoryStore::builder().build().await.unwrap()).into_dyn();
//!     let projects = store.collection("project");
//!
//!     projects
//!         .create(doc! { "name": "Halle", "budget": 120.0 })
//!         .await
//!         .unwrap();
//!
//!     let cheap = projects
//!         .list(Some(Filter::range("budget", None, Some(200.0.into()))), 50, 0, Vec::new())
//!         .await
//!         .unwrap();
//!
//!     println!("{cheap:?}");
//!
//!     store.shutdown().await.unwrap();
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - `mongodb` - Persistent MongoDB backend (requires the `mongodb` feature)

pub mod prelude;

pub use sitelayer_core::{collection, document, store, backend, query, page, error};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use sitelayer_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use sitelayer_mongodb::{MongoDbStore, MongoDbStoreBuilder, query::compile_filter};
}
