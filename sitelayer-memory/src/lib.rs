//! In-memory document storage backend for sitelayer.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It uses async-aware read-write locks for concurrent access and is meant for development
//! and tests, where it stands in for MongoDB with the same filter semantics.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Insertion order** - Unsorted queries return documents in the order they were inserted
//! - **Full filter support** - Equality, ranges, case-insensitive patterns, box and polygon containment
//! - **Generated identifiers** - Object ids are assigned on insert, like MongoDB does
//!
//! # Quick Start
//!
//! ```ignore
//! use sitelayer_core::store::DocumentStore;
//! use sitelayer_memory::InMemoryStore;
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::new(InMemoryStore::new());
//!     let created = store
//!         .collection("project")
//!         .create(doc! { "name": "Halle" })
//!         .await?;
//!
//!     println!("{}", created.get_str("id")?);
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as sitelayer_memory;

pub mod store;
pub mod evaluator;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
