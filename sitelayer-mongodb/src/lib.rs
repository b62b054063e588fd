//! MongoDB backend implementation for sitelayer.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait.
//! Filter expressions are compiled into native MongoDB query documents, so text
//! patterns, ranges and `$geoWithin` predicates run inside the database.
//!
//! To use this backend through the facade crate, enable its `mongodb` feature:
//!
//! ```toml
//! [dependencies]
//! sitelayer = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Connection
//!
//! The client is built once from a connection string and a database name and then
//! shared; the driver manages its own connection pool.
//!
//! # Example
//!
//! ```ignore
//! use sitelayer_core::backend::StoreBackendBuilder;
//! use sitelayer_mongodb::MongoDbStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoDbStore::builder("mongodb://localhost:27017", "appdb")
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as sitelayer_mongodb;

pub mod store;
pub mod query;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
