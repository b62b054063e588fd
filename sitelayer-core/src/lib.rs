//! Core of the sitelayer document layer: a thin abstraction over JSON document stores
//! tailored to querying project records.
//!
//! This crate provides:
//!
//! - **Document traits** ([`document`]) - Typed documents and identifier normalization
//! - **Store backend abstraction** ([`backend`]) - Traits for implementing different storage backends
//! - **Filter expressions** ([`query`]) - Tagged expression tree with equality, range, pattern and geo predicates
//! - **Collections interface** ([`collection`]) - The `create` / `list` / `count` adapter used by the service
//! - **Document store** ([`store`]) - Owned handle over a static or dynamically dispatched backend
//! - **Error handling** ([`error`]) - Error types and result types
//! - **Pagination** ([`page`]) - Clamped page requests and the response envelope
//!
//! # Example
//!
//! ```ignore
//! use sitelayer_core::{query::Filter, store::DocumentStore};
//!
//! let store = DocumentStore::new(backend);
//! let projects = store.collection("project");
//!
//! let items = projects
//!     .list(Some(Filter::eq("status", "travaux")), 50, 0, Vec::new())
//!     .await?;
//! let total = projects.count(Some(&Filter::eq("status", "travaux"))).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as sitelayer_core;

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod query;
pub mod store;
pub mod page;
