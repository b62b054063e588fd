//! Convenient re-exports of commonly used types from sitelayer.
//!
//! ```ignore
//! use sitelayer::prelude::*;
//! ```

pub use sitelayer_core::{
    collection::Collection,
    store::{DocumentStore, DynDocumentStore, IntoDynDocumentStore},
    document::{Document, DocumentExt},
    backend::{StoreBackend, DynStoreBackend, StoreBackendBuilder, IndexKind},
    query::{Query, QueryVisitor, Expr, Sort, SortDirection, FieldOp, GeoShape, Position, QueryBuilder, Filter},
    page::{Page, PaginationParams},
    error::{DocumentStoreError, DocumentStoreResult},
};
