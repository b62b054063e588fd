//! Core traits for document representation and identifier normalization.
//!
//! Typed documents implement [`Document`] and get BSON/JSON conversions through
//! [`DocumentExt`]. Stored documents are handed to callers through
//! [`expose_id`], which replaces the store's `_id` with a string `id` field.

use bson::{Bson, de::deserialize_from_document, ser::serialize_to_document};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DocumentStoreResult;

/// Name of the identifier field inside the store.
pub const STORE_ID_FIELD: &str = "_id";
/// Name of the identifier field exposed to callers.
pub const ID_FIELD: &str = "id";

/// Trait implemented by typed documents written through the store.
///
/// Identifiers are generated by the store, so documents don't carry one.
///
/// # Example
///
/// ```ignore
/// use sitelayer_core::document::Document;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Project {
///     pub name: String,
///     pub budget: f64,
/// }
///
/// impl Document for Project {
///     fn collection_name() -> &'static str {
///         "project"
///     }
/// }
/// ```
pub trait Document: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns the name of the collection this document belongs to.
    fn collection_name() -> &'static str;
}

/// Conversion helpers automatically implemented for every [`Document`].
pub trait DocumentExt: Document {
    /// Converts this document to a BSON document for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the type doesn't serialize to a map.
    fn to_document(&self) -> DocumentStoreResult<bson::Document>;

    /// Creates a typed document from a stored BSON document.
    ///
    /// Extra fields such as `id` are ignored unless the type declares them.
    fn from_document(document: bson::Document) -> DocumentStoreResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_document(&self) -> DocumentStoreResult<bson::Document> {
        Ok(serialize_to_document(self)?)
    }

    fn from_document(document: bson::Document) -> DocumentStoreResult<Self> {
        Ok(deserialize_from_document(document)?)
    }
}

/// Renders a raw store identifier as the string exposed to callers.
///
/// Object ids become their 24-character hex form and string ids are kept as they are.
pub fn render_id(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Moves the store identifier of `document` into a string `id` field.
///
/// Documents without an `_id` are returned unchanged.
pub fn expose_id(mut document: bson::Document) -> bson::Document {
    if let Some(id) = document.remove(STORE_ID_FIELD) {
        document.insert(ID_FIELD, render_id(&id));
    }
    document
}

/// Converts a stored document to plain JSON for API responses.
pub fn to_json(document: &bson::Document) -> DocumentStoreResult<Value> {
    Ok(serde_json::to_value(document)?)
}
