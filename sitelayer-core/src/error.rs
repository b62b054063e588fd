//! Errors raised by the document layer.
//!
//! Backends map their driver failures onto [`DocumentStoreError`]; nothing here is
//! retried, so every variant reaches the caller as is.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// A value could not be converted between typed, BSON and JSON forms.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The backend could not be set up, e.g. an unparseable connection string.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// Insert collided with an existing identifier: (id, collection).
    #[error("Document {0} already exists in collection {1}")]
    DocumentAlreadyExists(String, String),
    /// A filter can't be compiled or evaluated, e.g. a bad regex pattern.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// The storage backend reported a failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}
