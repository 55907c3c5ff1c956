/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum DocStoreError {
    /// A lock guarding the backend was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    Poisoned(String),

    /// A document was not a JSON object or had a malformed reserved field.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Converting between a typed record and a document failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The backend itself reported a failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for document store operations.
pub type DocStoreResult<T> = Result<T, DocStoreError>;
