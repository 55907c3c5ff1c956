//! Error types for reference operations.

use docgit_docstore::DocStoreError;
use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The reference was not found.
    #[error("ref not found: {name}")]
    NotFound { name: String },

    /// A reference with this name and kind already exists.
    #[error("ref already exists: {name}")]
    AlreadyExists { name: String },

    /// The reference name is invalid.
    #[error("invalid ref name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A tag is immutable and cannot be updated.
    #[error("tag is immutable: {name}")]
    TagImmutable { name: String },

    /// Another writer advanced the ref since it was read.
    #[error("ref {name} was modified concurrently")]
    ConcurrentModification { name: String },

    /// No HEAD record exists; the table was never initialized.
    #[error("HEAD is missing")]
    HeadMissing,

    #[error(transparent)]
    Store(#[from] DocStoreError),
}

/// Convenience type alias for ref operations.
pub type RefResult<T> = std::result::Result<T, RefError>;
