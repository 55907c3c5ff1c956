use docgit_store::StoreError;
use docgit_types::TypeError;
use thiserror::Error;

/// Errors that can occur during staging.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The parent path or file name is malformed.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] TypeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience type alias for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
