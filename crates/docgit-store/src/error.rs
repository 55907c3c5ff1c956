use docgit_docstore::DocStoreError;
use docgit_types::{DocId, TypeError};

use crate::object::ObjectKind;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No object has the requested id.
    #[error("object not found: {0}")]
    ObjectNotFound(DocId),

    /// A path does not resolve inside a tree.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// The object exists but is of the wrong kind.
    #[error("object {id} is a {actual}, expected a {expected}")]
    UnexpectedKind {
        id: DocId,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// A file and a directory would share a path.
    #[error("path conflict: {0} is already taken by a file or directory")]
    PathConflict(String),

    /// Attempted to mutate a frozen tree.
    #[error("tree {0} is frozen")]
    FrozenTree(DocId),

    /// A stored document cannot be decoded as an object.
    #[error("corrupt object {id}: {reason}")]
    Corrupt { id: DocId, reason: String },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    DocStore(#[from] DocStoreError),
}

/// Result alias for object store operations.
pub type StoreResult<T> = Result<T, StoreError>;
