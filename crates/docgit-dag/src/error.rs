//! Error types for the commit graph.

use docgit_docstore::DocStoreError;
use docgit_types::DocId;

/// Errors that can occur during commit graph operations.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// No commit has the requested id.
    #[error("commit not found: {0}")]
    CommitNotFound(DocId),

    /// A commit names a parent that is not older than itself.
    #[error("ordering violation: commit {child} has parent {parent}")]
    OrderingViolation { child: DocId, parent: DocId },

    #[error(transparent)]
    Store(#[from] DocStoreError),
}

/// Convenience alias for commit graph results.
pub type DagResult<T> = Result<T, DagError>;
