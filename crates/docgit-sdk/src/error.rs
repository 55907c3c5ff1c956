use thiserror::Error;

use docgit_dag::DagError;
use docgit_docstore::DocStoreError;
use docgit_index::IndexError;
use docgit_refs::RefError;
use docgit_store::StoreError;
use docgit_types::DocId;

/// Errors surfaced by [`Repository`](crate::Repository).
///
/// The variants callers are expected to handle are lifted out of the
/// component errors: an unknown ref becomes [`RepoError::NoBranch`] whatever
/// layer noticed it, a lost ref race becomes
/// [`RepoError::ConcurrentModification`], and so on.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The named branch or tag does not exist.
    #[error("no such branch or tag: {0}")]
    NoBranch(String),

    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("object not found: {0}")]
    ObjectNotFound(DocId),

    /// Another writer advanced the ref first. Retrying is safe.
    #[error("ref {name} was modified concurrently")]
    ConcurrentModification { name: String },

    /// Commits land on branches; HEAD names a tag.
    #[error("cannot commit while tag {0} is checked out")]
    TagCheckedOut(String),

    /// The ref has no commit to point at.
    #[error("ref {0} has no commits")]
    EmptyRef(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("repository lock poisoned")]
    LockPoisoned,

    #[error("store error: {0}")]
    Store(#[source] StoreError),

    #[error("ref error: {0}")]
    Ref(#[source] RefError),

    #[error("index error: {0}")]
    Index(#[source] IndexError),

    #[error("commit graph error: {0}")]
    Dag(#[source] DagError),

    #[error("document store error: {0}")]
    DocStore(#[from] DocStoreError),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl From<StoreError> for RepoError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ObjectNotFound(id) => Self::ObjectNotFound(id),
            StoreError::PathNotFound(path) => Self::PathNotFound(path),
            StoreError::DocStore(e) => Self::DocStore(e),
            other => Self::Store(other),
        }
    }
}

impl From<RefError> for RepoError {
    fn from(e: RefError) -> Self {
        match e {
            RefError::NotFound { name } => Self::NoBranch(name),
            RefError::ConcurrentModification { name } => Self::ConcurrentModification { name },
            RefError::Store(e) => Self::DocStore(e),
            other => Self::Ref(other),
        }
    }
}

impl From<IndexError> for RepoError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::Store(e) => e.into(),
            other => Self::Index(other),
        }
    }
}

impl From<DagError> for RepoError {
    fn from(e: DagError) -> Self {
        match e {
            DagError::CommitNotFound(id) => Self::ObjectNotFound(id),
            DagError::Store(e) => Self::DocStore(e),
            other => Self::Dag(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_variants_are_lifted() {
        let e: RepoError = RefError::NotFound { name: "dev".into() }.into();
        assert!(matches!(e, RepoError::NoBranch(n) if n == "dev"));

        let e: RepoError = IndexError::Store(StoreError::PathNotFound("/x".into())).into();
        assert!(matches!(e, RepoError::PathNotFound(p) if p == "/x"));

        let e: RepoError = DagError::CommitNotFound(DocId::new(4)).into();
        assert!(matches!(e, RepoError::ObjectNotFound(id) if id == DocId::new(4)));

        let e: RepoError = RefError::TagImmutable { name: "v1".into() }.into();
        assert!(matches!(e, RepoError::Ref(_)));
    }

    #[test]
    fn wrapped_errors_keep_their_source() {
        use std::error::Error as _;

        let e: RepoError = RefError::TagImmutable { name: "v1".into() }.into();
        let source = e.source().map(ToString::to_string);
        assert_eq!(source, Some(RefError::TagImmutable { name: "v1".into() }.to_string()));

        let e: RepoError = StoreError::PathConflict("/a".into()).into();
        assert!(matches!(e, RepoError::Store(_)));
        assert!(e.source().is_some());
    }
}
