//! High-level SDK for docgit.
//!
//! [`Repository`] ties the object store, staging index, ref table, and
//! commit graph together over one [`DocumentStore`]. It is the main entry
//! point for applications embedding docgit.
//!
//! ```
//! use docgit_sdk::{CommitOutcome, Repository};
//!
//! let repo = Repository::in_memory().unwrap();
//! repo.add("/", "notes", "first draft").unwrap();
//! let CommitOutcome::Committed(c1) = repo.commit("draft").unwrap() else { unreachable!() };
//! repo.add("/", "notes", "second draft").unwrap();
//! let CommitOutcome::Committed(c2) = repo.commit("revise").unwrap() else { unreachable!() };
//!
//! let diff = repo.diff("/notes", c1.id, c2.id).unwrap();
//! assert_eq!(diff.deletions(), 1);
//! assert_eq!(repo.log(None).unwrap().len(), 2);
//! ```

pub mod config;
pub mod error;
pub mod outcome;
pub mod repository;

pub use config::RepositoryConfig;
pub use error::{RepoError, RepoResult};
pub use outcome::{CommitOutcome, IndexSnapshot, StatusReport};
pub use repository::Repository;

// Re-export key types
pub use docgit_dag::{Commit, CommitWalk};
pub use docgit_diff::{extract_diff, DiffLine, FieldChange, LineDiff, TreeChange, TreeDiff};
pub use docgit_docstore::{DocumentStore, InMemoryDocumentStore};
pub use docgit_index::{StageAction, StageOutcome, StagedChange};
pub use docgit_refs::{Head, Ref, RefKind};
pub use docgit_store::{Blob, ItemKind, Object, Tree, TreeItem, TreeKind, TreeWalk};
pub use docgit_types::{DocId, Payload};
