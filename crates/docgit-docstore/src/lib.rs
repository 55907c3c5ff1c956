//! The document store docgit runs on.
//!
//! docgit never talks to a database directly. It consumes a narrow
//! collection API (insert, find, find-one, partial update, and "last
//! inserted") over JSON documents. Any backend that can offer those calls
//! with monotonic id assignment can host a repository.
//!
//! # Contract
//!
//! 1. `insert` assigns `_id` (strictly increasing across the whole store)
//!    and `_created_ms` (wall-clock milliseconds at assignment).
//! 2. Reads return documents in insertion order unless told otherwise.
//! 3. `update` patches the first matching document only and reports how
//!    many documents matched; callers build compare-and-swap on top of it by
//!    putting the expected old value in the filter.
//! 4. Reserved fields (`_id`, `_created_ms`) are never patched.
//!
//! # Backends
//!
//! - [`InMemoryDocumentStore`] -- `RwLock`-guarded collections for tests and
//!   embedding

pub mod document;
pub mod error;
pub mod memory;
pub mod traits;

pub use document::{
    document_id, from_document, to_document, Document, Filter, FindOptions, Patch, SortOrder,
    CREATED_FIELD, ID_FIELD,
};
pub use error::{DocStoreError, DocStoreResult};
pub use memory::InMemoryDocumentStore;
pub use traits::{Collection, DocumentStore};
