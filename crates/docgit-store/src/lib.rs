//! Object storage for docgit.
//!
//! Blobs and trees live side by side in the `objects` collection of the
//! document store. A blob is one version of one file; a tree is one version
//! of one directory and holds the ids of its direct children.
//!
//! # Object Types
//!
//! - [`Blob`] -- named payload with content and path digests
//! - [`Tree`] -- directory node, either the mutable working root or frozen
//!
//! # Design Rules
//!
//! 1. Equal content digests mean one stored blob; [`ObjectStore::put_blob`]
//!    never writes a duplicate.
//! 2. Frozen trees are never mutated. Changing anything below a path
//!    writes new trees for every ancestor up to the root
//!    ([`upsert_blob`]).
//! 3. Only the working root is updated in place.
//! 4. Walks are lazy and finite ([`TreeWalk`]).

pub mod error;
pub mod object;
pub mod rewrite;
pub mod store;
pub mod walk;

pub use error::{StoreError, StoreResult};
pub use object::{Blob, Object, ObjectKind, Tree, TreeKind, OBJECTS};
pub use rewrite::{upsert_blob, Rewrite};
pub use store::ObjectStore;
pub use walk::{flatten_tree, ItemKind, TreeItem, TreeWalk};
