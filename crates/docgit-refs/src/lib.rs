//! Reference management for docgit.
//!
//! References are named pointers to commits: heads (branches, which advance
//! as commits land) and tags (fixed once created). One extra record, HEAD,
//! names the reference that is currently checked out.
//!
//! Ref advancement is optimistic. [`RefTable::update_ref`] only succeeds if
//! the ref still points at the commit the caller last saw; otherwise it
//! fails with [`RefError::ConcurrentModification`] and the caller may retry.

pub mod error;
pub mod names;
pub mod table;
pub mod types;

pub use error::{RefError, RefResult};
pub use names::validate_ref_name;
pub use table::{RefTable, META, REFS};
pub use types::{Head, Ref, RefKind};
