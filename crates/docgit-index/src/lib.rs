//! Staging index for docgit.
//!
//! The index accumulates the changes made since the last commit. Staging a
//! file writes (or reuses) its blob and links it into the working tree
//! straight away, so the working root always reflects the staged state and
//! a commit only has to snapshot it.
//!
//! # Key Types
//!
//! - [`Index`] -- pending entries keyed by path, plus the trees written for them
//! - [`IndexEntry`] -- one staged file
//! - [`StageAction`] -- `new file` or `modified`
//! - [`StageOutcome`] -- what a single `stage` call did

pub mod entry;
pub mod error;
pub mod index;
pub mod status;

pub use entry::{IndexEntry, StageAction};
pub use error::{IndexError, IndexResult};
pub use index::Index;
pub use status::{StageOutcome, StagedChange};
