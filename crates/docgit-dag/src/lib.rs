//! Commit graph for docgit.
//!
//! Commits form singly linked chains: each commit names one parent (or none
//! for the first commit of a history) and one frozen root tree. The store
//! assigns ids in insertion order, so a parent always has a smaller id than
//! its child; [`CommitWalk`] relies on that to guarantee termination.

pub mod commit;
pub mod error;
pub mod graph;

pub use commit::{Commit, COMMITS};
pub use error::{DagError, DagResult};
pub use graph::{CommitGraph, CommitWalk};
