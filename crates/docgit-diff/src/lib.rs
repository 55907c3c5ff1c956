//! Diff engine for docgit.
//!
//! Two versions of a path are compared as text. Payloads and tree listings
//! are first rendered to a canonical line sequence (structured payloads as
//! sorted-key pretty JSON), then diffed line by line with the `similar`
//! crate's Myers implementation.
//!
//! # Key Types
//!
//! - [`LineDiff`] / [`DiffLine`] -- Full tagged line sequence (`-`, `+`, ` `)
//! - [`FieldChange`] -- Removed/added line pair from [`extract_diff`]
//! - [`TreeDiff`] / [`TreeChange`] -- Added/deleted/modified blob paths between snapshots

pub mod extract;
pub mod line_diff;
pub mod render;
pub mod tree_diff;

pub use extract::{extract_diff, FieldChange};
pub use line_diff::{diff_lines, DiffLine, LineDiff};
pub use render::{render_listing, render_payload};
pub use tree_diff::{diff_listings, TreeChange, TreeDiff};
