//! Digest primitives for docgit.
//!
//! Blobs carry two digests:
//!
//! - the **content digest** `H(parent, name, payload)` names one version of
//!   one file and drives deduplication;
//! - the **path digest** `H(parent, name)` names the logical file and finds
//!   earlier versions at the same location.
//!
//! Both use BLAKE3 with a per-kind domain tag.

pub mod hasher;

pub use hasher::{content_digest, path_digest, ContentHasher};
