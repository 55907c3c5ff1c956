//! Foundation types for docgit.
//!
//! Every other docgit crate depends on `docgit-types`. The types here carry
//! no storage behavior: they describe identities and values that flow
//! through the object store, the staging index, and the commit graph.
//!
//! # Key Types
//!
//! - [`DocId`] -- Monotonic identifier assigned by the document store on insert
//! - [`Digest`] -- 32-byte content or path digest (hex in documents)
//! - [`Payload`] -- Blob content: plain text or a structured key/value document
//! - [`path`] -- Absolute tree path helpers (`/a/b/file`)

pub mod digest;
pub mod error;
pub mod id;
pub mod path;
pub mod payload;

pub use digest::Digest;
pub use error::TypeError;
pub use id::DocId;
pub use payload::Payload;
