use docgit_types::{Digest, Payload};

/// Domain-separated BLAKE3 hasher.
///
/// Each hasher carries a domain tag that is prepended to every hash
/// computation, so a content digest and a path digest over the same bytes
/// never collide. Parts are length-prefixed: `("ab", "c")` and `("a", "bc")`
/// hash differently.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for blob content digests.
    pub const CONTENT: Self = Self {
        domain: "docgit-content-v1",
    };
    /// Hasher for blob path digests.
    pub const PATH: Self = Self {
        domain: "docgit-path-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash a sequence of byte parts.
    pub fn hash_parts(&self, parts: &[&[u8]]) -> Digest {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        for part in parts {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        Digest::from_hash(*hasher.finalize().as_bytes())
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Digest identifying one version of the file `name` under `parent`.
pub fn content_digest(parent: &str, name: &str, payload: &Payload) -> Digest {
    ContentHasher::CONTENT.hash_parts(&[
        parent.as_bytes(),
        name.as_bytes(),
        &payload.canonical_bytes(),
    ])
}

/// Digest identifying the file `name` under `parent`, whatever its content.
pub fn path_digest(parent: &str, name: &str) -> Digest {
    ContentHasher::PATH.hash_parts(&[parent.as_bytes(), name.as_bytes()])
}
