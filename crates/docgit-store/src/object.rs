use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use docgit_crypto::{content_digest, path_digest};
use docgit_docstore::{document_id, from_document, to_document, Document};
use docgit_types::{path, DocId, Digest, Payload};

use crate::error::{StoreError, StoreResult};

/// Collection holding blobs and trees.
pub const OBJECTS: &str = "objects";

/// Discriminator field shared by blobs and trees.
pub(crate) const KIND_FIELD: &str = "kind";
pub(crate) const BLOB_KIND: &str = "blob";

/// The kind of a stored object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::Tree => write!(f, "tree"),
        }
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// One version of one file.
///
/// `content_digest` identifies this exact version; `path_digest` identifies
/// the logical file across versions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    #[serde(rename = "_id", default, skip_serializing)]
    pub id: DocId,
    pub name: String,
    pub parent: String,
    pub path: String,
    pub payload: Payload,
    pub content_digest: Digest,
    pub path_digest: Digest,
}

impl Blob {
    /// Build an unsaved blob, normalizing `parent` and validating `name`.
    pub fn new(parent: &str, name: &str, payload: Payload) -> StoreResult<Self> {
        let parent = path::normalize(parent)?;
        path::validate_name(name)?;
        Ok(Self {
            id: DocId::UNASSIGNED,
            path: path::join(&parent, name),
            content_digest: content_digest(&parent, name, &payload),
            path_digest: path_digest(&parent, name),
            name: name.to_string(),
            parent,
            payload,
        })
    }

    /// Replace the payload and recompute the content digest.
    pub fn set_payload(&mut self, payload: Payload) {
        self.content_digest = content_digest(&self.parent, &self.name, &payload);
        self.payload = payload;
    }

    pub(crate) fn to_document(&self) -> StoreResult<Document> {
        let mut doc = to_document(self)?;
        doc.insert(KIND_FIELD.into(), Value::from(BLOB_KIND));
        Ok(doc)
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// Mutability of a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeKind {
    /// The single mutable root that staging rewrites in place.
    #[serde(rename = "working")]
    Working,
    /// An immutable snapshot node.
    #[serde(rename = "tree")]
    Frozen,
}

impl TreeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Working => "working",
            Self::Frozen => "tree",
        }
    }
}

/// A directory node. `name` is the tree's absolute path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    #[serde(rename = "_id", default, skip_serializing)]
    pub id: DocId,
    pub name: String,
    pub kind: TreeKind,
    #[serde(default)]
    pub blob_refs: BTreeSet<DocId>,
    #[serde(default)]
    pub subtree_refs: BTreeSet<DocId>,
}

impl Tree {
    /// An unsaved, empty tree.
    pub fn new(name: impl Into<String>, kind: TreeKind) -> Self {
        Self {
            id: DocId::UNASSIGNED,
            name: name.into(),
            kind,
            blob_refs: BTreeSet::new(),
            subtree_refs: BTreeSet::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.name == path::ROOT
    }

    pub fn is_empty(&self) -> bool {
        self.blob_refs.is_empty() && self.subtree_refs.is_empty()
    }

    /// Child ids of both kinds in id order.
    pub fn children(&self) -> Vec<(DocId, ObjectKind)> {
        let mut out: Vec<_> = self
            .blob_refs
            .iter()
            .map(|&id| (id, ObjectKind::Blob))
            .chain(self.subtree_refs.iter().map(|&id| (id, ObjectKind::Tree)))
            .collect();
        out.sort_by_key(|(id, _)| *id);
        out
    }

    pub(crate) fn to_document(&self) -> StoreResult<Document> {
        Ok(to_document(self)?)
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// A decoded entry of the `objects` collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
}

impl Object {
    pub fn id(&self) -> DocId {
        match self {
            Self::Blob(blob) => blob.id,
            Self::Tree(tree) => tree.id,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
        }
    }

    pub fn from_document(doc: Document) -> StoreResult<Self> {
        let id = document_id(&doc).unwrap_or_default();
        let kind = doc.get(KIND_FIELD).and_then(Value::as_str).map(str::to_owned);
        match kind.as_deref() {
            Some(BLOB_KIND) => Ok(Self::Blob(from_document(doc)?)),
            Some("working") | Some("tree") => Ok(Self::Tree(from_document(doc)?)),
            other => Err(StoreError::Corrupt {
                id,
                reason: format!("unknown object kind {other:?}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blob_derives_path_and_digests() {
        let blob = Blob::new("/a//b", "f", Payload::from("x")).unwrap();
        assert_eq!(blob.parent, "/a/b");
        assert_eq!(blob.path, "/a/b/f");
        assert_eq!(blob.path_digest, path_digest("/a/b", "f"));
        assert!(!blob.id.is_assigned());
    }

    #[test]
    fn blob_rejects_bad_names() {
        assert!(Blob::new("/", "", Payload::from("x")).is_err());
        assert!(Blob::new("/", "a/b", Payload::from("x")).is_err());
        assert!(Blob::new("rel", "f", Payload::from("x")).is_err());
    }

    #[test]
    fn set_payload_keeps_path_digest() {
        let mut blob = Blob::new("/", "f", Payload::from("v1")).unwrap();
        let before = (blob.content_digest, blob.path_digest);
        blob.set_payload(Payload::from("v2"));
        assert_ne!(blob.content_digest, before.0);
        assert_eq!(blob.path_digest, before.1);
    }

    #[test]
    fn documents_decode_by_kind() {
        let blob = Blob::new("/", "f", Payload::from("x")).unwrap();
        let mut doc = blob.to_document().unwrap();
        assert!(!doc.contains_key("_id"));
        doc.insert("_id".into(), json!(3));
        let decoded = Object::from_document(doc).unwrap();
        assert_eq!(decoded.kind(), ObjectKind::Blob);
        assert_eq!(decoded.id(), DocId::new(3));

        let mut tree = Tree::new("/", TreeKind::Working);
        tree.blob_refs.insert(DocId::new(3));
        let mut doc = tree.to_document().unwrap();
        assert_eq!(doc["kind"], "working");
        doc.insert("_id".into(), json!(4));
        match Object::from_document(doc).unwrap() {
            Object::Tree(t) => {
                assert_eq!(t.kind, TreeKind::Working);
                assert!(t.blob_refs.contains(&DocId::new(3)));
            }
            other => panic!("expected tree, got {other:?}"),
        }
    }

    #[test]
    fn unknown_kind_is_corrupt() {
        let doc = match json!({"_id": 1, "kind": "commit"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert!(matches!(Object::from_document(doc), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn children_are_id_ordered() {
        let mut tree = Tree::new("/", TreeKind::Frozen);
        tree.blob_refs.extend([DocId::new(5), DocId::new(1)]);
        tree.subtree_refs.insert(DocId::new(3));
        let ids: Vec<_> = tree.children().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![DocId::new(1), DocId::new(3), DocId::new(5)]);
    }
}
