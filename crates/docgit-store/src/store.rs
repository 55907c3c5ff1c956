use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use docgit_docstore::{
    document_id, Collection, DocStoreError, DocumentStore, Filter, FindOptions, Patch,
};
use docgit_types::{path, DocId, Digest, Payload};

use crate::error::{StoreError, StoreResult};
use crate::object::{Blob, Object, ObjectKind, Tree, TreeKind, BLOB_KIND, KIND_FIELD, OBJECTS};

/// Blob and tree storage on top of a [`DocumentStore`].
///
/// Cloning is cheap; clones share the same backend.
#[derive(Clone)]
pub struct ObjectStore {
    docs: Arc<dyn DocumentStore>,
}

impl ObjectStore {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    fn objects(&self) -> Collection<'_> {
        Collection::new(self.docs.as_ref(), OBJECTS)
    }

    // -- blobs ---------------------------------------------------------------

    /// Store a blob unless one with the same content digest exists.
    ///
    /// Returns the blob id and whether a new object was written.
    pub fn put_blob(&self, parent: &str, name: &str, payload: Payload) -> StoreResult<(DocId, bool)> {
        let blob = Blob::new(parent, name, payload)?;
        if let Some(existing) = self.find_by_digest(&blob.content_digest)? {
            debug!(id = %existing.id, path = %existing.path, "blob deduplicated");
            return Ok((existing.id, false));
        }
        Ok((self.insert_blob(&blob)?, true))
    }

    /// Insert a blob as a new object, regardless of existing versions.
    pub fn insert_blob(&self, blob: &Blob) -> StoreResult<DocId> {
        let id = self.objects().insert(blob.to_document()?)?;
        debug!(%id, path = %blob.path, digest = %blob.content_digest.short_hex(), "blob stored");
        Ok(id)
    }

    /// Replace a blob's payload and content digest in place.
    pub fn overwrite_blob(&self, id: DocId, payload: Payload) -> StoreResult<Blob> {
        let mut blob = self.get_blob(id)?;
        blob.set_payload(payload);
        let payload = serde_json::to_value(&blob.payload)
            .map_err(|e| DocStoreError::Serialization(e.to_string()))?;
        let patch = Patch::new()
            .set("payload", payload)
            .set("content_digest", blob.content_digest);
        if self.objects().update(&Filter::by_id(id), &patch)? == 0 {
            return Err(StoreError::ObjectNotFound(id));
        }
        debug!(%id, path = %blob.path, "blob overwritten in place");
        Ok(blob)
    }

    pub fn find_by_digest(&self, digest: &Digest) -> StoreResult<Option<Blob>> {
        let filter = Filter::all()
            .eq(KIND_FIELD, BLOB_KIND)
            .eq("content_digest", *digest);
        self.objects().find_one(&filter)?.map(decode_blob).transpose()
    }

    /// The most recently inserted blob at `parent`/`name`, if any.
    pub fn find_by_path(&self, parent: &str, name: &str) -> StoreResult<Option<Blob>> {
        let parent = path::normalize(parent)?;
        let filter = Filter::all()
            .eq(KIND_FIELD, BLOB_KIND)
            .eq("path_digest", docgit_crypto::path_digest(&parent, name));
        self.objects()
            .find(&filter, FindOptions::newest_first().with_limit(1))?
            .into_iter()
            .next()
            .map(decode_blob)
            .transpose()
    }

    // -- lookup --------------------------------------------------------------

    pub fn get(&self, id: DocId) -> StoreResult<Object> {
        match self.objects().find_one(&Filter::by_id(id))? {
            Some(doc) => Object::from_document(doc),
            None => Err(StoreError::ObjectNotFound(id)),
        }
    }

    pub fn get_blob(&self, id: DocId) -> StoreResult<Blob> {
        match self.get(id)? {
            Object::Blob(blob) => Ok(blob),
            other => Err(unexpected(id, ObjectKind::Blob, &other)),
        }
    }

    pub fn get_tree(&self, id: DocId) -> StoreResult<Tree> {
        match self.get(id)? {
            Object::Tree(tree) => Ok(tree),
            other => Err(unexpected(id, ObjectKind::Tree, &other)),
        }
    }

    /// Number of blobs and trees stored.
    pub fn object_count(&self) -> StoreResult<usize> {
        Ok(self.objects().count(&Filter::all())?)
    }

    // -- trees ---------------------------------------------------------------

    pub fn insert_tree(&self, tree: &Tree) -> StoreResult<DocId> {
        let id = self.objects().insert(tree.to_document()?)?;
        debug!(%id, name = %tree.name, kind = tree.kind.as_str(), "tree stored");
        Ok(id)
    }

    pub fn set_tree_kind(&self, id: DocId, kind: TreeKind) -> StoreResult<()> {
        self.get_tree(id)?;
        if self.objects().update(&Filter::by_id(id), &Patch::new().set(KIND_FIELD, kind.as_str()))? == 0 {
            return Err(StoreError::ObjectNotFound(id));
        }
        debug!(%id, kind = kind.as_str(), "tree kind changed");
        Ok(())
    }

    /// Overwrite the child sets of a working tree.
    pub fn replace_tree_refs(&self, tree: &Tree) -> StoreResult<()> {
        let stored = self.get_tree(tree.id)?;
        if stored.kind != TreeKind::Working {
            return Err(StoreError::FrozenTree(tree.id));
        }
        let patch = Patch::new()
            .set("blob_refs", ids_value(&tree.blob_refs))
            .set("subtree_refs", ids_value(&tree.subtree_refs));
        let filter = Filter::by_id(tree.id).eq(KIND_FIELD, TreeKind::Working.as_str());
        if self.objects().update(&filter, &patch)? == 0 {
            return Err(StoreError::FrozenTree(tree.id));
        }
        Ok(())
    }

    /// The newest working root, if one was ever created.
    pub fn find_working_root(&self) -> StoreResult<Option<Tree>> {
        let filter = Filter::all()
            .eq(KIND_FIELD, TreeKind::Working.as_str())
            .eq("name", path::ROOT);
        self.objects()
            .find(&filter, FindOptions::newest_first().with_limit(1))?
            .into_iter()
            .next()
            .map(decode_tree)
            .transpose()
    }

    /// Insert a new working root carrying the children of `from`.
    pub fn create_working_root(&self, from: Option<&Tree>) -> StoreResult<Tree> {
        let mut root = Tree::new(path::ROOT, TreeKind::Working);
        if let Some(from) = from {
            root.blob_refs = from.blob_refs.clone();
            root.subtree_refs = from.subtree_refs.clone();
        }
        root.id = self.insert_tree(&root)?;
        Ok(root)
    }

    /// The direct subtree of `tree` whose absolute path is `name`.
    pub fn child_tree(&self, tree: &Tree, name: &str) -> StoreResult<Option<Tree>> {
        for &id in &tree.subtree_refs {
            let child = self.get_tree(id)?;
            if child.name == name {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// The direct blob of `tree` whose absolute path is `path`.
    pub fn child_blob(&self, tree: &Tree, path: &str) -> StoreResult<Option<Blob>> {
        for &id in &tree.blob_refs {
            let blob = self.get_blob(id)?;
            if blob.path == path {
                return Ok(Some(blob));
            }
        }
        Ok(None)
    }

    /// Resolve an absolute path below the tree `root`.
    ///
    /// Every segment but the last must name a subtree; the last may name a
    /// subtree or a blob. `/` resolves to `root` itself.
    pub fn resolve(&self, root: DocId, target: &str) -> StoreResult<Object> {
        let target = path::normalize(target)?;
        let mut current = self.get_tree(root)?;
        let prefixes = path::prefixes(&target);
        let last = prefixes.len() - 1;
        for (depth, prefix) in prefixes.iter().enumerate().skip(1) {
            if let Some(child) = self.child_tree(&current, prefix)? {
                current = child;
                continue;
            }
            if depth == last {
                if let Some(blob) = self.child_blob(&current, prefix)? {
                    return Ok(Object::Blob(blob));
                }
            }
            return Err(StoreError::PathNotFound(target));
        }
        Ok(Object::Tree(current))
    }

    /// Check that a file can be linked at `file` under `root`.
    ///
    /// Fails with [`StoreError::PathConflict`] when `file` is already a
    /// directory, or when one of its ancestors is already a file.
    pub fn check_placement(&self, root: DocId, file: &str) -> StoreResult<()> {
        let file = path::normalize(file)?;
        let mut current = self.get_tree(root)?;
        for prefix in path::prefixes(&file).into_iter().skip(1) {
            if let Some(child) = self.child_tree(&current, &prefix)? {
                current = child;
                continue;
            }
            if prefix != file && self.child_blob(&current, &prefix)?.is_some() {
                return Err(StoreError::PathConflict(prefix));
            }
            return Ok(());
        }
        Err(StoreError::PathConflict(file))
    }

    pub fn resolve_tree(&self, root: DocId, target: &str) -> StoreResult<Tree> {
        match self.resolve(root, target)? {
            Object::Tree(tree) => Ok(tree),
            Object::Blob(_) => Err(StoreError::PathNotFound(target.to_string())),
        }
    }
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore").finish_non_exhaustive()
    }
}

fn decode_blob(doc: docgit_docstore::Document) -> StoreResult<Blob> {
    let id = document_id(&doc).unwrap_or_default();
    match Object::from_document(doc)? {
        Object::Blob(blob) => Ok(blob),
        other => Err(unexpected(id, ObjectKind::Blob, &other)),
    }
}

fn decode_tree(doc: docgit_docstore::Document) -> StoreResult<Tree> {
    let id = document_id(&doc).unwrap_or_default();
    match Object::from_document(doc)? {
        Object::Tree(tree) => Ok(tree),
        other => Err(unexpected(id, ObjectKind::Tree, &other)),
    }
}

fn unexpected(id: DocId, expected: ObjectKind, actual: &Object) -> StoreError {
    StoreError::UnexpectedKind {
        id,
        expected,
        actual: actual.kind(),
    }
}

fn ids_value(ids: &std::collections::BTreeSet<DocId>) -> Value {
    Value::Array(ids.iter().map(|&id| Value::from(id)).collect())
}
