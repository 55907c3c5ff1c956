use std::collections::BTreeMap;

use docgit_types::DocId;

use crate::error::StoreResult;
use crate::object::{Object, ObjectKind};
use crate::store::ObjectStore;

/// Whether a walked item is a file or a directory.
pub type ItemKind = ObjectKind;

/// One node visited by a [`TreeWalk`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeItem {
    pub path: String,
    pub id: DocId,
    pub kind: ItemKind,
}

/// Lazy depth-first walk over a tree.
///
/// The tree itself comes first, then its children in id order, each
/// subtree fully before the next sibling. Objects are fetched as the walk
/// advances. A fetch error is yielded once and ends the walk.
pub struct TreeWalk {
    store: ObjectStore,
    pending: Vec<DocId>,
}

impl TreeWalk {
    pub fn new(store: ObjectStore, root: DocId) -> Self {
        Self {
            store,
            pending: vec![root],
        }
    }

    /// A walk that yields nothing.
    pub fn empty(store: ObjectStore) -> Self {
        Self {
            store,
            pending: Vec::new(),
        }
    }
}

impl Iterator for TreeWalk {
    type Item = StoreResult<TreeItem>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.pending.pop()?;
        let object = match self.store.get(id) {
            Ok(object) => object,
            Err(e) => {
                self.pending.clear();
                return Some(Err(e));
            }
        };
        let item = match object {
            Object::Blob(blob) => TreeItem {
                path: blob.path,
                id,
                kind: ObjectKind::Blob,
            },
            Object::Tree(tree) => {
                self.pending
                    .extend(tree.children().into_iter().rev().map(|(child, _)| child));
                TreeItem {
                    path: tree.name,
                    id,
                    kind: ObjectKind::Tree,
                }
            }
        };
        Some(Ok(item))
    }
}

impl std::iter::FusedIterator for TreeWalk {}

/// Every blob path below `root`, mapped to its blob id.
pub fn flatten_tree(store: &ObjectStore, root: DocId) -> StoreResult<BTreeMap<String, DocId>> {
    let mut out = BTreeMap::new();
    for item in TreeWalk::new(store.clone(), root) {
        let item = item?;
        if item.kind == ObjectKind::Blob {
            out.insert(item.path, item.id);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Blob;
    use crate::rewrite::upsert_blob;
    use crate::StoreError;
    use docgit_docstore::InMemoryDocumentStore;
    use docgit_types::Payload;
    use std::sync::Arc;

    fn populated() -> (ObjectStore, DocId) {
        let store = ObjectStore::new(Arc::new(InMemoryDocumentStore::new()));
        let root = store.create_working_root(None).unwrap();
        for (parent, name) in [("/", "a"), ("/sub", "b"), ("/sub/deep", "c")] {
            let mut blob = Blob::new(parent, name, Payload::from(name)).unwrap();
            blob.id = store.insert_blob(&blob).unwrap();
            upsert_blob(&store, root.id, &blob).unwrap();
        }
        (store, root.id)
    }

    #[test]
    fn walk_visits_root_first_then_depth_first() {
        let (store, root) = populated();
        let paths: Vec<String> = TreeWalk::new(store, root)
            .map(|item| item.unwrap().path)
            .collect();
        assert_eq!(paths, vec!["/", "/a", "/sub", "/sub/b", "/sub/deep", "/sub/deep/c"]);
    }

    #[test]
    fn flatten_lists_blobs_only() {
        let (store, root) = populated();
        let flat = flatten_tree(&store, root).unwrap();
        assert_eq!(
            flat.keys().cloned().collect::<Vec<_>>(),
            vec!["/a", "/sub/b", "/sub/deep/c"]
        );
    }

    #[test]
    fn missing_root_yields_one_error_then_ends() {
        let store = ObjectStore::new(Arc::new(InMemoryDocumentStore::new()));
        let mut walk = TreeWalk::new(store, DocId::new(5));
        assert!(matches!(walk.next(), Some(Err(StoreError::ObjectNotFound(_)))));
        assert!(walk.next().is_none());
    }

    #[test]
    fn empty_walk_yields_nothing() {
        let store = ObjectStore::new(Arc::new(InMemoryDocumentStore::new()));
        assert_eq!(TreeWalk::empty(store).count(), 0);
    }
}
