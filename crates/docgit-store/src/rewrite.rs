//! Copy-on-write tree rewriting.
//!
//! Attaching a blob below the working root never touches a frozen tree.
//! The trees on the path from the root to the blob's parent are collected
//! (missing ones start empty), the leaf is edited, and then every non-root
//! tree on the chain is written out as a new frozen object, leaf first,
//! each parent swapping the stale child id for the new one. Only the
//! working root is updated in place.

use tracing::debug;

use docgit_types::{path, DocId};

use crate::error::{StoreError, StoreResult};
use crate::object::{Blob, Tree, TreeKind};
use crate::store::ObjectStore;

/// Result of a copy-on-write rewrite.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rewrite {
    /// Trees written by the rewrite, leaf first.
    pub created_trees: Vec<DocId>,
    /// The blob previously linked at the same path, if any.
    pub replaced_blob: Option<DocId>,
}

/// Link a stored blob into the working tree rooted at `root`.
///
/// A blob already linked under the same path digest is unlinked first, so
/// the parent tree holds at most one version of each file. Fails with
/// [`StoreError::PathConflict`] before writing anything when the blob's path
/// is a directory or one of its ancestors is a file.
pub fn upsert_blob(store: &ObjectStore, root: DocId, blob: &Blob) -> StoreResult<Rewrite> {
    let mut chain = vec![store.get_tree(root)?];
    for prefix in path::prefixes(&blob.parent).into_iter().skip(1) {
        let parent = &chain[chain.len() - 1];
        let existing = if parent.id.is_assigned() {
            match store.child_tree(parent, &prefix)? {
                Some(tree) => Some(tree),
                None if store.child_blob(parent, &prefix)?.is_some() => {
                    return Err(StoreError::PathConflict(prefix));
                }
                None => None,
            }
        } else {
            None
        };
        chain.push(existing.unwrap_or_else(|| Tree::new(prefix, TreeKind::Frozen)));
    }

    let mut replaced_blob = None;
    let leaf = chain.len() - 1;
    if chain[leaf].id.is_assigned() && store.child_tree(&chain[leaf], &blob.path)?.is_some() {
        return Err(StoreError::PathConflict(blob.path.clone()));
    }
    for id in chain[leaf].blob_refs.clone() {
        if store.get_blob(id)?.path_digest == blob.path_digest {
            chain[leaf].blob_refs.remove(&id);
            replaced_blob = Some(id);
        }
    }
    chain[leaf].blob_refs.insert(blob.id);

    let mut created_trees = Vec::new();
    let mut spliced: Option<(DocId, DocId)> = None;
    for (depth, mut tree) in chain.into_iter().enumerate().rev() {
        if let Some((stale, fresh)) = spliced.take() {
            tree.subtree_refs.remove(&stale);
            tree.subtree_refs.insert(fresh);
        }
        if depth == 0 {
            store.replace_tree_refs(&tree)?;
            break;
        }
        let stale = tree.id;
        tree.kind = TreeKind::Frozen;
        let fresh = store.insert_tree(&tree)?;
        created_trees.push(fresh);
        spliced = Some((stale, fresh));
    }

    debug!(
        path = %blob.path,
        blob = %blob.id,
        trees = created_trees.len(),
        replaced = ?replaced_blob,
        "working tree rewritten"
    );
    Ok(Rewrite {
        created_trees,
        replaced_blob,
    })
}
