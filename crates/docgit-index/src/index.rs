//! The staging index.

use std::collections::BTreeMap;

use tracing::debug;

use docgit_store::{upsert_blob, Blob, Object, ObjectStore, Rewrite, StoreError};
use docgit_types::{path, DocId, Payload};

use crate::entry::{IndexEntry, StageAction};
use crate::error::IndexResult;
use crate::status::{StageOutcome, StagedChange};

/// Pending changes against a working root.
///
/// Entries are keyed by absolute path, so staging the same path twice keeps
/// a single entry. The trees written by copy-on-write rewrites are recorded
/// too; they are the new nodes the next commit will snapshot.
#[derive(Debug)]
pub struct Index {
    store: ObjectStore,
    working_root: DocId,
    entries: BTreeMap<String, IndexEntry>,
    pending_trees: Vec<DocId>,
}

impl Index {
    pub fn new(store: ObjectStore, working_root: DocId) -> Self {
        Self {
            store,
            working_root,
            entries: BTreeMap::new(),
            pending_trees: Vec::new(),
        }
    }

    /// Id of the working root the index stages into.
    pub fn working_root(&self) -> DocId {
        self.working_root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn pending_blob_ids(&self) -> Vec<DocId> {
        self.entries.values().map(|e| e.blob_id).collect()
    }

    pub fn pending_tree_ids(&self) -> &[DocId] {
        &self.pending_trees
    }

    /// Staged changes sorted by path.
    pub fn status(&self) -> Vec<StagedChange> {
        self.entries
            .values()
            .map(|e| StagedChange {
                path: e.path.clone(),
                blob_id: e.blob_id,
                action: e.action,
            })
            .collect()
    }

    /// Drop every pending entry and stage into `working_root` from now on.
    pub fn reset(&mut self, working_root: DocId) {
        self.entries.clear();
        self.pending_trees.clear();
        self.working_root = working_root;
    }

    /// Keep the pending entries but stage into `working_root` from now on.
    ///
    /// Used when the old working root was frozen under a commit that never
    /// landed. Every pending blob is now reachable from that frozen tree, so
    /// none of them may be overwritten in place any more.
    pub fn rebase(&mut self, working_root: DocId) {
        for entry in self.entries.values_mut() {
            entry.fresh = false;
        }
        self.working_root = working_root;
    }

    /// Stage `payload` as the file `name` under `parent`.
    ///
    /// - Content already stored: a no-op when the working tree links it at
    ///   this path. Otherwise the stored blob is linked again without a new
    ///   write. This extends the plain no-op so a file can be reverted to an
    ///   earlier version, or take content first committed on another branch.
    /// - New content for a path staged in this set with a blob written in
    ///   this set: that blob is overwritten in place.
    /// - New content otherwise: a new blob is written and linked, rewriting
    ///   its ancestors copy-on-write.
    ///
    /// Fails with [`StoreError::PathConflict`] (wrapped) before anything is
    /// written when the path is already a directory, or an ancestor of it is
    /// already a file.
    pub fn stage(&mut self, parent: &str, name: &str, payload: Payload) -> IndexResult<StageOutcome> {
        let parent = path::normalize(parent)?;
        path::validate_name(name)?;
        let mut blob = Blob::new(&parent, name, payload)?;
        self.store.check_placement(self.working_root, &blob.path)?;
        let linked = self.linked_blob(&blob.path)?;

        if let Some(existing) = self.store.find_by_digest(&blob.content_digest)? {
            if linked.as_ref().map(|b| b.id) == Some(existing.id) {
                debug!(path = %blob.path, blob = %existing.id, "content unchanged");
                return Ok(StageOutcome::Unchanged {
                    blob_id: existing.id,
                });
            }
            let action = self.action_for(&blob.path, linked.is_some());
            let rewrite = upsert_blob(&self.store, self.working_root, &existing)?;
            debug!(path = %existing.path, blob = %existing.id, %action, "stored blob relinked");
            return Ok(self.record(&existing, action, false, rewrite));
        }

        if let Some(entry) = self.entries.get(&blob.path).filter(|e| e.fresh) {
            let blob_id = entry.blob_id;
            self.store.overwrite_blob(blob_id, blob.payload)?;
            debug!(path = %entry.path, blob = %blob_id, "staged blob updated");
            return Ok(StageOutcome::Updated { blob_id });
        }

        let action = self.action_for(&blob.path, linked.is_some());
        blob.id = self.store.insert_blob(&blob)?;
        let rewrite = upsert_blob(&self.store, self.working_root, &blob)?;
        debug!(path = %blob.path, blob = %blob.id, %action, "blob staged");
        Ok(self.record(&blob, action, true, rewrite))
    }

    /// The blob the working tree links at `path`, if any.
    fn linked_blob(&self, path: &str) -> IndexResult<Option<Blob>> {
        match self.store.resolve(self.working_root, path) {
            Ok(Object::Blob(blob)) => Ok(Some(blob)),
            Ok(Object::Tree(_)) | Err(StoreError::PathNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// A path first staged as a new file stays one until the commit.
    fn action_for(&self, path: &str, linked: bool) -> StageAction {
        match self.entries.get(path) {
            Some(entry) => entry.action,
            None if linked => StageAction::Modified,
            None => StageAction::NewFile,
        }
    }

    fn record(&mut self, blob: &Blob, action: StageAction, fresh: bool, rewrite: Rewrite) -> StageOutcome {
        self.pending_trees.extend(rewrite.created_trees);
        self.entries.insert(
            blob.path.clone(),
            IndexEntry::new(&blob.path, &blob.parent, &blob.name, blob.id, action, fresh),
        );
        StageOutcome::Staged {
            blob_id: blob.id,
            action,
        }
    }
}
