use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use docgit_dag::{Commit, CommitGraph, CommitWalk};
use docgit_diff::{diff_lines, diff_listings, render_listing, render_payload, LineDiff, TreeDiff};
use docgit_docstore::{DocumentStore, InMemoryDocumentStore};
use docgit_index::{Index, StageOutcome};
use docgit_refs::{Head, Ref, RefKind, RefTable};
use docgit_store::{flatten_tree, Object, ObjectStore, Tree, TreeKind, TreeWalk};
use docgit_types::{DocId, Payload};

use crate::config::RepositoryConfig;
use crate::error::{RepoError, RepoResult};
use crate::outcome::{CommitOutcome, IndexSnapshot, StatusReport};

/// A docgit repository over one document store.
///
/// All state lives in the store except the staging index, which is held
/// behind a mutex. Every operation that stages, commits, or moves HEAD
/// holds that mutex for its whole duration, so two writers never interleave
/// a copy-on-write rewrite. Readers (`log`, `walk_tree`, `diff`) only read
/// frozen objects and take no lock.
pub struct Repository {
    config: RepositoryConfig,
    docs: Arc<dyn DocumentStore>,
    objects: ObjectStore,
    refs: RefTable,
    commits: CommitGraph,
    index: Mutex<Index>,
}

impl Repository {
    /// Open the repository stored in `docs`, initializing it if empty.
    ///
    /// An existing repository keeps its HEAD and working root. A new one
    /// gets the default branch with no commits and an empty working root.
    pub fn init(docs: Arc<dyn DocumentStore>, config: RepositoryConfig) -> RepoResult<Self> {
        let objects = ObjectStore::new(Arc::clone(&docs));
        let refs = RefTable::new(Arc::clone(&docs));
        let commits = CommitGraph::new(Arc::clone(&docs));

        let head = refs.init(&config.default_branch)?;
        let root = match objects.find_working_root()? {
            Some(root) => root,
            None => {
                let tip = refs.read_ref(&head.ref_name, head.kind)?.and_then(|r| r.cid);
                let seed = match tip {
                    Some(cid) => Some(objects.get_tree(commits.get(cid)?.tree_id)?),
                    None => None,
                };
                objects.create_working_root(seed.as_ref())?
            }
        };
        info!(head = %head, working_root = %root.id, "repository opened");

        Ok(Self {
            index: Mutex::new(Index::new(objects.clone(), root.id)),
            config,
            docs,
            objects,
            refs,
            commits,
        })
    }

    /// A fresh repository in memory with the default configuration.
    pub fn in_memory() -> RepoResult<Self> {
        Self::init(Arc::new(InMemoryDocumentStore::new()), RepositoryConfig::default())
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// The backing document store.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.docs
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Index>> {
        self.index.lock().map_err(|_| RepoError::LockPoisoned)
    }

    // ---- Staging and committing ----

    /// Stage `payload` as the file `name` under `parent`.
    pub fn add(&self, parent: &str, name: &str, payload: impl Into<Payload>) -> RepoResult<StageOutcome> {
        let mut index = self.lock()?;
        Ok(index.stage(parent, name, payload.into())?)
    }

    /// Snapshot the working tree as a new commit on the checked-out branch.
    ///
    /// Returns [`CommitOutcome::NothingToCommit`] when nothing is staged. If
    /// the commit record cannot be written, the index, the working root, and
    /// the branch are left as they were. Once the record exists its tree is
    /// frozen for good: if the branch then cannot be advanced, the staged
    /// entries move onto the fresh working root and the record is left
    /// unreachable from any ref.
    pub fn commit(&self, message: &str) -> RepoResult<CommitOutcome> {
        let mut index = self.lock()?;
        if index.is_empty() {
            debug!("nothing staged, commit skipped");
            return Ok(CommitOutcome::NothingToCommit);
        }
        let head = self.refs.head()?;
        if head.kind == RefKind::Tag {
            return Err(RepoError::TagCheckedOut(head.ref_name));
        }
        let branch = self
            .refs
            .read_ref(&head.ref_name, RefKind::Head)?
            .ok_or_else(|| RepoError::NoBranch(head.ref_name.clone()))?;

        let root = self.objects.get_tree(index.working_root())?;
        let fresh = self.objects.create_working_root(Some(&root))?;
        let commit = match self.commits.insert(branch.cid, root.id, message, &self.config.author) {
            Ok(commit) => commit,
            Err(e) => {
                self.retire(fresh.id);
                return Err(e.into());
            }
        };
        if let Err(e) = self.objects.set_tree_kind(root.id, TreeKind::Frozen) {
            warn!(commit = %commit.id, tree = %root.id, error = %e, "commit record left with an unfrozen tree");
            self.retire(fresh.id);
            return Err(e.into());
        }

        if let Err(e) = self.refs.update_ref(&branch.name, branch.cid, commit.id) {
            index.rebase(fresh.id);
            warn!(
                commit = %commit.id,
                branch = %branch.name,
                working_root = %fresh.id,
                error = %e,
                "branch not advanced, staged changes kept"
            );
            return Err(e.into());
        }

        index.reset(fresh.id);
        info!(
            commit = %commit.id,
            branch = %branch.name,
            tree = %root.id,
            message,
            "committed"
        );
        Ok(CommitOutcome::Committed(commit))
    }

    /// Freeze a working root that will not be used.
    fn retire(&self, tree: DocId) {
        if let Err(e) = self.objects.set_tree_kind(tree, TreeKind::Frozen) {
            warn!(%tree, error = %e, "could not retire unused working root");
        }
    }

    // ---- Refs and HEAD ----

    /// Check out the branch or tag `name`.
    ///
    /// Fails with [`RepoError::NoBranch`] and leaves HEAD alone when no ref
    /// has that name. With nothing staged, the working root is reset to the
    /// target's tip (empty for a branch without commits); staged changes
    /// otherwise stay in the working tree and move with HEAD.
    pub fn checkout(&self, name: &str) -> RepoResult<Head> {
        let mut index = self.lock()?;
        self.checkout_locked(&mut index, name)
    }

    fn checkout_locked(&self, index: &mut Index, name: &str) -> RepoResult<Head> {
        let target = self
            .refs
            .find_ref(name)?
            .ok_or_else(|| RepoError::NoBranch(name.to_string()))?;
        let head = Head::new(&target.name, target.kind);

        if !index.is_empty() {
            self.refs.set_head(&head)?;
            info!(head = %head, staged = index.len(), "checked out with staged changes");
            return Ok(head);
        }

        let mut root = self.objects.get_tree(index.working_root())?;
        let previous = root.clone();
        let tip_tree = match target.cid {
            Some(cid) => Some(self.objects.get_tree(self.commits.get(cid)?.tree_id)?),
            None => None,
        };
        root.blob_refs = tip_tree.as_ref().map(|t| t.blob_refs.clone()).unwrap_or_default();
        root.subtree_refs = tip_tree.map(|t| t.subtree_refs).unwrap_or_default();
        self.objects.replace_tree_refs(&root)?;
        if let Err(e) = self.refs.set_head(&head) {
            if let Err(restore) = self.objects.replace_tree_refs(&previous) {
                warn!(tree = %root.id, error = %restore, "could not restore working root");
            }
            return Err(e.into());
        }
        info!(head = %head, tip = ?target.cid, "checked out");
        Ok(head)
    }

    /// Create branch `name` at `commit` (default: the current tip) and
    /// check it out.
    ///
    /// The ref is written before HEAD moves. If the checkout then fails, the
    /// new branch stays in the ref table and HEAD keeps its old value; a
    /// later `checkout(name)` finishes the job.
    pub fn branch(&self, name: &str, commit: Option<DocId>) -> RepoResult<Ref> {
        let mut index = self.lock()?;
        let cid = match commit {
            Some(id) => Some(self.verified_commit(id)?),
            None => self.current_ref()?.cid,
        };
        let created = self.refs.add_ref(name, RefKind::Head, cid)?;
        info!(branch = name, at = ?cid, "branch created");
        self.checkout_locked(&mut index, name)?;
        Ok(created)
    }

    /// Create tag `name` at `commit` (default: the current tip).
    pub fn tag(&self, name: &str, commit: Option<DocId>) -> RepoResult<Ref> {
        let cid = match commit {
            Some(id) => self.verified_commit(id)?,
            None => {
                let current = self.current_ref()?;
                current.cid.ok_or(RepoError::EmptyRef(current.name))?
            }
        };
        let tag = self.refs.add_tag(name, cid)?;
        info!(tag = name, at = %cid, "tag created");
        Ok(tag)
    }

    /// Move branch `name` from `expected` to `new`, failing with
    /// [`RepoError::ConcurrentModification`] if it no longer points at
    /// `expected`.
    pub fn update_ref(&self, name: &str, expected: Option<DocId>, new: DocId) -> RepoResult<Ref> {
        self.verified_commit(new)?;
        Ok(self.refs.update_ref(name, expected, new)?)
    }

    fn verified_commit(&self, id: DocId) -> RepoResult<DocId> {
        if self.commits.contains(id)? {
            Ok(id)
        } else {
            Err(RepoError::ObjectNotFound(id))
        }
    }

    pub fn head(&self) -> RepoResult<Head> {
        Ok(self.refs.head()?)
    }

    /// The ref HEAD names.
    pub fn current_ref(&self) -> RepoResult<Ref> {
        let head = self.refs.head()?;
        self.refs
            .read_ref(&head.ref_name, head.kind)?
            .ok_or(RepoError::NoBranch(head.ref_name))
    }

    /// The default branch.
    pub fn master(&self) -> RepoResult<Ref> {
        let name = &self.config.default_branch;
        self.refs
            .read_ref(name, RefKind::Head)?
            .ok_or_else(|| RepoError::NoBranch(name.clone()))
    }

    pub fn branches(&self) -> RepoResult<Vec<Ref>> {
        Ok(self.refs.list(RefKind::Head)?)
    }

    pub fn tags(&self) -> RepoResult<Vec<Ref>> {
        Ok(self.refs.list(RefKind::Tag)?)
    }

    /// The named ref, or HEAD's ref when `name` is `None`.
    fn resolve_ref(&self, name: Option<&str>) -> RepoResult<Ref> {
        match name {
            None => self.current_ref(),
            Some(name) => self
                .refs
                .find_ref(name)?
                .ok_or_else(|| RepoError::NoBranch(name.to_string())),
        }
    }

    // ---- History ----

    /// Walk the history of `ref_name` (default: HEAD's ref) from its tip.
    ///
    /// A ref without commits walks nothing.
    pub fn walk_commits(&self, ref_name: Option<&str>) -> RepoResult<CommitWalk> {
        let r = self.resolve_ref(ref_name)?;
        Ok(self.commits.walk(r.cid))
    }

    /// The full history of `ref_name`, newest first.
    pub fn log(&self, ref_name: Option<&str>) -> RepoResult<Vec<Commit>> {
        self.walk_commits(ref_name)?
            .map(|c| c.map_err(RepoError::from))
            .collect()
    }

    /// Walk the tree of the tip commit of `ref_name` (default: HEAD's ref).
    pub fn walk_tree(&self, ref_name: Option<&str>) -> RepoResult<TreeWalk> {
        let r = self.resolve_ref(ref_name)?;
        match r.cid {
            Some(cid) => {
                let commit = self.commits.get(cid)?;
                Ok(TreeWalk::new(self.objects.clone(), commit.tree_id))
            }
            None => Ok(TreeWalk::empty(self.objects.clone())),
        }
    }

    // ---- Diffs ----

    /// Diff `path` between two commits.
    ///
    /// A blob path compares rendered payloads; a directory path compares
    /// the sorted lists of blob paths beneath it. Fails with
    /// [`RepoError::PathNotFound`] if either commit lacks `path`.
    pub fn diff(&self, path: &str, a: DocId, b: DocId) -> RepoResult<LineDiff> {
        let old = self.render_at(path, a)?;
        let new = self.render_at(path, b)?;
        Ok(diff_lines(&old, &new))
    }

    fn render_at(&self, path: &str, commit: DocId) -> RepoResult<Vec<String>> {
        let commit = self.commits.get(commit)?;
        match self.objects.resolve(commit.tree_id, path)? {
            Object::Blob(blob) => Ok(render_payload(&blob.payload)),
            Object::Tree(tree) => {
                let listing = flatten_tree(&self.objects, tree.id)?;
                Ok(render_listing(listing.into_keys()))
            }
        }
    }

    /// Blob paths added, deleted, or modified from commit `a` to commit `b`.
    pub fn diff_commits(&self, a: DocId, b: DocId) -> RepoResult<TreeDiff> {
        let old = flatten_tree(&self.objects, self.commits.get(a)?.tree_id)?;
        let new = flatten_tree(&self.objects, self.commits.get(b)?.tree_id)?;
        Ok(diff_listings(&old, &new))
    }

    // ---- Inspection ----

    pub fn status(&self) -> RepoResult<StatusReport> {
        let index = self.lock()?;
        let head = self.refs.head()?;
        let tip = self.refs.read_ref(&head.ref_name, head.kind)?.and_then(|r| r.cid);
        Ok(StatusReport {
            head,
            tip,
            staged: index.status(),
        })
    }

    /// The current working root.
    pub fn working_tree(&self) -> RepoResult<Tree> {
        let index = self.lock()?;
        Ok(self.objects.get_tree(index.working_root())?)
    }

    pub fn index_snapshot(&self) -> RepoResult<IndexSnapshot> {
        let index = self.lock()?;
        Ok(IndexSnapshot {
            working_root: index.working_root(),
            pending_blob_ids: index.pending_blob_ids(),
            pending_tree_ids: index.pending_tree_ids().to_vec(),
        })
    }

    /// Number of blobs and trees stored.
    pub fn object_count(&self) -> RepoResult<usize> {
        Ok(self.objects.object_count()?)
    }

    /// Look up a blob or tree by id.
    pub fn object(&self, id: DocId) -> RepoResult<Object> {
        Ok(self.objects.get(id)?)
    }

    pub fn get_commit(&self, id: DocId) -> RepoResult<Commit> {
        Ok(self.commits.get(id)?)
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
