use docgit_dag::Commit;
use docgit_index::StagedChange;
use docgit_refs::Head;
use docgit_types::DocId;

/// Result of [`Repository::commit`](crate::Repository::commit).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(Commit),
    /// Nothing was staged. No commit was written and no ref moved.
    NothingToCommit,
}

impl CommitOutcome {
    pub fn commit(&self) -> Option<&Commit> {
        match self {
            Self::Committed(commit) => Some(commit),
            Self::NothingToCommit => None,
        }
    }

    pub fn commit_id(&self) -> Option<DocId> {
        self.commit().map(|c| c.id)
    }
}

/// Where HEAD points and what is staged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusReport {
    pub head: Head,
    /// Tip commit of the checked-out ref.
    pub tip: Option<DocId>,
    pub staged: Vec<StagedChange>,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
    }
}

/// A copy of the index state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexSnapshot {
    pub working_root: DocId,
    pub pending_blob_ids: Vec<DocId>,
    pub pending_tree_ids: Vec<DocId>,
}
