use serde::{Deserialize, Serialize};

use docgit_types::DocId;

/// Collection holding commit records.
pub const COMMITS: &str = "commits";

/// An immutable snapshot of the whole tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(rename = "_id", default, skip_serializing)]
    pub id: DocId,
    /// `None` only for the first commit of a history.
    #[serde(default)]
    pub parent_id: Option<DocId>,
    /// The frozen root tree.
    pub tree_id: DocId,
    pub message: String,
    pub author: String,
    /// Milliseconds since the epoch at which the store assigned `id`.
    #[serde(rename = "_created_ms", default, skip_serializing)]
    pub timestamp_ms: u64,
}

impl Commit {
    pub fn new(
        parent_id: Option<DocId>,
        tree_id: DocId,
        message: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: DocId::UNASSIGNED,
            parent_id,
            tree_id,
            message: message.into(),
            author: author.into(),
            timestamp_ms: 0,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl std::fmt::Display for Commit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "commit {} ({}): {}", self.id, self.author, self.message)
    }
}
