//! Index entry types.

use serde::{Deserialize, Serialize};

use docgit_types::DocId;

/// How a staged file relates to the last commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageAction {
    #[serde(rename = "new file")]
    NewFile,
    #[serde(rename = "modified")]
    Modified,
}

impl StageAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewFile => "new file",
            Self::Modified => "modified",
        }
    }
}

impl std::fmt::Display for StageAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A staged file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Absolute path of the file.
    pub path: String,
    pub parent: String,
    pub name: String,
    /// The blob linked at `path` in the working tree.
    pub blob_id: DocId,
    pub action: StageAction,
    /// `true` when the blob was written by this staging set and may be
    /// overwritten in place by a later edit.
    pub fresh: bool,
}

impl IndexEntry {
    pub fn new(
        path: impl Into<String>,
        parent: impl Into<String>,
        name: impl Into<String>,
        blob_id: DocId,
        action: StageAction,
        fresh: bool,
    ) -> Self {
        Self {
            path: path.into(),
            parent: parent.into(),
            name: name.into(),
            blob_id,
            action,
            fresh,
        }
    }
}
