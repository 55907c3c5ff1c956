//! Staging results and status listings.

use serde::{Deserialize, Serialize};

use docgit_types::DocId;

use crate::entry::StageAction;

/// What a call to [`Index::stage`](crate::Index::stage) did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageOutcome {
    /// The working tree already holds this exact content. Nothing was written.
    Unchanged { blob_id: DocId },
    /// The blob was linked into the working tree.
    Staged { blob_id: DocId, action: StageAction },
    /// A blob staged earlier in this set was overwritten in place.
    Updated { blob_id: DocId },
}

impl StageOutcome {
    pub fn blob_id(&self) -> DocId {
        match *self {
            Self::Unchanged { blob_id } | Self::Staged { blob_id, .. } | Self::Updated { blob_id } => {
                blob_id
            }
        }
    }

    /// Returns `true` if nothing was written.
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged { .. })
    }
}

/// One line of a staged-changes listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedChange {
    pub path: String,
    pub blob_id: DocId,
    pub action: StageAction,
}

impl std::fmt::Display for StagedChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.action, self.path)
    }
}
