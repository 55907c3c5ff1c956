//! Snapshot-level diff: which blob paths changed between two trees.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use docgit_types::DocId;

/// A single change between two flattened trees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeChange {
    Added { path: String, blob: DocId },
    Deleted { path: String, blob: DocId },
    Modified { path: String, old: DocId, new: DocId },
}

impl TreeChange {
    pub fn path(&self) -> &str {
        match self {
            Self::Added { path, .. } | Self::Deleted { path, .. } | Self::Modified { path, .. } => {
                path
            }
        }
    }
}

impl std::fmt::Display for TreeChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added { path, .. } => write!(f, "A {path}"),
            Self::Deleted { path, .. } => write!(f, "D {path}"),
            Self::Modified { path, .. } => write!(f, "M {path}"),
        }
    }
}

/// The changes between two snapshots, sorted by path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDiff {
    pub changes: Vec<TreeChange>,
}

impl TreeDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// Compare two path-to-blob listings.
pub fn diff_listings(old: &BTreeMap<String, DocId>, new: &BTreeMap<String, DocId>) -> TreeDiff {
    let mut changes = Vec::new();
    for (path, &old_id) in old {
        match new.get(path) {
            None => changes.push(TreeChange::Deleted {
                path: path.clone(),
                blob: old_id,
            }),
            Some(&new_id) if new_id != old_id => changes.push(TreeChange::Modified {
                path: path.clone(),
                old: old_id,
                new: new_id,
            }),
            Some(_) => {}
        }
    }
    for (path, &new_id) in new {
        if !old.contains_key(path) {
            changes.push(TreeChange::Added {
                path: path.clone(),
                blob: new_id,
            });
        }
    }
    changes.sort_by(|a, b| a.path().cmp(b.path()));
    TreeDiff { changes }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(entries: &[(&str, u64)]) -> BTreeMap<String, DocId> {
        entries
            .iter()
            .map(|&(path, id)| (path.to_string(), DocId::new(id)))
            .collect()
    }

    #[test]
    fn identical_listings_have_no_changes() {
        let a = listing(&[("/a", 1), ("/b/c", 2)]);
        assert!(diff_listings(&a, &a).is_empty());
    }

    #[test]
    fn detects_each_change_kind() {
        let old = listing(&[("/a", 1), ("/b", 2), ("/c", 3)]);
        let new = listing(&[("/a", 1), ("/b", 5), ("/d", 6)]);
        let diff = diff_listings(&old, &new);
        let rendered: Vec<String> = diff.changes.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["M /b", "D /c", "A /d"]);
        assert_eq!(
            diff.changes[0],
            TreeChange::Modified {
                path: "/b".into(),
                old: DocId::new(2),
                new: DocId::new(5)
            }
        );
    }
}
