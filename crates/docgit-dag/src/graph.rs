//! Commit storage and the history walk.

use std::sync::Arc;

use tracing::info;

use docgit_docstore::{from_document, to_document, Collection, DocumentStore, Filter};
use docgit_types::DocId;

use crate::commit::{Commit, COMMITS};
use crate::error::{DagError, DagResult};

/// Commit records on top of a [`DocumentStore`].
#[derive(Clone)]
pub struct CommitGraph {
    docs: Arc<dyn DocumentStore>,
}

impl CommitGraph {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    fn commits(&self) -> Collection<'_> {
        Collection::new(self.docs.as_ref(), COMMITS)
    }

    /// Store a new commit and return it as stored, timestamp included.
    pub fn insert(
        &self,
        parent_id: Option<DocId>,
        tree_id: DocId,
        message: &str,
        author: &str,
    ) -> DagResult<Commit> {
        let commit = Commit::new(parent_id, tree_id, message, author);
        let id = self.commits().insert(to_document(&commit)?)?;
        let stored = self.get(id)?;
        info!(commit = %id, parent = ?parent_id, tree = %tree_id, "commit recorded");
        Ok(stored)
    }

    pub fn get(&self, id: DocId) -> DagResult<Commit> {
        match self.commits().find_one(&Filter::by_id(id))? {
            Some(doc) => Ok(from_document(doc)?),
            None => Err(DagError::CommitNotFound(id)),
        }
    }

    pub fn contains(&self, id: DocId) -> DagResult<bool> {
        Ok(self.commits().find_one(&Filter::by_id(id))?.is_some())
    }

    pub fn count(&self) -> DagResult<usize> {
        Ok(self.commits().count(&Filter::all())?)
    }

    /// Walk history backward from `tip`. An absent tip walks nothing.
    pub fn walk(&self, tip: Option<DocId>) -> CommitWalk {
        CommitWalk {
            graph: self.clone(),
            step: match tip {
                Some(id) => Step::Commit(id),
                None => Step::Done,
            },
        }
    }
}

impl std::fmt::Debug for CommitGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitGraph").finish_non_exhaustive()
    }
}

enum Step {
    Commit(DocId),
    Violation { child: DocId, parent: DocId },
    Done,
}

/// Lazy walk from a tip commit to the root commit, inclusive.
///
/// Ids strictly decrease along the walk. A parent id that is not smaller
/// than its child is reported as [`DagError::OrderingViolation`] after the
/// child is yielded, and the walk ends there, so corrupt data cannot make
/// it loop. A walk is consumed once; start a new one to restart.
pub struct CommitWalk {
    graph: CommitGraph,
    step: Step,
}

impl Iterator for CommitWalk {
    type Item = DagResult<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.step, Step::Done) {
            Step::Done => None,
            Step::Violation { child, parent } => {
                Some(Err(DagError::OrderingViolation { child, parent }))
            }
            Step::Commit(id) => {
                let commit = match self.graph.get(id) {
                    Ok(commit) => commit,
                    Err(e) => return Some(Err(e)),
                };
                self.step = match commit.parent_id {
                    None => Step::Done,
                    Some(parent) if parent < commit.id => Step::Commit(parent),
                    Some(parent) => Step::Violation {
                        child: commit.id,
                        parent,
                    },
                };
                Some(Ok(commit))
            }
        }
    }
}

impl std::iter::FusedIterator for CommitWalk {}

#[cfg(test)]
mod tests {
    use super::*;
    use docgit_docstore::{InMemoryDocumentStore, Patch};

    fn graph() -> (Arc<InMemoryDocumentStore>, CommitGraph) {
        let docs = Arc::new(InMemoryDocumentStore::new());
        (docs.clone(), CommitGraph::new(docs))
    }

    fn chain(graph: &CommitGraph, n: usize) -> Vec<Commit> {
        let mut out: Vec<Commit> = Vec::new();
        for i in 0..n {
            let parent = out.last().map(|c| c.id);
            out.push(graph.insert(parent, DocId::new(1000), &format!("c{i}"), "tester").unwrap());
        }
        out
    }

    #[test]
    fn insert_reads_back_timestamp() {
        let (_, graph) = graph();
        let c = graph.insert(None, DocId::new(7), "first", "tester").unwrap();
        assert!(c.id.is_assigned());
        assert!(c.timestamp_ms > 0);
        assert!(c.is_root());
        assert_eq!(graph.get(c.id).unwrap(), c);
        assert_eq!(graph.count().unwrap(), 1);
    }

    #[test]
    fn missing_commit_is_reported() {
        let (_, graph) = graph();
        assert!(matches!(graph.get(DocId::new(3)), Err(DagError::CommitNotFound(_))));
        assert!(!graph.contains(DocId::new(3)).unwrap());
    }

    #[test]
    fn walk_goes_from_tip_to_root() {
        let (_, graph) = graph();
        let commits = chain(&graph, 4);
        let walked: Vec<Commit> = graph
            .walk(Some(commits[3].id))
            .collect::<DagResult<_>>()
            .unwrap();
        assert_eq!(walked.len(), 4);
        assert!(walked.windows(2).all(|w| w[0].id > w[1].id));
        assert!(walked.last().unwrap().is_root());
        assert_eq!(walked[0].message, "c3");
    }

    #[test]
    fn walk_from_nothing_is_empty() {
        let (_, graph) = graph();
        assert_eq!(graph.walk(None).count(), 0);
    }

    #[test]
    fn walk_from_middle_stops_at_root() {
        let (_, graph) = graph();
        let commits = chain(&graph, 3);
        assert_eq!(graph.walk(Some(commits[1].id)).count(), 2);
    }

    #[test]
    fn cycle_in_stored_data_ends_the_walk() {
        let (docs, graph) = graph();
        let commits = chain(&graph, 2);
        // Point the root at the tip to make a loop.
        docs.update(
            COMMITS,
            &Filter::by_id(commits[0].id),
            &Patch::new().set("parent_id", commits[1].id),
        )
        .unwrap();

        let items: Vec<_> = graph.walk(Some(commits[1].id)).collect();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok() && items[1].is_ok());
        assert!(matches!(items[2], Err(DagError::OrderingViolation { .. })));
    }

    #[test]
    fn dangling_parent_is_reported() {
        let (_, graph) = graph();
        let c = graph.insert(Some(DocId::new(0)), DocId::new(1), "orphan", "t").unwrap();
        let items: Vec<_> = graph.walk(Some(c.id)).collect();
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(DagError::CommitNotFound(_))));
    }
}
