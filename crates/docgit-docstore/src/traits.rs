use docgit_types::DocId;

use crate::document::{Document, Filter, FindOptions, Patch};
use crate::error::DocStoreResult;

/// Collection-oriented document store.
///
/// All implementations must satisfy these invariants:
/// - `insert` assigns an `_id` strictly greater than every id assigned
///   before it, in any collection, and stamps `_created_ms`.
/// - Reads in [`SortOrder::OldestFirst`](crate::SortOrder) order return
///   documents in id order.
/// - `update` touches at most one document: the oldest match.
/// - Concurrent calls are safe; each call is atomic on its own.
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return its assigned id.
    ///
    /// Caller-provided `_id` and `_created_ms` fields are overwritten.
    fn insert(&self, collection: &str, doc: Document) -> DocStoreResult<DocId>;

    /// Return the documents matching `filter`.
    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: FindOptions,
    ) -> DocStoreResult<Vec<Document>>;

    /// Patch the oldest document matching `filter`.
    ///
    /// Returns the number of documents matched (0 or 1). Compare-and-swap
    /// callers put the expected current value in the filter and treat 0 as
    /// a lost race.
    fn update(&self, collection: &str, filter: &Filter, patch: &Patch) -> DocStoreResult<u64>;

    /// Return the oldest document matching `filter`.
    fn find_one(&self, collection: &str, filter: &Filter) -> DocStoreResult<Option<Document>> {
        Ok(self
            .find(collection, filter, FindOptions::default().with_limit(1))?
            .into_iter()
            .next())
    }

    /// Return the most recently inserted document of a collection.
    fn last(&self, collection: &str) -> DocStoreResult<Option<Document>> {
        Ok(self
            .find(collection, &Filter::all(), FindOptions::newest_first().with_limit(1))?
            .into_iter()
            .next())
    }

    /// Count the documents matching `filter`.
    fn count(&self, collection: &str, filter: &Filter) -> DocStoreResult<usize> {
        Ok(self.find(collection, filter, FindOptions::default())?.len())
    }
}

/// A store bound to one collection name.
#[derive(Clone, Copy)]
pub struct Collection<'a> {
    store: &'a dyn DocumentStore,
    name: &'a str,
}

impl<'a> Collection<'a> {
    pub fn new(store: &'a dyn DocumentStore, name: &'a str) -> Self {
        Self { store, name }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn insert(&self, doc: Document) -> DocStoreResult<DocId> {
        self.store.insert(self.name, doc)
    }

    pub fn find(&self, filter: &Filter, options: FindOptions) -> DocStoreResult<Vec<Document>> {
        self.store.find(self.name, filter, options)
    }

    pub fn find_one(&self, filter: &Filter) -> DocStoreResult<Option<Document>> {
        self.store.find_one(self.name, filter)
    }

    pub fn update(&self, filter: &Filter, patch: &Patch) -> DocStoreResult<u64> {
        self.store.update(self.name, filter, patch)
    }

    pub fn last(&self) -> DocStoreResult<Option<Document>> {
        self.store.last(self.name)
    }

    pub fn count(&self, filter: &Filter) -> DocStoreResult<usize> {
        self.store.count(self.name, filter)
    }
}

impl std::fmt::Debug for Collection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection").field("name", &self.name).finish()
    }
}
