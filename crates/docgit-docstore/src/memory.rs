use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tracing::trace;

use docgit_types::DocId;

use crate::document::{document_id, Document, Filter, FindOptions, Patch, SortOrder};
use crate::document::{CREATED_FIELD, ID_FIELD};
use crate::error::{DocStoreError, DocStoreResult};
use crate::traits::DocumentStore;

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    last_id: u64,
}

/// In-memory document store.
///
/// Intended for tests and embedding. Each collection is a `Vec` kept in id
/// order, so id lookups binary-search and scans are insertion-ordered. The
/// id counter lives under the same lock as the collections, which keeps id
/// assignment and append atomic.
pub struct InMemoryDocumentStore {
    inner: RwLock<Inner>,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> DocStoreError {
    DocStoreError::Poisoned("document store lock".into())
}

fn position_of(docs: &[Document], id: DocId) -> Option<usize> {
    docs.binary_search_by_key(&id.get(), |doc| document_id(doc).map_or(0, DocId::get))
        .ok()
}

/// Indices of matching documents in the requested order.
fn matching(docs: &[Document], filter: &Filter, options: FindOptions) -> Vec<usize> {
    let limit = options.limit.unwrap_or(usize::MAX);
    if let Some(id) = filter.pinned_id() {
        return position_of(docs, id)
            .filter(|&i| filter.matches(&docs[i]))
            .into_iter()
            .take(limit)
            .collect();
    }
    let hits = (0..docs.len()).filter(|&i| filter.matches(&docs[i]));
    match options.order {
        SortOrder::OldestFirst => hits.take(limit).collect(),
        SortOrder::NewestFirst => hits.rev().take(limit).collect(),
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Total number of documents across all collections.
    pub fn len(&self) -> DocStoreResult<usize> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.collections.values().map(Vec::len).sum())
    }

    pub fn is_empty(&self) -> DocStoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn insert(&self, collection: &str, mut doc: Document) -> DocStoreResult<DocId> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.last_id += 1;
        let id = DocId::new(inner.last_id);
        doc.insert(ID_FIELD.into(), Value::from(id.get()));
        doc.insert(CREATED_FIELD.into(), Value::from(now_ms()));
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(doc);
        trace!(collection, %id, "document inserted");
        Ok(id)
    }

    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: FindOptions,
    ) -> DocStoreResult<Vec<Document>> {
        let inner = self.inner.read().map_err(poisoned)?;
        let Some(docs) = inner.collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(matching(docs, filter, options)
            .into_iter()
            .map(|i| docs[i].clone())
            .collect())
    }

    fn update(&self, collection: &str, filter: &Filter, patch: &Patch) -> DocStoreResult<u64> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let Some(docs) = inner.collections.get_mut(collection) else {
            return Ok(0);
        };
        let first = matching(docs, filter, FindOptions::default().with_limit(1));
        match first.first() {
            Some(&i) => {
                patch.apply(&mut docs[i]);
                trace!(collection, "document updated");
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len().unwrap_or_default();
        f.debug_struct("InMemoryDocumentStore")
            .field("document_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn insert_assigns_increasing_ids_across_collections() {
        let store = InMemoryDocumentStore::new();
        let a = store.insert("objects", doc(json!({"name": "a"}))).unwrap();
        let b = store.insert("refs", doc(json!({"name": "b"}))).unwrap();
        let c = store.insert("objects", doc(json!({"name": "c"}))).unwrap();
        assert!(a < b && b < c);
        assert_eq!(store.len().unwrap(), 3);
    }

    #[test]
    fn insert_overwrites_reserved_fields() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .insert("objects", doc(json!({"_id": 500, "_created_ms": 1})))
            .unwrap();
        let found = store.find_one("objects", &Filter::by_id(id)).unwrap().unwrap();
        assert_eq!(document_id(&found), Some(id));
        assert!(found[CREATED_FIELD].as_u64().unwrap() > 1);
    }

    #[test]
    fn find_by_id_and_field() {
        let store = InMemoryDocumentStore::new();
        let a = store.insert("objects", doc(json!({"kind": "blob"}))).unwrap();
        let b = store.insert("objects", doc(json!({"kind": "tree"}))).unwrap();

        let hit = store.find_one("objects", &Filter::by_id(b)).unwrap().unwrap();
        assert_eq!(hit["kind"], "tree");
        assert!(store
            .find_one("objects", &Filter::by_id(a).eq("kind", "tree"))
            .unwrap()
            .is_none());
        assert!(store.find_one("objects", &Filter::by_id(DocId::new(77))).unwrap().is_none());
        assert!(store.find_one("missing", &Filter::all()).unwrap().is_none());
    }

    #[test]
    fn newest_first_with_limit() {
        let store = InMemoryDocumentStore::new();
        for n in 0..5 {
            store.insert("commits", doc(json!({"n": n}))).unwrap();
        }
        let docs = store
            .find("commits", &Filter::all(), FindOptions::newest_first().with_limit(2))
            .unwrap();
        let ns: Vec<_> = docs.iter().map(|d| d["n"].as_u64().unwrap()).collect();
        assert_eq!(ns, vec![4, 3]);
        assert_eq!(store.last("commits").unwrap().unwrap()["n"], 4);
        assert_eq!(store.count("commits", &Filter::all()).unwrap(), 5);
    }

    #[test]
    fn update_patches_first_match_only() {
        let store = InMemoryDocumentStore::new();
        store.insert("refs", doc(json!({"name": "x", "cid": null}))).unwrap();
        store.insert("refs", doc(json!({"name": "x", "cid": null}))).unwrap();

        let matched = store
            .update("refs", &Filter::all().eq("name", "x"), &Patch::new().set("cid", 9))
            .unwrap();
        assert_eq!(matched, 1);
        let docs = store.find("refs", &Filter::all(), FindOptions::default()).unwrap();
        assert_eq!(docs[0]["cid"], 9);
        assert_eq!(docs[1]["cid"], Value::Null);
    }

    #[test]
    fn update_as_compare_and_swap() {
        let store = InMemoryDocumentStore::new();
        store.insert("refs", doc(json!({"name": "master"}))).unwrap();

        let expect_none = Filter::all().eq("name", "master").eq("cid", Value::Null);
        assert_eq!(store.update("refs", &expect_none, &Patch::new().set("cid", 5)).unwrap(), 1);
        // The second swap from the same expected value loses.
        assert_eq!(store.update("refs", &expect_none, &Patch::new().set("cid", 6)).unwrap(), 0);
        let current = store.find_one("refs", &Filter::all()).unwrap().unwrap();
        assert_eq!(current["cid"], 5);
    }

    #[test]
    fn concurrent_inserts_get_unique_ids() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..50)
                        .map(|n| store.insert("objects", doc(json!({"t": t, "n": n}))).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut ids: Vec<DocId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 400);

        let docs = store.find("objects", &Filter::all(), FindOptions::default()).unwrap();
        let stored: Vec<_> = docs.iter().filter_map(document_id).collect();
        assert!(stored.windows(2).all(|w| w[0] < w[1]));
    }
}
