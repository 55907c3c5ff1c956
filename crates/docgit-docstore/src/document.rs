//! Documents, filters, patches, and typed-record conversion.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use docgit_types::DocId;

use crate::error::{DocStoreError, DocStoreResult};

/// A stored document: a JSON object.
pub type Document = Map<String, Value>;

/// Field holding the store-assigned id.
pub const ID_FIELD: &str = "_id";
/// Field holding the id-assignment time in milliseconds since the epoch.
pub const CREATED_FIELD: &str = "_created_ms";

/// Read the store-assigned id of a document.
pub fn document_id(doc: &Document) -> Option<DocId> {
    doc.get(ID_FIELD).and_then(Value::as_u64).map(DocId::new)
}

/// Serialize a typed record into a document.
pub fn to_document<T: Serialize>(value: &T) -> DocStoreResult<Document> {
    match serde_json::to_value(value).map_err(|e| DocStoreError::Serialization(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(DocStoreError::InvalidDocument(format!(
            "record serialized to a non-object value: {other}"
        ))),
    }
}

/// Deserialize a document into a typed record.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> DocStoreResult<T> {
    serde_json::from_value(Value::Object(doc))
        .map_err(|e| DocStoreError::Serialization(e.to_string()))
}

/// Field-equality filter.
///
/// A document matches when every condition holds. A field missing from the
/// document compares equal to `null`, so `eq("cid", Value::Null)` matches
/// both explicit nulls and absent fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// A filter matching every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter on the store-assigned id.
    pub fn by_id(id: DocId) -> Self {
        Self::all().eq(ID_FIELD, id)
    }

    /// Add an equality condition.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    /// The id this filter pins, if it has an `_id` condition.
    pub fn pinned_id(&self) -> Option<DocId> {
        self.conditions
            .iter()
            .find(|(field, _)| field == ID_FIELD)
            .and_then(|(_, value)| value.as_u64())
            .map(DocId::new)
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| doc.get(field).unwrap_or(&Value::Null) == expected)
    }
}

/// Partial field replacement (`$set`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patch {
    fields: Document,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Apply the patch. Reserved fields are skipped.
    pub fn apply(&self, doc: &mut Document) {
        for (field, value) in &self.fields {
            if field == ID_FIELD || field == CREATED_FIELD {
                continue;
            }
            doc.insert(field.clone(), value.clone());
        }
    }
}

/// Result ordering by insertion (id) order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    OldestFirst,
    NewestFirst,
}

/// Options for [`find`](crate::DocumentStore::find).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn newest_first() -> Self {
        Self {
            order: SortOrder::NewestFirst,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn filter_matches_all_conditions() {
        let d = doc(json!({"name": "master", "kind": "head"}));
        assert!(Filter::all().matches(&d));
        assert!(Filter::all().eq("name", "master").eq("kind", "head").matches(&d));
        assert!(!Filter::all().eq("name", "master").eq("kind", "tag").matches(&d));
    }

    #[test]
    fn missing_field_equals_null() {
        let d = doc(json!({"name": "dev"}));
        assert!(Filter::all().eq("cid", Value::Null).matches(&d));
        assert!(!Filter::all().eq("cid", 3).matches(&d));
    }

    #[test]
    fn pinned_id_reads_id_condition() {
        assert_eq!(Filter::by_id(DocId::new(9)).pinned_id(), Some(DocId::new(9)));
        assert_eq!(Filter::all().eq("name", "x").pinned_id(), None);
    }

    #[test]
    fn patch_skips_reserved_fields() {
        let mut d = doc(json!({"_id": 4, "cid": null}));
        Patch::new().set("_id", 99).set("cid", 7).apply(&mut d);
        assert_eq!(d.get("_id"), Some(&json!(4)));
        assert_eq!(d.get("cid"), Some(&json!(7)));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        size: u32,
    }

    #[test]
    fn typed_record_conversion() {
        let record = Record { name: "a".into(), size: 3 };
        let mut d = to_document(&record).unwrap();
        d.insert(ID_FIELD.into(), json!(12));
        assert_eq!(document_id(&d), Some(DocId::new(12)));
        let back: Record = from_document(d).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn non_object_records_are_rejected() {
        assert!(matches!(to_document(&5u32), Err(DocStoreError::InvalidDocument(_))));
    }
}
