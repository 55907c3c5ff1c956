use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use docgit_docstore::{
    from_document, to_document, Collection, DocumentStore, Filter, FindOptions, Patch,
};
use docgit_types::DocId;

use crate::error::{RefError, RefResult};
use crate::names::validate_ref_name;
use crate::types::{Head, Ref, RefKind};

/// Collection holding branch and tag records.
pub const REFS: &str = "refs";
/// Collection holding the HEAD record.
pub const META: &str = "meta";

const HEAD_KEY: &str = "HEAD";

/// Ref and HEAD records on top of a [`DocumentStore`].
#[derive(Clone)]
pub struct RefTable {
    docs: Arc<dyn DocumentStore>,
}

impl RefTable {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    fn refs(&self) -> Collection<'_> {
        Collection::new(self.docs.as_ref(), REFS)
    }

    fn meta(&self) -> Collection<'_> {
        Collection::new(self.docs.as_ref(), META)
    }

    /// Create HEAD and the default branch if they do not exist yet.
    ///
    /// Calling this on an initialized table returns the current HEAD and
    /// writes nothing.
    pub fn init(&self, default_branch: &str) -> RefResult<Head> {
        if let Some(head) = self.try_head()? {
            return Ok(head);
        }
        validate_ref_name(default_branch)?;
        if self.read_ref(default_branch, RefKind::Head)?.is_none() {
            self.add_ref(default_branch, RefKind::Head, None)?;
        }
        let head = Head::new(default_branch, RefKind::Head);
        self.set_head(&head)?;
        info!(branch = default_branch, "ref table initialized");
        Ok(head)
    }

    pub fn read_ref(&self, name: &str, kind: RefKind) -> RefResult<Option<Ref>> {
        let filter = Filter::all().eq("name", name).eq("kind", kind.as_str());
        self.refs()
            .find_one(&filter)?
            .map(|doc| from_document(doc).map_err(RefError::from))
            .transpose()
    }

    /// Look a name up among heads first, then tags.
    pub fn find_ref(&self, name: &str) -> RefResult<Option<Ref>> {
        match self.read_ref(name, RefKind::Head)? {
            Some(r) => Ok(Some(r)),
            None => self.read_ref(name, RefKind::Tag),
        }
    }

    pub fn add_ref(&self, name: &str, kind: RefKind, cid: Option<DocId>) -> RefResult<Ref> {
        validate_ref_name(name)?;
        if self.read_ref(name, kind)?.is_some() {
            return Err(RefError::AlreadyExists {
                name: name.to_string(),
            });
        }
        let mut r = Ref::new(name, kind, cid);
        r.id = self.refs().insert(to_document(&r)?)?;
        debug!(name, kind = kind.as_str(), cid = ?cid, "ref created");
        Ok(r)
    }

    /// Create a tag at `cid`.
    pub fn add_tag(&self, name: &str, cid: DocId) -> RefResult<Ref> {
        self.add_ref(name, RefKind::Tag, Some(cid))
    }

    /// Advance branch `name` from `expected` to `new`.
    ///
    /// The write is conditional on the stored `cid` still being `expected`.
    /// A concurrent writer that moved the branch first makes this fail with
    /// [`RefError::ConcurrentModification`].
    pub fn update_ref(&self, name: &str, expected: Option<DocId>, new: DocId) -> RefResult<Ref> {
        let Some(mut r) = self.read_ref(name, RefKind::Head)? else {
            if self.read_ref(name, RefKind::Tag)?.is_some() {
                return Err(RefError::TagImmutable {
                    name: name.to_string(),
                });
            }
            return Err(RefError::NotFound {
                name: name.to_string(),
            });
        };
        let filter = Filter::by_id(r.id)
            .eq("kind", RefKind::Head.as_str())
            .eq("cid", Value::from(expected));
        if self.refs().update(&filter, &Patch::new().set("cid", new))? == 0 {
            return Err(RefError::ConcurrentModification {
                name: name.to_string(),
            });
        }
        debug!(name, from = ?expected, to = %new, "ref advanced");
        r.cid = Some(new);
        Ok(r)
    }

    fn try_head(&self) -> RefResult<Option<Head>> {
        self.meta()
            .find_one(&Filter::all().eq("name", HEAD_KEY))?
            .map(|doc| from_document(doc).map_err(RefError::from))
            .transpose()
    }

    pub fn head(&self) -> RefResult<Head> {
        self.try_head()?.ok_or(RefError::HeadMissing)
    }

    /// Point HEAD at `head`. The ref is not checked here.
    pub fn set_head(&self, head: &Head) -> RefResult<()> {
        let patch = Patch::new()
            .set("ref_name", head.ref_name.as_str())
            .set("kind", head.kind.as_str());
        let filter = Filter::all().eq("name", HEAD_KEY);
        if self.meta().update(&filter, &patch)? == 0 {
            let mut doc = to_document(head)?;
            doc.insert("name".into(), Value::from(HEAD_KEY));
            self.meta().insert(doc)?;
        }
        debug!(head = %head, "HEAD moved");
        Ok(())
    }

    /// All refs of `kind`, oldest first.
    pub fn list(&self, kind: RefKind) -> RefResult<Vec<Ref>> {
        self.refs()
            .find(&Filter::all().eq("kind", kind.as_str()), FindOptions::default())?
            .into_iter()
            .map(|doc| from_document(doc).map_err(RefError::from))
            .collect()
    }
}

impl std::fmt::Debug for RefTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefTable").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgit_docstore::InMemoryDocumentStore;

    fn table() -> RefTable {
        RefTable::new(Arc::new(InMemoryDocumentStore::new()))
    }

    #[test]
    fn init_creates_default_branch_and_head() {
        let refs = table();
        let head = refs.init("master").unwrap();
        assert_eq!(head, Head::new("master", RefKind::Head));

        let heads = refs.list(RefKind::Head).unwrap();
        assert_eq!(heads.len(), 1);
        assert_eq!(heads[0].name, "master");
        assert_eq!(heads[0].cid, None);
    }

    #[test]
    fn init_is_idempotent() {
        let refs = table();
        refs.init("master").unwrap();
        refs.add_ref("dev", RefKind::Head, None).unwrap();
        refs.set_head(&Head::new("dev", RefKind::Head)).unwrap();

        let head = refs.init("master").unwrap();
        assert_eq!(head.ref_name, "dev");
        assert_eq!(refs.list(RefKind::Head).unwrap().len(), 2);
    }

    #[test]
    fn head_missing_before_init() {
        assert!(matches!(table().head(), Err(RefError::HeadMissing)));
    }

    #[test]
    fn duplicate_and_invalid_names_are_rejected() {
        let refs = table();
        refs.init("master").unwrap();
        assert!(matches!(
            refs.add_ref("master", RefKind::Head, None),
            Err(RefError::AlreadyExists { .. })
        ));
        assert!(matches!(
            refs.add_ref("bad name", RefKind::Head, None),
            Err(RefError::InvalidName { .. })
        ));
        // Same name, different kind, is allowed.
        refs.add_ref("master", RefKind::Tag, Some(DocId::new(1))).unwrap();
    }

    #[test]
    fn find_ref_prefers_heads() {
        let refs = table();
        refs.add_tag("v1", DocId::new(3)).unwrap();
        assert_eq!(refs.find_ref("v1").unwrap().unwrap().kind, RefKind::Tag);
        refs.add_ref("v1", RefKind::Head, None).unwrap();
        assert_eq!(refs.find_ref("v1").unwrap().unwrap().kind, RefKind::Head);
        assert!(refs.find_ref("nope").unwrap().is_none());
    }

    #[test]
    fn update_ref_is_compare_and_swap() {
        let refs = table();
        refs.init("master").unwrap();
        let r = refs.update_ref("master", None, DocId::new(10)).unwrap();
        assert_eq!(r.cid, Some(DocId::new(10)));

        assert!(matches!(
            refs.update_ref("master", None, DocId::new(11)),
            Err(RefError::ConcurrentModification { .. })
        ));
        let stored = refs.read_ref("master", RefKind::Head).unwrap().unwrap();
        assert_eq!(stored.cid, Some(DocId::new(10)));

        refs.update_ref("master", Some(DocId::new(10)), DocId::new(12)).unwrap();
    }

    #[test]
    fn update_ref_rejects_tags_and_unknown_names() {
        let refs = table();
        refs.add_tag("v1", DocId::new(3)).unwrap();
        assert!(matches!(
            refs.update_ref("v1", Some(DocId::new(3)), DocId::new(4)),
            Err(RefError::TagImmutable { .. })
        ));
        assert!(matches!(
            refs.update_ref("ghost", None, DocId::new(4)),
            Err(RefError::NotFound { .. })
        ));
    }

    #[test]
    fn set_head_overwrites_single_record() {
        let refs = table();
        refs.init("master").unwrap();
        refs.set_head(&Head::new("v1", RefKind::Tag)).unwrap();
        assert_eq!(refs.head().unwrap(), Head::new("v1", RefKind::Tag));
        assert_eq!(refs.docs.count(META, &Filter::all()).unwrap(), 1);
    }
}
