use serde::{Deserialize, Serialize};

use docgit_types::DocId;

/// Whether a ref is a branch or a tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    /// A branch; advances as commits land.
    Head,
    /// A fixed pointer.
    Tag,
}

impl RefKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Tag => "tag",
        }
    }
}

impl std::fmt::Display for RefKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named pointer to a commit.
///
/// `cid` is `None` only for a branch that has no commits yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    #[serde(rename = "_id", default, skip_serializing)]
    pub id: DocId,
    pub name: String,
    pub kind: RefKind,
    #[serde(default)]
    pub cid: Option<DocId>,
}

impl Ref {
    pub fn new(name: impl Into<String>, kind: RefKind, cid: Option<DocId>) -> Self {
        Self {
            id: DocId::UNASSIGNED,
            name: name.into(),
            kind,
            cid,
        }
    }

    pub fn is_tag(&self) -> bool {
        self.kind == RefKind::Tag
    }
}

/// The checked-out ref.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Head {
    pub ref_name: String,
    pub kind: RefKind,
}

impl Head {
    pub fn new(ref_name: impl Into<String>, kind: RefKind) -> Self {
        Self {
            ref_name: ref_name.into(),
            kind,
        }
    }
}

impl std::fmt::Display for Head {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.ref_name, self.kind)
    }
}
