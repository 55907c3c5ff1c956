//! Pairing removed lines with added lines.
//!
//! [`extract_diff`] matches the i-th removed line with the i-th added line.
//! The pairing is positional, not by field name: when a version gains or
//! loses a field, or fields move, later pairs misalign. Callers that need
//! key-aware comparison should compare the structured payloads directly.

use serde::{Deserialize, Serialize};

use crate::line_diff::DiffLine;

/// An old/new value pair. A side is `None` when one version has more
/// changed lines than the other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: Option<String>,
    pub new: Option<String>,
}

impl FieldChange {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: Some(old.into()),
            new: Some(new.into()),
        }
    }
}

/// Strip indentation and a trailing comma from a rendered line.
fn clean(text: &str) -> String {
    let text = text.trim();
    text.strip_suffix(',').unwrap_or(text).to_string()
}

/// Pair removed and added lines positionally.
pub fn extract_diff<'a, I>(lines: I) -> Vec<FieldChange>
where
    I: IntoIterator<Item = &'a DiffLine>,
{
    let mut removed = Vec::new();
    let mut added = Vec::new();
    for line in lines {
        match line {
            DiffLine::Removed(text) => removed.push(clean(text)),
            DiffLine::Added(text) => added.push(clean(text)),
            DiffLine::Context(_) => {}
        }
    }

    let len = removed.len().max(added.len());
    let mut removed = removed.into_iter();
    let mut added = added.into_iter();
    (0..len)
        .map(|_| FieldChange {
            old: removed.next(),
            new: added.next(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_diff::diff_lines;
    use crate::render::render_payload;
    use docgit_types::Payload;
    use serde_json::json;

    #[test]
    fn structured_field_change() {
        let old = Payload::structured(json!({"Ar40": 10, "Ar39": 2})).unwrap();
        let new = Payload::structured(json!({"Ar40": 12, "Ar39": 2})).unwrap();
        let diff = diff_lines(&render_payload(&old), &render_payload(&new));
        assert_eq!(
            extract_diff(&diff.lines),
            vec![FieldChange::new("\"Ar40\": 10", "\"Ar40\": 12")]
        );
    }

    #[test]
    fn pairs_are_positional() {
        let lines = vec![
            DiffLine::Removed("  \"a\": 1,".into()),
            DiffLine::Removed("  \"b\": 2,".into()),
            DiffLine::Context("  \"c\": 3".into()),
            DiffLine::Added("  \"b\": 5,".into()),
        ];
        // The lone addition pairs with the first removal, not with "b".
        assert_eq!(
            extract_diff(&lines),
            vec![
                FieldChange::new("\"a\": 1", "\"b\": 5"),
                FieldChange {
                    old: Some("\"b\": 2".into()),
                    new: None,
                },
            ]
        );
    }

    #[test]
    fn no_changes_no_pairs() {
        let lines = vec![DiffLine::Context("x".into())];
        assert!(extract_diff(&lines).is_empty());
    }
}
