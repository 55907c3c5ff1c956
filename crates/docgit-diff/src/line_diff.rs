//! Line-level diff of two rendered sequences.
//!
//! Unlike a hunked patch, the result keeps every line, tagged as context,
//! removal, or addition, in the order a reader would walk both versions.

use similar::{ChangeTag, TextDiff};

/// A single tagged line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    /// Present in both versions.
    Context(String),
    /// Only in the new version.
    Added(String),
    /// Only in the old version.
    Removed(String),
}

impl DiffLine {
    /// The line prefix: `' '`, `'+'`, or `'-'`.
    pub fn tag(&self) -> char {
        match self {
            Self::Context(_) => ' ',
            Self::Added(_) => '+',
            Self::Removed(_) => '-',
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Context(text) | Self::Added(text) | Self::Removed(text) => text,
        }
    }
}

impl std::fmt::Display for DiffLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.tag(), self.text())
    }
}

/// The tagged line sequence of a diff.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineDiff {
    pub lines: Vec<DiffLine>,
}

impl LineDiff {
    pub fn additions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }

    /// Returns `true` if the two versions differ.
    pub fn has_changes(&self) -> bool {
        self.lines
            .iter()
            .any(|l| !matches!(l, DiffLine::Context(_)))
    }

    /// Only the removed and added lines, in order.
    pub fn changes(&self) -> impl Iterator<Item = &DiffLine> {
        self.lines
            .iter()
            .filter(|l| !matches!(l, DiffLine::Context(_)))
    }
}

impl std::fmt::Display for LineDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Diff two line sequences.
pub fn diff_lines(old: &[String], new: &[String]) -> LineDiff {
    let old: Vec<&str> = old.iter().map(String::as_str).collect();
    let new: Vec<&str> = new.iter().map(String::as_str).collect();
    let diff = TextDiff::from_slices(&old, &new);

    let lines = diff
        .iter_all_changes()
        .map(|change| {
            let text = change.value().to_string();
            match change.tag() {
                ChangeTag::Equal => DiffLine::Context(text),
                ChangeTag::Delete => DiffLine::Removed(text),
                ChangeTag::Insert => DiffLine::Added(text),
            }
        })
        .collect();
    LineDiff { lines }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_owned).collect()
    }

    #[test]
    fn identical_sequences_have_no_changes() {
        let diff = diff_lines(&lines("a\nb"), &lines("a\nb"));
        assert!(!diff.has_changes());
        assert_eq!(diff.lines.len(), 2);
    }

    #[test]
    fn single_replacement() {
        let diff = diff_lines(&lines("v1"), &lines("v2"));
        assert_eq!(
            diff.lines,
            vec![DiffLine::Removed("v1".into()), DiffLine::Added("v2".into())]
        );
        assert_eq!((diff.deletions(), diff.additions()), (1, 1));
    }

    #[test]
    fn context_is_kept_in_order() {
        let diff = diff_lines(&lines("a\nb\nc"), &lines("a\nB\nc\nd"));
        let rendered: Vec<String> = diff.lines.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["  a", "- b", "+ B", "  c", "+ d"]);
        assert_eq!(diff.changes().count(), 3);
    }
}
