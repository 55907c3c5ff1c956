//! Absolute tree paths.
//!
//! Paths always start at the root `/` and use `/` as separator. The root is
//! the only path ending in `/`. Empty segments (`//`) are collapsed;
//! `.` and `..` segments are rejected.

use crate::error::TypeError;

/// The root path.
pub const ROOT: &str = "/";

/// Normalize an absolute path.
pub fn normalize(path: &str) -> Result<String, TypeError> {
    if !path.starts_with('/') {
        return Err(TypeError::InvalidPath {
            path: path.to_string(),
            reason: "path must be absolute".into(),
        });
    }
    let mut out = String::with_capacity(path.len());
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." {
            return Err(TypeError::InvalidPath {
                path: path.to_string(),
                reason: format!("relative segment {segment:?}"),
            });
        }
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    Ok(out)
}

/// Validate a leaf name (a single path segment).
pub fn validate_name(name: &str) -> Result<(), TypeError> {
    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(TypeError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Join a normalized parent path and a leaf name.
pub fn join(parent: &str, name: &str) -> String {
    if parent == ROOT {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Segments of a normalized path; the root has none.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Every ancestor-or-self prefix of a normalized path, root first.
///
/// `prefixes("/a/b")` is `["/", "/a", "/a/b"]`.
pub fn prefixes(path: &str) -> Vec<String> {
    let mut out = vec![ROOT.to_string()];
    let mut current = ROOT.to_string();
    for segment in segments(path) {
        current = join(&current, segment);
        out.push(current.clone());
    }
    out
}

/// Split a normalized path into its parent path and leaf name.
///
/// Returns `None` for the root.
pub fn split(path: &str) -> Option<(String, String)> {
    if path == ROOT {
        return None;
    }
    let idx = path.rfind('/')?;
    let parent = if idx == 0 { ROOT.to_string() } else { path[..idx].to_string() };
    Some((parent, path[idx + 1..].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(normalize("/").unwrap(), "/");
        assert_eq!(normalize("//").unwrap(), "/");
        assert_eq!(normalize("/a//b/").unwrap(), "/a/b");
    }

    #[test]
    fn normalize_rejects_relative() {
        assert!(normalize("a/b").is_err());
        assert!(normalize("/a/../b").is_err());
        assert!(normalize("").is_err());
    }

    #[test]
    fn join_handles_root() {
        assert_eq!(join("/", "f"), "/f");
        assert_eq!(join("/a/b", "f"), "/a/b/f");
    }

    #[test]
    fn prefixes_start_at_root() {
        assert_eq!(prefixes("/"), vec!["/"]);
        assert_eq!(prefixes("/a/b"), vec!["/", "/a", "/a/b"]);
    }

    #[test]
    fn split_parent_and_name() {
        assert_eq!(split("/f"), Some(("/".into(), "f".into())));
        assert_eq!(split("/a/b/f"), Some(("/a/b".into(), "f".into())));
        assert_eq!(split("/"), None);
    }

    #[test]
    fn names_are_single_segments() {
        assert!(validate_name("file").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("..").is_err());
    }
}
