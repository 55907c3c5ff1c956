//! Canonical line renderings.

use serde_json::Value;

use docgit_types::Payload;

/// Render a payload as lines.
///
/// Text splits on `\n`. A trailing line break yields a final empty line,
/// so `"v1"` and `"v1\n"` render differently. Structured payloads print as
/// pretty JSON with two-space indentation; keys come out sorted, so equal
/// payloads always render identically.
pub fn render_payload(payload: &Payload) -> Vec<String> {
    match payload {
        Payload::Text(text) if text.is_empty() => Vec::new(),
        Payload::Text(text) => text.split('\n').map(str::to_owned).collect(),
        Payload::Structured(map) => {
            let pretty = format!("{:#}", Value::Object(map.clone()));
            pretty.lines().map(str::to_owned).collect()
        }
    }
}

/// Render a set of paths as one sorted line each.
pub fn render_listing<I, S>(paths: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut lines: Vec<String> = paths.into_iter().map(Into::into).collect();
    lines.sort();
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_renders_per_line() {
        assert_eq!(render_payload(&Payload::from("a\nb")), vec!["a", "b"]);
        assert!(render_payload(&Payload::from("")).is_empty());
    }

    #[test]
    fn trailing_newline_is_visible() {
        assert_eq!(render_payload(&Payload::from("a\nb\n")), vec!["a", "b", ""]);
        let diff = crate::diff_lines(
            &render_payload(&Payload::from("v1")),
            &render_payload(&Payload::from("v1\n")),
        );
        assert!(diff.has_changes());
        assert_eq!(diff.additions(), 1);
    }

    #[test]
    fn structured_renders_sorted_pretty_json() {
        let payload = Payload::structured(json!({"K40": 3, "Ar40": 10})).unwrap();
        assert_eq!(
            render_payload(&payload),
            vec!["{", "  \"Ar40\": 10,", "  \"K40\": 3", "}"]
        );
    }

    #[test]
    fn listing_is_sorted() {
        assert_eq!(render_listing(["/b", "/a/x"]), vec!["/a/x", "/b"]);
    }
}
