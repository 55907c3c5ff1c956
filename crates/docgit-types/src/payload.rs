use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TypeError;

/// Blob content.
///
/// Structured payloads are JSON objects. `serde_json::Map` keeps its keys
/// sorted, so the compact and pretty renderings of a structured payload are
/// deterministic and two payloads with equal fields hash identically no
/// matter the order they were built in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Payload {
    Text(String),
    Structured(Map<String, Value>),
}

impl Payload {
    /// Build a structured payload from a JSON value, which must be an object.
    pub fn structured(value: Value) -> Result<Self, TypeError> {
        match value {
            Value::Object(map) => Ok(Self::Structured(map)),
            other => Err(TypeError::InvalidPayload(format!(
                "structured payload must be a JSON object, got {other}"
            ))),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }

    pub fn as_structured(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Text(_) => None,
            Self::Structured(map) => Some(map),
        }
    }

    /// Bytes fed to the content hasher. The leading tag keeps a text
    /// payload from colliding with a structured payload that serializes to
    /// the same characters.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        match self {
            Self::Text(text) => {
                let mut out = Vec::with_capacity(text.len() + 2);
                out.extend_from_slice(b"t:");
                out.extend_from_slice(text.as_bytes());
                out
            }
            Self::Structured(map) => {
                let compact = Value::Object(map.clone()).to_string();
                let mut out = Vec::with_capacity(compact.len() + 2);
                out.extend_from_slice(b"s:");
                out.extend_from_slice(compact.as_bytes());
                out
            }
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self::Structured(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_requires_object() {
        assert!(Payload::structured(json!({"a": 1})).is_ok());
        assert!(matches!(
            Payload::structured(json!([1, 2])),
            Err(TypeError::InvalidPayload(_))
        ));
    }

    #[test]
    fn canonical_bytes_ignore_insertion_order() {
        let a = Payload::structured(json!({"x": 1, "y": {"b": 2, "a": 3}})).unwrap();
        let mut map = Map::new();
        map.insert("y".into(), json!({"a": 3, "b": 2}));
        map.insert("x".into(), json!(1));
        let b = Payload::Structured(map);
        assert_eq!(a.canonical_bytes(), b.canonical_bytes());
    }

    #[test]
    fn text_and_structured_do_not_collide() {
        let text = Payload::from("{}");
        let structured = Payload::structured(json!({})).unwrap();
        assert_ne!(text.canonical_bytes(), structured.canonical_bytes());
    }

    #[test]
    fn serde_is_tagged() {
        let json = serde_json::to_value(Payload::from("hi")).unwrap();
        assert_eq!(json, json!({"type": "text", "value": "hi"}));
        let back: Payload = serde_json::from_value(json).unwrap();
        assert_eq!(back.as_text(), Some("hi"));
    }
}
