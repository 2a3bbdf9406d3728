use std::fmt;

use serde::de::IgnoredAny;
use serde::Deserialize;

use super::wire;

/// A reference to an attribute as it arrives from a rule store.
///
/// Stores hand out either the bare attribute id or the attribute object
/// itself (populated references). Both shapes resolve to the same id during
/// compilation; nothing after compilation looks at the original shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawRef")]
pub enum AttributeRef {
    /// A bare attribute id.
    Id(String),
    /// An embedded attribute object carrying `_id` or `id`. When both are
    /// present `_id` wins.
    Embedded { id: Option<String> },
    /// Any other JSON shape. Never resolves.
    Unrecognized(IgnoredAny),
}

/// Wire shapes of a reference. Store objects often carry `_id` and `id`
/// together, so they are separate fields here.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRef {
    Id(String),
    Object {
        #[serde(rename = "_id", default, deserialize_with = "wire::optional")]
        underscore_id: Option<String>,
        #[serde(default, deserialize_with = "wire::optional")]
        id: Option<String>,
    },
    Other(IgnoredAny),
}

impl From<RawRef> for AttributeRef {
    fn from(raw: RawRef) -> Self {
        match raw {
            RawRef::Id(id) => AttributeRef::Id(id),
            RawRef::Object { underscore_id, id } => AttributeRef::Embedded {
                id: wire::object_id(underscore_id, id),
            },
            RawRef::Other(ignored) => AttributeRef::Unrecognized(ignored),
        }
    }
}

impl AttributeRef {
    /// The canonical attribute id, or `None` if this reference cannot name one.
    /// Empty ids are unresolvable.
    #[must_use]
    pub fn resolve(&self) -> Option<&str> {
        let id = match self {
            AttributeRef::Id(id) => id.as_str(),
            AttributeRef::Embedded { id: Some(id) } => id.as_str(),
            AttributeRef::Embedded { id: None } | AttributeRef::Unrecognized(_) => return None,
        };
        (!id.is_empty()).then_some(id)
    }
}

impl PartialEq for AttributeRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttributeRef::Id(a), AttributeRef::Id(b)) => a == b,
            (AttributeRef::Embedded { id: a }, AttributeRef::Embedded { id: b }) => a == b,
            (AttributeRef::Unrecognized(_), AttributeRef::Unrecognized(_)) => true,
            _ => false,
        }
    }
}

impl From<&str> for AttributeRef {
    fn from(id: &str) -> Self {
        AttributeRef::Id(id.to_owned())
    }
}

impl From<String> for AttributeRef {
    fn from(id: String) -> Self {
        AttributeRef::Id(id)
    }
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeRef::Id(id) => write!(f, "{id}"),
            AttributeRef::Embedded { id: Some(id) } => write!(f, "{{_id: {id}}}"),
            AttributeRef::Embedded { id: None } => write!(f, "{{}}"),
            AttributeRef::Unrecognized(_) => write!(f, "<unrecognized>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_id_resolves() {
        let r = AttributeRef::from("size");
        assert_eq!(r.resolve(), Some("size"));
    }

    #[test]
    fn empty_id_is_unresolvable() {
        assert_eq!(AttributeRef::from("").resolve(), None);
        assert_eq!(AttributeRef::Embedded { id: Some(String::new()) }.resolve(), None);
    }

    #[test]
    fn deserialize_both_shapes() {
        let refs: Vec<AttributeRef> = serde_json::from_str(
            r#"["size", {"_id": "color", "name": "Color"}, {"id": "finish"}, {"name": "orphan"}, 7]"#,
        )
        .unwrap();
        let resolved: Vec<Option<&str>> = refs.iter().map(AttributeRef::resolve).collect();
        assert_eq!(
            resolved,
            vec![Some("size"), Some("color"), Some("finish"), None, None]
        );
    }

    #[test]
    fn populated_object_with_both_ids_resolves() {
        let r: AttributeRef =
            serde_json::from_str(r#"{"_id": "color", "id": "color", "name": "Color"}"#).unwrap();
        assert_eq!(r.resolve(), Some("color"));

        let r: AttributeRef = serde_json::from_str(r#"{"_id": "a1", "id": "color"}"#).unwrap();
        assert_eq!(r.resolve(), Some("a1"));

        // a non-string `_id` falls back to `id`
        let r: AttributeRef = serde_json::from_str(r#"{"_id": {"$oid": "x"}, "id": "size"}"#).unwrap();
        assert_eq!(r.resolve(), Some("size"));
    }

    #[test]
    fn display_shapes() {
        assert_eq!(AttributeRef::from("size").to_string(), "size");
        assert_eq!(
            AttributeRef::Embedded { id: Some("size".into()) }.to_string(),
            "{_id: size}"
        );
    }
}
