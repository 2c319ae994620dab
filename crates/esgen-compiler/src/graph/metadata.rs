//! Vertex metadata and the capabilities it attaches to a vertex.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::vertex::{Vertex, VertexKind};
use crate::diagnostic::CodegenError;
use crate::types::{shorthand, TypeSet};

/// Keys with a dedicated meaning; everything else is custom data.
const KNOWN_KEYS: &[&str] = &[
    "schema",
    "shorthand",
    "ns",
    "newAggregate",
    "identifier",
    "aggregateState",
    "query",
    "queryName",
];

/// Parsed metadata of one vertex.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// JSON schema of the payload/state (shorthand already expanded).
    pub schema: Option<Value>,
    pub type_set: Option<TypeSet>,
    pub shorthand: bool,
    /// Custom namespace override (documents).
    pub ns: Option<String>,
    /// Handling the command creates a new aggregate instance.
    pub new_aggregate: bool,
    /// Identity property of an aggregate.
    pub identifier: Option<String>,
    /// The document describes the state of an aggregate.
    pub aggregate_state: bool,
    /// Request schema when the document is queryable.
    pub query: Option<Value>,
    pub query_type_set: Option<TypeSet>,
    pub query_name: Option<String>,
    pub custom_data: IndexMap<String, Value>,
}

impl Metadata {
    /// Parses a metadata blob. The blob may be an object or a JSON-encoded string.
    pub fn parse(raw: &Value, kind: VertexKind, name: &str, id: &str) -> Result<Self, CodegenError> {
        let err = |message: String| CodegenError::MetadataParse {
            kind,
            name: name.to_string(),
            id: id.to_string(),
            message,
        };

        let owned;
        let map: &Map<String, Value> = match raw {
            Value::Object(map) => map,
            Value::String(text) if text.trim().is_empty() => return Ok(Self::default()),
            Value::String(text) => {
                owned = serde_json::from_str::<Value>(text).map_err(|e| err(e.to_string()))?;
                match &owned {
                    Value::Object(map) => map,
                    other => return Err(err(format!("expected an object, got {}", other))),
                }
            }
            Value::Null => return Ok(Self::default()),
            other => return Err(err(format!("expected an object, got {}", other))),
        };

        let shorthand = map.get("shorthand").and_then(Value::as_bool).unwrap_or(false);
        let expand = |schema: &Value| -> Result<Value, CodegenError> {
            if shorthand {
                shorthand::to_json_schema(schema).map_err(|e| err(e.to_string()))
            } else {
                Ok(schema.clone())
            }
        };

        let schema = match map.get("schema") {
            None | Some(Value::Null) => None,
            Some(schema) => Some(expand(schema)?),
        };
        let query = match map.get("query") {
            None | Some(Value::Null) => None,
            Some(query) => Some(expand(query)?),
        };

        let type_set = schema
            .as_ref()
            .map(TypeSet::from_schema)
            .transpose()
            .map_err(|e| err(e.to_string()))?;
        let query_type_set = query
            .as_ref()
            .map(TypeSet::from_schema)
            .transpose()
            .map_err(|e| err(e.to_string()))?;

        let custom_data = map
            .iter()
            .filter(|(k, _)| !KNOWN_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            schema,
            type_set,
            shorthand,
            ns: non_empty_str(map, "ns"),
            new_aggregate: map.get("newAggregate").and_then(Value::as_bool).unwrap_or(false),
            identifier: non_empty_str(map, "identifier"),
            aggregate_state: map.get("aggregateState").and_then(Value::as_bool).unwrap_or(false),
            query,
            query_type_set,
            query_name: non_empty_str(map, "queryName"),
            custom_data,
        })
    }
}

fn non_empty_str(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Capabilities
// =============================================================================

/// Elements that may carry a payload/state schema.
pub trait HasSchema {
    fn schema(&self) -> Option<&Value>;
}

/// Elements that may carry a typed property tree.
pub trait HasTypeSet {
    fn type_set(&self) -> Option<&TypeSet>;
}

/// Documents that can be queried.
pub trait HasQuery {
    fn query_schema(&self) -> Option<&Value>;
    fn query_type_set(&self) -> Option<&TypeSet>;

    fn has_query(&self) -> bool {
        self.query_schema().is_some()
    }
}

/// Free-form key/value data attached to an element.
pub trait HasCustomData {
    fn custom_data(&self) -> Option<&IndexMap<String, Value>>;

    fn custom(&self, key: &str) -> Option<&Value> {
        self.custom_data().and_then(|data| data.get(key))
    }
}

impl HasSchema for Vertex {
    fn schema(&self) -> Option<&Value> {
        self.metadata.as_ref().and_then(|m| m.schema.as_ref())
    }
}

impl HasTypeSet for Vertex {
    fn type_set(&self) -> Option<&TypeSet> {
        self.metadata.as_ref().and_then(|m| m.type_set.as_ref())
    }
}

impl HasQuery for Vertex {
    fn query_schema(&self) -> Option<&Value> {
        if !self.is(VertexKind::Document) {
            return None;
        }
        self.metadata.as_ref().and_then(|m| m.query.as_ref())
    }

    fn query_type_set(&self) -> Option<&TypeSet> {
        if !self.is(VertexKind::Document) {
            return None;
        }
        self.metadata.as_ref().and_then(|m| m.query_type_set.as_ref())
    }
}

impl HasCustomData for Vertex {
    fn custom_data(&self) -> Option<&IndexMap<String, Value>> {
        self.metadata.as_ref().map(|m| &m.custom_data)
    }
}

impl Vertex {
    /// Whether handling this command creates a new aggregate. Absent metadata means no.
    pub fn is_new_aggregate(&self) -> bool {
        self.is(VertexKind::Command) && self.metadata.as_ref().is_some_and(|m| m.new_aggregate)
    }

    pub fn is_aggregate_state(&self) -> bool {
        self.is(VertexKind::Document) && self.metadata.as_ref().is_some_and(|m| m.aggregate_state)
    }

    pub fn namespace_override(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.ns.as_deref())
    }

    pub fn identifier(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.identifier.as_deref())
    }

    pub fn query_name(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.query_name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: Value, kind: VertexKind) -> Result<Metadata, CodegenError> {
        Metadata::parse(&raw, kind, "Add Building", "c1")
    }

    #[test]
    fn parses_object_metadata() {
        let meta = parse(
            json!({
                "newAggregate": true,
                "schema": { "type": "object", "properties": { "buildingId": { "type": "string" } } },
                "service": "buildings"
            }),
            VertexKind::Command,
        )
        .unwrap();

        assert!(meta.new_aggregate);
        assert!(meta.type_set.is_some());
        assert_eq!(meta.custom_data.get("service"), Some(&json!("buildings")));
        assert!(!meta.custom_data.contains_key("schema"));
    }

    #[test]
    fn parses_string_encoded_metadata_with_shorthand() {
        let meta = parse(
            json!(r#"{"shorthand": true, "schema": {"buildingId": "string|format:uuid"}}"#),
            VertexKind::Event,
        )
        .unwrap();
        let schema = meta.schema.unwrap();
        assert_eq!(schema["properties"]["buildingId"]["format"], json!("uuid"));
        assert_eq!(schema["required"], json!(["buildingId"]));
    }

    #[test]
    fn wraps_parse_failures_with_vertex_context() {
        let err = parse(json!("{not json"), VertexKind::Command).unwrap_err();
        match err {
            CodegenError::MetadataParse { kind, name, id, .. } => {
                assert_eq!(kind, VertexKind::Command);
                assert_eq!(name, "Add Building");
                assert_eq!(id, "c1");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn empty_metadata_is_default() {
        let meta = parse(json!(""), VertexKind::Command).unwrap();
        assert!(!meta.new_aggregate);
        assert!(meta.schema.is_none());
    }

    #[test]
    fn capabilities_read_through_vertex() {
        let meta = parse(
            json!({ "query": { "type": "object" }, "aggregateState": true, "ns": "  " }),
            VertexKind::Document,
        )
        .unwrap();
        let doc = Vertex::new("d1", "Building", VertexKind::Document).with_metadata(meta.clone());
        assert!(doc.has_query());
        assert!(doc.is_aggregate_state());
        assert_eq!(doc.namespace_override(), None);

        let event = Vertex::new("e1", "Building Added", VertexKind::Event).with_metadata(meta);
        assert!(!event.has_query());
        assert!(!event.is_aggregate_state());
    }
}
