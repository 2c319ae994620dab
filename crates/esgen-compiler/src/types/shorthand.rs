//! Shorthand schema syntax.
//!
//! Models may describe payloads with a compact notation instead of full JSON
//! Schema:
//!
//! ```text
//! {
//!   "$title": "Building",
//!   "buildingId": "string|format:uuid",
//!   "name": "string|minLength:1",
//!   "tags?": "string[]",
//!   "address": "Address",
//!   "floors": "integer|null"
//! }
//! ```
//!
//! Keys ending with `?` are optional, every other key is required. A value names
//! a type followed by `|`-separated `key:value` options. Non-primitive type names
//! become `$ref` references to a definition of that name.

use serde_json::{json, Map, Value};

use crate::diagnostic::CodegenError;

const PRIMITIVES: &[&str] = &["string", "integer", "number", "boolean", "null", "object", "array"];

/// Converts a shorthand schema into a JSON schema.
pub fn to_json_schema(shorthand: &Value) -> Result<Value, CodegenError> {
    match shorthand {
        Value::Object(map) => object_schema(map),
        Value::String(spec) => type_spec(spec),
        other => Err(CodegenError::InvalidSchema {
            message: format!("unsupported shorthand value {}", other),
        }),
    }
}

fn object_schema(map: &Map<String, Value>) -> Result<Value, CodegenError> {
    let mut properties = Map::new();
    let mut required = Vec::new();
    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));

    for (key, value) in map {
        if key == "$title" {
            schema.insert("title".to_string(), value.clone());
            continue;
        }
        let (name, optional) = match key.strip_suffix('?') {
            Some(name) => (name, true),
            None => (key.as_str(), false),
        };
        if !optional {
            required.push(Value::String(name.to_string()));
        }
        properties.insert(name.to_string(), to_json_schema(value)?);
    }

    schema.insert("properties".to_string(), Value::Object(properties));
    schema.insert("required".to_string(), Value::Array(required));
    schema.insert("additionalProperties".to_string(), Value::Bool(false));
    Ok(Value::Object(schema))
}

fn type_spec(spec: &str) -> Result<Value, CodegenError> {
    let mut parts = spec.split('|').map(str::trim);
    let type_part = parts.next().unwrap_or_default();
    if type_part.is_empty() {
        return Err(CodegenError::InvalidSchema {
            message: format!("empty shorthand type in '{}'", spec),
        });
    }

    let mut schema = match type_part.strip_suffix("[]") {
        Some(item) => {
            let mut array = Map::new();
            array.insert("type".to_string(), json!("array"));
            array.insert("items".to_string(), type_spec(item)?);
            array
        }
        None => single_type(type_part),
    };

    for option in parts {
        if option == "null" {
            let current = schema.remove("type").unwrap_or(Value::Null);
            match current {
                Value::String(t) => {
                    schema.insert("type".to_string(), json!([t, "null"]));
                }
                _ => {
                    // a nullable reference keeps the $ref and allows null through oneOf
                    let inner = Value::Object(std::mem::take(&mut schema));
                    schema.insert("oneOf".to_string(), json!([inner, { "type": "null" }]));
                }
            }
            continue;
        }
        let Some((key, raw)) = option.split_once(':') else {
            return Err(CodegenError::InvalidSchema {
                message: format!("invalid shorthand option '{}' in '{}'", option, spec),
            });
        };
        let value = if key == "enum" {
            Value::Array(raw.split(',').map(|v| Value::String(v.trim().to_string())).collect())
        } else {
            option_value(raw)
        };
        schema.insert(key.trim().to_string(), value);
    }

    Ok(Value::Object(schema))
}

fn single_type(name: &str) -> Map<String, Value> {
    let mut schema = Map::new();
    if PRIMITIVES.contains(&name) {
        schema.insert("type".to_string(), Value::String(name.to_string()));
    } else {
        schema.insert("$ref".to_string(), Value::String(format!("#/definitions/{}", name)));
    }
    schema
}

fn option_value(raw: &str) -> Value {
    let raw = raw.trim();
    if let Ok(int) = raw.parse::<i64>() {
        return json!(int);
    }
    if let Ok(float) = raw.parse::<f64>() {
        return json!(float);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn converts_flat_object() {
        let schema = to_json_schema(&json!({
            "$title": "Building",
            "buildingId": "string|format:uuid",
            "name": "string|minLength:1",
            "tags?": "string[]"
        }))
        .unwrap();

        assert_eq!(
            schema,
            json!({
                "type": "object",
                "title": "Building",
                "properties": {
                    "buildingId": { "type": "string", "format": "uuid" },
                    "name": { "type": "string", "minLength": 1 },
                    "tags": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["buildingId", "name"],
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn converts_references_and_nullables() {
        let schema = to_json_schema(&json!({
            "address": "Address",
            "floors": "integer|null",
            "kind": "string|enum:office, residential"
        }))
        .unwrap();

        let props = &schema["properties"];
        assert_eq!(props["address"], json!({ "$ref": "#/definitions/Address" }));
        assert_eq!(props["floors"], json!({ "type": ["integer", "null"] }));
        assert_eq!(props["kind"]["enum"], json!(["office", "residential"]));
    }

    #[test]
    fn converts_nested_objects() {
        let schema = to_json_schema(&json!({ "owner": { "name": "string" } })).unwrap();
        assert_eq!(schema["properties"]["owner"]["type"], json!("object"));
        assert_eq!(schema["properties"]["owner"]["required"], json!(["name"]));
    }

    #[test]
    fn rejects_malformed_options() {
        assert!(to_json_schema(&json!({ "name": "string|format" })).is_err());
        assert!(to_json_schema(&json!({ "name": 42 })).is_err());
        assert!(to_json_schema(&json!({ "name": "" })).is_err());
    }
}
