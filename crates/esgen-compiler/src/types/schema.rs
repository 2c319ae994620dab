//! JSON schema → type tree conversion.

use indexmap::IndexMap;
use serde_json::Value;

use super::{ArrayType, NumberType, ObjectType, ReferenceType, StringType, Type, TypeKind, TypeMeta};
use crate::diagnostic::CodegenError;

/// Parses one schema node into a [`Type`].
pub fn parse_type(schema: &Value) -> Result<Type, CodegenError> {
    let Value::Object(map) = schema else {
        return Err(CodegenError::InvalidSchema {
            message: format!("expected a schema object, got {}", schema),
        });
    };

    let mut meta = TypeMeta {
        title: map.get("title").and_then(Value::as_str).map(str::to_string),
        description: map.get("description").and_then(Value::as_str).map(str::to_string),
        ..TypeMeta::default()
    };

    // `oneOf: [X, {type: null}]` is a nullable X
    if let Some(variants) = map.get("oneOf").or_else(|| map.get("anyOf")).and_then(Value::as_array) {
        let is_null = |v: &Value| v.get("type").and_then(Value::as_str) == Some("null");
        let non_null: Vec<&Value> = variants.iter().filter(|v| !is_null(v)).collect();
        if non_null.len() == 1 {
            let mut inner = parse_type(non_null[0])?;
            inner.meta.nullable = inner.meta.nullable || non_null.len() < variants.len();
            inner.meta.title = meta.title.or(inner.meta.title);
            inner.meta.description = meta.description.or(inner.meta.description);
            return Ok(inner);
        }
    }

    if let Some(pointer) = map.get("$ref").and_then(Value::as_str) {
        return Ok(Type {
            meta,
            kind: TypeKind::Reference(ReferenceType::new(pointer)),
        });
    }

    let type_name = match map.get("type") {
        Some(Value::String(name)) => Some(name.clone()),
        Some(Value::Array(names)) => {
            let mut chosen = None;
            for name in names.iter().filter_map(Value::as_str) {
                if name == "null" {
                    meta.nullable = true;
                } else if chosen.is_none() {
                    chosen = Some(name.to_string());
                }
            }
            chosen.or_else(|| meta.nullable.then(|| "null".to_string()))
        }
        Some(other) => {
            return Err(CodegenError::InvalidSchema {
                message: format!("invalid type declaration {}", other),
            })
        }
        None if map.contains_key("properties") => Some("object".to_string()),
        None if map.contains_key("items") => Some("array".to_string()),
        None if map.contains_key("enum") => Some("string".to_string()),
        None => None,
    };

    let kind = match type_name.as_deref() {
        Some("string") => TypeKind::String(StringType {
            format: str_field(map, "format"),
            pattern: str_field(map, "pattern"),
            enumeration: map
                .get("enum")
                .and_then(Value::as_array)
                .map(|values| {
                    values
                        .iter()
                        .filter_map(|v| match v {
                            Value::Null => None,
                            Value::String(s) => Some(s.clone()),
                            other => Some(other.to_string()),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            min_length: map.get("minLength").and_then(Value::as_u64),
            max_length: map.get("maxLength").and_then(Value::as_u64),
        }),
        Some("integer") => TypeKind::Integer(number_type(map)),
        Some("number") => TypeKind::Number(number_type(map)),
        Some("boolean") => TypeKind::Boolean,
        Some("null") => TypeKind::Null,
        Some("object") => TypeKind::Object(object_type(map)?),
        Some("array") => TypeKind::Array(ArrayType {
            items: match map.get("items") {
                Some(items @ Value::Object(_)) => Some(Box::new(parse_type(items)?)),
                _ => None,
            },
        }),
        Some(other) => {
            return Err(CodegenError::InvalidSchema {
                message: format!("unsupported type '{}'", other),
            })
        }
        None => TypeKind::Mixed,
    };

    Ok(Type { meta, kind })
}

fn str_field(map: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn number_type(map: &serde_json::Map<String, Value>) -> NumberType {
    NumberType {
        minimum: map.get("minimum").and_then(Value::as_f64),
        maximum: map.get("maximum").and_then(Value::as_f64),
    }
}

fn object_type(map: &serde_json::Map<String, Value>) -> Result<ObjectType, CodegenError> {
    let required: Vec<String> = map
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();

    let mut properties = IndexMap::new();
    if let Some(Value::Object(props)) = map.get("properties") {
        for (name, prop_schema) in props {
            let mut prop = parse_type(prop_schema)?;
            prop.meta.name = Some(name.clone());
            prop.meta.required = required.iter().any(|r| r == name);
            properties.insert(name.clone(), prop);
        }
    }

    let additional_properties = !matches!(map.get("additionalProperties"), Some(Value::Bool(false)));

    Ok(ObjectType {
        properties,
        required,
        additional_properties,
    })
}
