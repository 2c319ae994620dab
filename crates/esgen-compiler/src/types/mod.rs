//! Typed property model.
//!
//! Turns the JSON-Schema-like definitions attached to graph vertices into a
//! tree of typed property descriptors. The tree is built once per schema and is
//! immutable afterwards; the only interior state is the per-reference cache of
//! the resolved target type.

mod schema;
pub mod shorthand;

use std::sync::OnceLock;
use indexmap::IndexMap;
use serde_json::Value;

use crate::diagnostic::CodegenError;

pub use schema::parse_type;

/// Flags shared by every type node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeMeta {
    /// Property name when the type describes an object property.
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub required: bool,
    pub nullable: bool,
}

/// String constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringType {
    pub format: Option<String>,
    pub pattern: Option<String>,
    pub enumeration: Vec<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
}

/// Integer/number constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberType {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

/// Object type with ordered properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectType {
    pub properties: IndexMap<String, Type>,
    pub required: Vec<String>,
    pub additional_properties: bool,
}

/// Array type.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub items: Option<Box<Type>>,
}

/// Reference to a named definition, resolved on demand.
#[derive(Debug)]
pub struct ReferenceType {
    /// The definition name (last segment of the `$ref` pointer).
    pub target: String,
    /// The raw `$ref` value as written in the schema.
    pub pointer: String,
    resolved: OnceLock<Box<Type>>,
}

impl ReferenceType {
    pub fn new(pointer: impl Into<String>) -> Self {
        let pointer = pointer.into();
        let target = pointer
            .rsplit(['/', '#'])
            .find(|segment| !segment.is_empty())
            .unwrap_or_default()
            .to_string();
        Self {
            target,
            pointer,
            resolved: OnceLock::new(),
        }
    }

    /// Returns the cached resolution, if the reference was resolved before.
    pub fn cached(&self) -> Option<&Type> {
        self.resolved.get().map(|t| t.as_ref())
    }
}

impl Clone for ReferenceType {
    fn clone(&self) -> Self {
        let resolved = OnceLock::new();
        if let Some(t) = self.resolved.get() {
            let _ = resolved.set(t.clone());
        }
        Self {
            target: self.target.clone(),
            pointer: self.pointer.clone(),
            resolved,
        }
    }
}

impl PartialEq for ReferenceType {
    fn eq(&self, other: &Self) -> bool {
        self.pointer == other.pointer
    }
}

/// The kinds of type a schema node can describe.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    String(StringType),
    Integer(NumberType),
    Number(NumberType),
    Boolean,
    Null,
    Object(ObjectType),
    Array(ArrayType),
    Reference(ReferenceType),
    /// A schema without a usable `type` (e.g. `{}`), accepted as "any".
    Mixed,
}

/// One typed property descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub meta: TypeMeta,
    pub kind: TypeKind,
}

impl Type {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            meta: TypeMeta::default(),
            kind,
        }
    }

    /// Short, human readable name of the kind for error messages.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            TypeKind::String(_) => "StringType",
            TypeKind::Integer(_) => "IntegerType",
            TypeKind::Number(_) => "NumberType",
            TypeKind::Boolean => "BooleanType",
            TypeKind::Null => "NullType",
            TypeKind::Object(_) => "ObjectType",
            TypeKind::Array(_) => "ArrayType",
            TypeKind::Reference(_) => "ReferenceType",
            TypeKind::Mixed => "MixedType",
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::String(_) | TypeKind::Integer(_) | TypeKind::Number(_) | TypeKind::Boolean
        )
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match &self.kind {
            TypeKind::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

/// Named schema definitions shared across a graph (one per document schema).
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    schemas: IndexMap<String, Value>,
    types: IndexMap<String, Type>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition. Later registrations with the same name are ignored.
    pub fn insert(&mut self, name: impl Into<String>, schema: Value) -> Result<(), CodegenError> {
        let name = name.into();
        if self.types.contains_key(&name) {
            return Ok(());
        }
        let ty = parse_type(&schema)?;
        self.schemas.insert(name.clone(), schema);
        self.types.insert(name, ty);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    pub fn schema(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|k| k.as_str())
    }
}

/// The typed property tree of one metadata schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSet {
    pub root: Type,
    /// Definitions local to the schema (`definitions` / `$defs`).
    pub local: IndexMap<String, Type>,
}

impl TypeSet {
    /// Builds the type tree of a JSON schema value.
    pub fn from_schema(schema: &Value) -> Result<Self, CodegenError> {
        let root = parse_type(schema)?;
        let mut local = IndexMap::new();
        for key in ["definitions", "$defs"] {
            if let Some(Value::Object(defs)) = schema.get(key) {
                for (name, def) in defs {
                    local.insert(name.clone(), parse_type(def)?);
                }
            }
        }
        Ok(Self { root, local })
    }

    /// Resolves a type, following references until a concrete type is reached.
    ///
    /// Local definitions take precedence over the graph-wide registry. The
    /// resolved type of a reference is cached on the reference node, and the
    /// reference's own required/nullable flags and name are carried over.
    pub fn resolve<'a>(&'a self, ty: &'a Type, global: &Definitions) -> Result<&'a Type, CodegenError> {
        let mut current = ty;
        for _ in 0..32 {
            let TypeKind::Reference(reference) = &current.kind else {
                return Ok(current);
            };
            if reference.cached().is_none() {
                let target = self
                    .local
                    .get(&reference.target)
                    .or_else(|| global.get(&reference.target))
                    .ok_or_else(|| CodegenError::UnknownReference {
                        reference: reference.pointer.clone(),
                    })?;
                let mut resolved = target.clone();
                resolved.meta.required = current.meta.required;
                resolved.meta.nullable = resolved.meta.nullable || current.meta.nullable;
                if current.meta.name.is_some() {
                    resolved.meta.name = current.meta.name.clone();
                }
                if resolved.meta.title.is_none() {
                    resolved.meta.title = Some(reference.target.clone());
                }
                let _ = reference.resolved.set(Box::new(resolved));
            }
            current = match reference.cached() {
                Some(t) => t,
                None => {
                    return Err(CodegenError::UnknownReference {
                        reference: reference.pointer.clone(),
                    })
                }
            };
        }
        Err(CodegenError::InvalidSchema {
            message: "reference chain too deep".to_string(),
        })
    }

    /// Returns the root object type or a shape error description.
    pub fn root_object(&self) -> Result<&ObjectType, String> {
        self.root
            .as_object()
            .ok_or_else(|| self.root.kind_name().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reference_target_is_last_segment() {
        assert_eq!(ReferenceType::new("#/definitions/Address").target, "Address");
        assert_eq!(ReferenceType::new("/definitions/Building/").target, "Building");
        assert_eq!(ReferenceType::new("Address").target, "Address");
    }

    #[test]
    fn resolves_local_reference_and_propagates_required() {
        let schema = json!({
            "type": "object",
            "properties": {
                "address": { "$ref": "#/definitions/Address" }
            },
            "required": ["address"],
            "definitions": {
                "Address": {
                    "type": "object",
                    "properties": { "street": { "type": "string" } }
                }
            }
        });
        let set = TypeSet::from_schema(&schema).unwrap();
        let root = set.root_object().unwrap();
        let address = &root.properties["address"];
        assert!(address.meta.required);

        let resolved = set.resolve(address, &Definitions::new()).unwrap();
        assert!(resolved.meta.required);
        assert_eq!(resolved.meta.name.as_deref(), Some("address"));
        assert!(resolved.as_object().is_some());

        // cached on the reference node
        match &address.kind {
            TypeKind::Reference(r) => assert!(r.cached().is_some()),
            other => panic!("expected reference, got {:?}", other),
        }
    }

    #[test]
    fn resolves_against_global_definitions() {
        let mut defs = Definitions::new();
        defs.insert("BuildingId", json!({ "type": "string", "format": "uuid" })).unwrap();

        let set = TypeSet::from_schema(&json!({ "$ref": "#/definitions/BuildingId" })).unwrap();
        let resolved = set.resolve(&set.root, &defs).unwrap();
        match &resolved.kind {
            TypeKind::String(s) => assert_eq!(s.format.as_deref(), Some("uuid")),
            other => panic!("expected string, got {:?}", other),
        }
    }

    #[test]
    fn unknown_reference_is_an_error() {
        let set = TypeSet::from_schema(&json!({ "$ref": "#/definitions/Nope" })).unwrap();
        let err = set.resolve(&set.root, &Definitions::new()).unwrap_err();
        assert_eq!(
            err,
            CodegenError::UnknownReference {
                reference: "#/definitions/Nope".to_string()
            }
        );
    }

    #[test]
    fn root_object_reports_actual_kind() {
        let set = TypeSet::from_schema(&json!({ "type": "string" })).unwrap();
        assert_eq!(set.root_object().unwrap_err(), "StringType");
    }
}
