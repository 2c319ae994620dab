//! Typed properties → PHP property declarations.

use super::{framework, GenContext};
use crate::diagnostic::CodegenError;
use crate::graph::{Vertex, VertexKind};
use crate::merge::ChangeSet;
use crate::naming::case::to_pascal_case;
use crate::naming::ClassLocation;
use crate::php::{ConstDecl, Expr, MethodDecl, PropertyDecl, Stmt, UseImport};
use crate::types::{ObjectType, Type, TypeKind, TypeSet};

/// How object-typed properties without a class of their own are declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Nesting {
    /// Inline objects and local definitions get a class of their own.
    Classes,
    /// Inline objects and local definitions are plain arrays.
    Arrays,
}

/// A class that has to be generated for a nested object.
#[derive(Debug, Clone)]
pub(crate) struct NestedClass<'t> {
    pub class_name: String,
    pub ty: &'t Type,
}

/// One schema property planned as constant + field + getter.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PropertyPlan {
    /// Key in the record data.
    pub key: String,
    pub property: String,
    pub constant: String,
    /// Type hint including the `?` of nullable types.
    pub hint: Option<String>,
    pub import: Option<String>,
}

/// Class generated for a graph document referenced by name.
///
/// Aggregate state documents are represented by the state class of their
/// aggregate; every other document by its value object.
pub(crate) fn document_class(ctx: &GenContext, class_name: &str) -> Result<Option<ClassLocation>, CodegenError> {
    let resolver = &ctx.resolver;
    let Some(document) = ctx
        .graph()
        .vertex_map()
        .values()
        .filter(|v| v.is(VertexKind::Document))
        .find(|v| resolver.class_name(v) == class_name)
    else {
        return Ok(None);
    };
    if document.is_aggregate_state() {
        if let Some(aggregate) = ctx.graph().aggregate_for(&document.id) {
            return resolver.state_class(aggregate).map(Some);
        }
    }
    resolver.locate(document).map(Some)
}

fn scalar_hint(ty: &Type) -> Option<&'static str> {
    match ty.kind {
        TypeKind::String(_) => Some("string"),
        TypeKind::Integer(_) => Some("int"),
        TypeKind::Number(_) => Some("float"),
        TypeKind::Boolean => Some("bool"),
        TypeKind::Object(_) | TypeKind::Array(_) => Some("array"),
        TypeKind::Null | TypeKind::Mixed | TypeKind::Reference(_) => None,
    }
}

/// Plans the members of a record class for an object type.
///
/// Returns the property plans and the nested classes that have to exist for
/// the planned type hints (only with [`Nesting::Classes`]).
pub(crate) fn plan_properties<'t>(
    ctx: &GenContext,
    vertex: &Vertex,
    type_set: &'t TypeSet,
    object: &'t ObjectType,
    nesting: Nesting,
) -> Result<(Vec<PropertyPlan>, Vec<NestedClass<'t>>), CodegenError> {
    let naming = ctx.naming();
    let definitions = ctx.graph().definitions();
    let mut plans = Vec::with_capacity(object.properties.len());
    let mut nested = Vec::new();

    for (key, ty) in &object.properties {
        let resolved = type_set.resolve(ty, definitions).map_err(|e| match e {
            CodegenError::UnknownReference { reference } => {
                vertex.shape_error("a resolvable reference", format!("'{}'", reference))
            }
            other => other,
        })?;

        let mut import = None;
        let hint: Option<String> = match &ty.kind {
            TypeKind::Reference(reference) if type_set.local.contains_key(&reference.target) => {
                match (nesting, &resolved.kind) {
                    (Nesting::Classes, TypeKind::Object(_)) => {
                        let class_name = to_pascal_case(&reference.target);
                        nested.push(NestedClass {
                            class_name: class_name.clone(),
                            ty: resolved,
                        });
                        Some(class_name)
                    }
                    _ => scalar_hint(resolved).map(str::to_string),
                }
            }
            TypeKind::Reference(reference) => match document_class(ctx, &to_pascal_case(&reference.target))? {
                Some(location) => {
                    import = Some(location.fqcn());
                    Some(location.class_name)
                }
                None => scalar_hint(resolved).map(str::to_string),
            },
            TypeKind::Object(_) if nesting == Nesting::Classes => {
                let class_name = to_pascal_case(key);
                nested.push(NestedClass {
                    class_name: class_name.clone(),
                    ty,
                });
                Some(class_name)
            }
            TypeKind::Array(array) if nesting == Nesting::Classes => {
                if let Some(items) = array.items.as_deref() {
                    match &items.kind {
                        TypeKind::Object(_) => nested.push(NestedClass {
                            class_name: format!("{}Item", to_pascal_case(key)),
                            ty: items,
                        }),
                        TypeKind::Reference(reference) if type_set.local.contains_key(&reference.target) => {
                            let items = type_set.resolve(items, definitions)?;
                            if items.as_object().is_some() {
                                nested.push(NestedClass {
                                    class_name: to_pascal_case(&reference.target),
                                    ty: items,
                                });
                            }
                        }
                        _ => {}
                    }
                }
                Some("array".to_string())
            }
            _ => scalar_hint(resolved).map(str::to_string),
        };

        let required = resolved.meta.required || object.required.iter().any(|r| r == key);
        let nullable = resolved.meta.nullable || !required;
        let hint = hint.map(|h| if nullable { format!("?{}", h) } else { h });

        plans.push(PropertyPlan {
            key: key.clone(),
            property: naming.property_name.apply(key),
            constant: naming.constant_name.apply(key),
            hint,
            import,
        });
    }
    Ok((plans, nested))
}

/// Adds `ImmutableRecord` + `ImmutableRecordLogic` to a class.
pub(crate) fn immutable_record(set: &mut ChangeSet) {
    set.import(UseImport::class(framework::IMMUTABLE_RECORD))
        .import(UseImport::class(framework::IMMUTABLE_RECORD_LOGIC))
        .implements(framework::short(framework::IMMUTABLE_RECORD))
        .use_trait(framework::short(framework::IMMUTABLE_RECORD_LOGIC));
}

/// Adds a constant, a private field and a getter per planned property.
pub(crate) fn record_members(set: &mut ChangeSet, plans: &[PropertyPlan]) {
    for plan in plans {
        if let Some(import) = &plan.import {
            set.import(UseImport::class(import));
        }
        set.constant(ConstDecl::public(&plan.constant, Expr::string(&plan.key)));
        set.property(PropertyDecl::private(plan.hint.clone(), &plan.property));
    }
    for plan in plans {
        let mut getter = MethodDecl::public(&plan.property).stmt(Stmt::ret(Expr::this_prop(&plan.property)));
        getter.return_type = plan.hint.clone();
        set.method(getter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::fixtures;
    use crate::generator::StateFlavor;
    use crate::graph::{HasTypeSet, VertexId};
    use crate::naming::{NameResolver, NamingStrategies};
    use serde_json::json;

    #[test]
    fn plans_state_properties_with_document_references() {
        let (graph, psr4, layout, naming) = (
            fixtures::building_graph(),
            fixtures::psr4(),
            fixtures::layout(),
            NamingStrategies::conventional(),
        );
        let ctx = GenContext::new(NameResolver::new(&layout, &psr4, &naming, &graph), StateFlavor::default());
        let state = graph.vertex(&VertexId::from("d1")).unwrap();
        let type_set = state.type_set().unwrap();
        let object = type_set.root.as_object().unwrap();

        let (plans, nested) = plan_properties(&ctx, state, type_set, object, Nesting::Arrays).unwrap();
        assert!(nested.is_empty());
        assert_eq!(plans[0].hint.as_deref(), Some("string"));
        assert_eq!(plans[0].constant, "BUILDING_ID");
        assert_eq!(plans[2].hint.as_deref(), Some("?Address"));
        assert_eq!(
            plans[2].import.as_deref(),
            Some("App\\Domain\\Model\\ValueObject\\Address")
        );
    }

    #[test]
    fn inline_objects_become_classes_or_arrays() {
        let (graph, psr4, layout, naming) = (
            fixtures::building_graph(),
            fixtures::psr4(),
            fixtures::layout(),
            NamingStrategies::conventional(),
        );
        let ctx = GenContext::new(NameResolver::new(&layout, &psr4, &naming, &graph), StateFlavor::default());
        let vertex = graph.vertex(&VertexId::from("d2")).unwrap();
        let type_set = TypeSet::from_schema(&json!({
            "type": "object",
            "properties": {
                "geo": { "type": "object", "properties": { "lat": { "type": "number" } } },
                "floors": { "type": "array", "items": { "type": "object" } },
                "count": { "type": "integer" }
            },
            "required": ["geo", "floors", "count"]
        }))
        .unwrap();
        let object = type_set.root.as_object().unwrap();

        let (plans, nested) = plan_properties(&ctx, vertex, &type_set, object, Nesting::Classes).unwrap();
        let hints: Vec<_> = plans.iter().map(|p| p.hint.as_deref()).collect();
        assert_eq!(hints, vec![Some("Geo"), Some("array"), Some("int")]);
        let names: Vec<_> = nested.iter().map(|n| n.class_name.as_str()).collect();
        assert_eq!(names, vec!["Geo", "FloorsItem"]);

        let (plans, nested) = plan_properties(&ctx, vertex, &type_set, object, Nesting::Arrays).unwrap();
        assert_eq!(plans[0].hint.as_deref(), Some("array"));
        assert!(nested.is_empty());
    }

    #[test]
    fn unknown_reference_names_the_vertex() {
        let (graph, psr4, layout, naming) = (
            fixtures::building_graph(),
            fixtures::psr4(),
            fixtures::layout(),
            NamingStrategies::conventional(),
        );
        let ctx = GenContext::new(NameResolver::new(&layout, &psr4, &naming, &graph), StateFlavor::default());
        let vertex = graph.vertex(&VertexId::from("c1")).unwrap();
        let type_set = TypeSet::from_schema(&json!({
            "type": "object",
            "properties": { "x": { "$ref": "#/definitions/Nowhere" } }
        }))
        .unwrap();
        let object = type_set.root.as_object().unwrap();

        let err = plan_properties(&ctx, vertex, &type_set, object, Nesting::Arrays).unwrap_err();
        assert!(matches!(err, CodegenError::SchemaShape { ref name, .. } if name == "Add Building"));
    }
}
