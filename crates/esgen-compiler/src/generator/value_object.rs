//! Value object classes from document schemas.
//!
//! Object schemas become immutable records, scalar schemas become single-value
//! classes with named constructors. Nested inline objects and local
//! definitions are expanded into classes of their own, next to the document's
//! class.

use std::collections::HashSet;

use super::php_type::{immutable_record, plan_properties, record_members, Nesting};
use super::{sibling, Artifact, GenContext};
use crate::diagnostic::CodegenError;
use crate::graph::{HasTypeSet, Vertex, VertexKind};
use crate::merge::{ChangeSet, ClassSpec};
use crate::naming::ClassLocation;
use crate::php::{Expr, MethodDecl, Param, PropertyDecl, Stmt};
use crate::types::{Type, TypeKind, TypeSet};

/// PHP type and method suffix of a scalar value object.
fn scalar_kind(ty: &Type) -> Option<(&'static str, &'static str)> {
    match ty.kind {
        TypeKind::String(_) => Some(("string", "String")),
        TypeKind::Integer(_) => Some(("int", "Int")),
        TypeKind::Number(_) => Some(("float", "Float")),
        TypeKind::Boolean => Some(("bool", "Bool")),
        _ => None,
    }
}

/// `fromString`/`toString`/`equals`/`__toString` around one private value.
fn scalar_class(location: &ClassLocation, php_type: &str, suffix: &str) -> ChangeSet {
    let value = Expr::this_prop("value");
    let to_string = if php_type == "string" {
        value.clone()
    } else {
        Expr::Raw("(string) $this->value".to_string())
    };

    let mut set = ChangeSet::new(&location.namespace, ClassSpec::final_class(&location.class_name));
    set.property(PropertyDecl::private(Some(php_type.to_string()), "value"))
        .method(
            MethodDecl::public_static(format!("from{}", suffix))
                .param(Param::typed(php_type, "value"))
                .returns("self")
                .stmt(Stmt::ret(Expr::new_object("self", vec![Expr::var("value")]))),
        )
        .method(
            MethodDecl::private("__construct")
                .param(Param::typed(php_type, "value"))
                .stmt(Stmt::expr(value.clone().assign(Expr::var("value")))),
        )
        .method(
            MethodDecl::public(format!("to{}", suffix))
                .returns(php_type)
                .stmt(Stmt::ret(value.clone())),
        )
        .method(
            MethodDecl::public("equals")
                .param(Param::untyped("other"))
                .returns("bool")
                .stmt(Stmt::ret(
                    Expr::var("other")
                        .binary("instanceof", Expr::name("self"))
                        .binary("&&", value.binary("===", Expr::var("other").prop("value"))),
                )),
        )
        .method(
            MethodDecl::public("__toString")
                .returns("string")
                .stmt(Stmt::ret(to_string)),
        );
    set
}

struct Expansion<'c, 'a> {
    ctx: &'c GenContext<'a>,
    vertex: &'a Vertex,
    logical_prefix: String,
    seen: HashSet<String>,
    artifacts: Vec<Artifact>,
}

impl<'c, 'a> Expansion<'c, 'a> {
    fn push(&mut self, location: &ClassLocation, set: ChangeSet) {
        let logical_name = if location.class_name == self.logical_prefix {
            self.logical_prefix.clone()
        } else {
            format!("{}\\{}", self.logical_prefix, location.class_name)
        };
        self.artifacts.push(Artifact::code(logical_name, location, set));
    }

    fn expand(&mut self, type_set: &TypeSet, location: &ClassLocation, ty: &Type) -> Result<(), CodegenError> {
        if !self.seen.insert(location.class_name.to_ascii_lowercase()) {
            return Ok(());
        }
        let resolved = type_set.resolve(ty, self.ctx.graph().definitions())?;

        if let Some((php_type, suffix)) = scalar_kind(resolved) {
            self.push(location, scalar_class(location, php_type, suffix));
            return Ok(());
        }
        match &resolved.kind {
            TypeKind::Object(object) => {
                let (plans, nested) = plan_properties(self.ctx, self.vertex, type_set, object, Nesting::Classes)?;
                let mut set = ChangeSet::new(&location.namespace, ClassSpec::final_class(&location.class_name));
                immutable_record(&mut set);
                record_members(&mut set, &plans);
                self.push(location, set);

                for class in nested {
                    self.expand(type_set, &sibling(location, &class.class_name), class.ty)?;
                }
                Ok(())
            }
            TypeKind::Array(array) => {
                // the list itself stays a plain array; object items get a class
                match array.items.as_deref() {
                    Some(items) if type_set.resolve(items, self.ctx.graph().definitions())?.as_object().is_some() => {
                        let item_class = format!("{}Item", location.class_name);
                        self.expand(type_set, &sibling(location, &item_class), items)
                    }
                    _ => Ok(()),
                }
            }
            _ => Err(self.vertex.shape_error("ObjectType, ArrayType or a scalar type", resolved.kind_name())),
        }
    }
}

/// Generates the value object classes of one document.
///
/// Aggregate state documents are skipped: their aggregate's state class
/// represents them.
pub fn generate_value_objects(ctx: &GenContext, document: &Vertex) -> Result<Vec<Artifact>, CodegenError> {
    if !document.is(VertexKind::Document) {
        return Err(document.shape_error("Document", document.kind.as_str()));
    }
    let Some(type_set) = document.type_set() else {
        return Ok(Vec::new());
    };
    if document.is_aggregate_state() {
        return Ok(Vec::new());
    }

    let location = ctx.resolver.locate(document)?;
    let mut expansion = Expansion {
        ctx,
        vertex: document,
        logical_prefix: location.class_name.clone(),
        seen: HashSet::new(),
        artifacts: Vec::new(),
    };
    expansion.expand(type_set, &location, &type_set.root)?;
    Ok(expansion.artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{fixtures, StateFlavor};
    use crate::graph::{EventSourcingGraph, VertexId};
    use crate::merge::MergeEngine;
    use crate::naming::{NameResolver, NamingStrategies};
    use crate::php::{print, SourceTree};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::PathBuf;

    fn generate(graph: &EventSourcingGraph, id: &str) -> Result<Vec<Artifact>, CodegenError> {
        let (psr4, layout, naming) = (fixtures::psr4(), fixtures::layout(), NamingStrategies::conventional());
        let ctx = GenContext::new(NameResolver::new(&layout, &psr4, &naming, graph), StateFlavor::default());
        generate_value_objects(&ctx, graph.vertex(&VertexId::from(id)).unwrap())
    }

    fn render(artifact: &Artifact) -> String {
        print(&MergeEngine::default().merge(SourceTree::new(), artifact.change_set().unwrap()).tree)
    }

    fn graph(nodes: serde_json::Value) -> EventSourcingGraph {
        EventSourcingGraph::from_json(&json!({ "nodes": nodes }).to_string()).unwrap()
    }

    #[test]
    fn object_document_becomes_record() {
        let artifacts = generate(&fixtures::building_graph(), "d2").unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].logical_name, "Address");
        assert_eq!(artifacts[0].path, PathBuf::from("src/Domain/Model/ValueObject/Address.php"));

        let code = render(&artifacts[0]);
        assert!(code.contains("    private string $street;\n    private ?string $zip;\n"));
        assert!(code.contains("    public function zip(): ?string\n"));
    }

    #[test]
    fn aggregate_state_documents_are_skipped() {
        assert!(generate(&fixtures::building_graph(), "d1").unwrap().is_empty());
    }

    #[test]
    fn scalar_document_becomes_single_value_class() {
        let g = graph(json!([
            { "id": "d1", "name": "Building Id", "type": "document",
              "metadata": { "schema": { "type": "string", "format": "uuid" } } }
        ]));
        let artifacts = generate(&g, "d1").unwrap();
        assert_eq!(
            render(&artifacts[0]),
            r#"<?php

namespace App\Domain\Model\ValueObject;

final class BuildingId
{
    private string $value;

    public static function fromString(string $value): self
    {
        return new self($value);
    }

    private function __construct(string $value)
    {
        $this->value = $value;
    }

    public function toString(): string
    {
        return $this->value;
    }

    public function equals($other): bool
    {
        return $other instanceof self && $this->value === $other->value;
    }

    public function __toString(): string
    {
        return $this->value;
    }
}
"#
        );
    }

    #[test]
    fn integer_scalar_casts_in_to_string() {
        let g = graph(json!([
            { "id": "d1", "name": "Floor Count", "type": "document",
              "metadata": { "schema": { "type": "integer" } } }
        ]));
        let code = render(&generate(&g, "d1").unwrap()[0]);
        assert!(code.contains("public static function fromInt(int $value): self"));
        assert!(code.contains("public function toInt(): int"));
        assert!(code.contains("return (string) $this->value;"));
    }

    #[test]
    fn nested_objects_and_local_definitions_are_expanded() {
        let g = graph(json!([
            { "id": "d1", "name": "Site", "type": "document",
              "metadata": { "schema": {
                  "type": "object",
                  "properties": {
                      "location": { "type": "object", "properties": { "lat": { "type": "number" } } },
                      "owner": { "$ref": "#/definitions/Owner" },
                      "gates": { "type": "array", "items": { "type": "object", "properties": { "no": { "type": "integer" } } } }
                  },
                  "definitions": {
                      "Owner": { "type": "object", "properties": { "name": { "type": "string" } } }
                  }
              } } }
        ]));
        let artifacts = generate(&g, "d1").unwrap();
        let names: Vec<_> = artifacts.iter().map(|a| a.logical_name.as_str()).collect();
        assert_eq!(names, vec!["Site", "Site\\Location", "Site\\Owner", "Site\\GatesItem"]);
        assert_eq!(artifacts[2].path, PathBuf::from("src/Domain/Model/ValueObject/Owner.php"));

        let site = render(&artifacts[0]);
        assert!(site.contains("private ?Location $location;"));
        assert!(site.contains("private ?Owner $owner;"));
        assert!(site.contains("private ?array $gates;"));
    }

    #[test]
    fn documents_without_schema_generate_nothing() {
        let g = graph(json!([{ "id": "d1", "name": "Note", "type": "document" }]));
        assert!(generate(&g, "d1").unwrap().is_empty());
    }
}
