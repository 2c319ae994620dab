//! Command and event record classes.

use super::php_type::{immutable_record, plan_properties, record_members, Nesting};
use super::{Artifact, GenContext};
use crate::diagnostic::CodegenError;
use crate::graph::{HasTypeSet, Vertex, VertexKind};
use crate::merge::{ChangeSet, ClassSpec};

/// Generates the immutable record class of a command or event.
///
/// Without a schema the class is an empty record shell; with one, the root
/// must be an object and every property becomes a constant, a typed private
/// field and a getter.
pub fn generate_message(ctx: &GenContext, vertex: &Vertex) -> Result<Artifact, CodegenError> {
    if !matches!(vertex.kind, VertexKind::Command | VertexKind::Event) {
        return Err(vertex.shape_error("Command or Event", vertex.kind.as_str()));
    }
    let location = ctx.resolver.locate(vertex)?;
    let mut set = ChangeSet::new(&location.namespace, ClassSpec::final_class(&location.class_name));
    immutable_record(&mut set);

    if let Some(type_set) = vertex.type_set() {
        let object = type_set
            .root_object()
            .map_err(|actual| vertex.shape_error("ObjectType", actual))?;
        let (plans, _) = plan_properties(ctx, vertex, type_set, object, Nesting::Arrays)?;
        record_members(&mut set, &plans);
    }

    Ok(Artifact::code(ctx.resolver.constant_name(vertex), &location, set))
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

    fn render(graph: &EventSourcingGraph, id: &str) -> Result<(Artifact, String), CodegenError> {
        let (psr4, layout, naming) = (fixtures::psr4(), fixtures::layout(), NamingStrategies::conventional());
        let ctx = GenContext::new(NameResolver::new(&layout, &psr4, &naming, graph), StateFlavor::default());
        let artifact = generate_message(&ctx, graph.vertex(&VertexId::from(id)).unwrap())?;
        let set = artifact.change_set().unwrap().clone();
        let code = print(&MergeEngine::default().merge(SourceTree::new(), &set).tree);
        Ok((artifact, code))
    }

    #[test]
    fn command_record_with_schema() {
        let (artifact, code) = render(&fixtures::building_graph(), "c1").unwrap();
        assert_eq!(artifact.logical_name, "ADD_BUILDING");
        assert_eq!(artifact.path, PathBuf::from("src/Domain/Model/Command/AddBuilding.php"));
        assert_eq!(
            code,
            r#"<?php

namespace App\Domain\Model\Command;

use EventEngine\Data\ImmutableRecord;
use EventEngine\Data\ImmutableRecordLogic;

final class AddBuilding implements ImmutableRecord
{
    use ImmutableRecordLogic;

    public const BUILDING_ID = 'buildingId';
    public const NAME = 'name';

    private string $buildingId;
    private string $name;

    public function buildingId(): string
    {
        return $this->buildingId;
    }

    public function name(): string
    {
        return $this->name;
    }
}
"#
        );
    }

    #[test]
    fn event_without_schema_is_a_shell() {
        let (_, code) = render(&fixtures::building_graph(), "e2").unwrap();
        assert!(code.contains("final class BuildingRenamed implements ImmutableRecord\n{\n    use ImmutableRecordLogic;\n}"));
    }

    #[test]
    fn scalar_schema_is_a_shape_error() {
        let graph = EventSourcingGraph::from_json(
            &json!({
                "nodes": [
                    { "id": "c1", "name": "Ping", "type": "command", "metadata": { "schema": { "type": "string" } } }
                ]
            })
            .to_string(),
        )
        .unwrap();
        let err = render(&graph, "c1").unwrap_err();
        assert_eq!(
            err,
            CodegenError::SchemaShape {
                kind: VertexKind::Command,
                name: "Ping".into(),
                id: "c1".into(),
                expected: "ObjectType".into(),
                actual: "StringType".into(),
            }
        );
    }
}
