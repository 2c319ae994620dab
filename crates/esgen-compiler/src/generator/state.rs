//! Aggregate state classes.

use serde::{Deserialize, Serialize};

use super::php_type::{immutable_record, plan_properties, record_members, Nesting};
use super::{framework, Artifact, GenContext};
use crate::diagnostic::CodegenError;
use crate::graph::{AggregateConnection, HasTypeSet, Vertex};
use crate::merge::{ChangeSet, ClassSpec, CodeChange};
use crate::php::{Expr, MethodDecl, Param, PropertyDecl, Stmt, UseImport};

/// How aggregate state is represented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateFlavor {
    /// Typed fields from the state schema, record logic from `ImmutableRecordLogic`.
    #[default]
    ImmutableRecord,
    /// The record data array is kept as is.
    RawArray,
}

const RECORD_DATA: &str = "recordData";

/// The seven members of a raw-array state. They exist together or not at all.
fn raw_array_methods() -> Vec<MethodDecl> {
    let record_data = || Param::typed("array", RECORD_DATA);
    let new_self = |arg: Expr| Stmt::ret(Expr::new_object("self", vec![arg]));
    vec![
        MethodDecl::public_static("fromRecordData")
            .param(record_data())
            .returns("self")
            .stmt(new_self(Expr::var(RECORD_DATA))),
        MethodDecl::public_static("fromArray")
            .param(Param::typed("array", "nativeData"))
            .returns("self")
            .stmt(new_self(Expr::var("nativeData"))),
        MethodDecl::private("__construct")
            .param(record_data())
            .stmt(Stmt::expr(
                Expr::var("this").method("setRecordData", vec![Expr::var(RECORD_DATA)]),
            )),
        MethodDecl::public("with")
            .param(record_data())
            .returns("self")
            .stmt(Stmt::expr(Expr::var("copy").assign(Expr::clone_of(Expr::var("this")))))
            .stmt(Stmt::expr(
                Expr::var("copy").method("setRecordData", vec![Expr::var(RECORD_DATA)]),
            ))
            .stmt(Stmt::ret(Expr::var("copy"))),
        MethodDecl::public("toArray")
            .returns("array")
            .stmt(Stmt::ret(Expr::this_prop(RECORD_DATA))),
        MethodDecl::public("equals")
            .param(Param::typed(framework::short(framework::IMMUTABLE_RECORD), "other"))
            .returns("bool")
            .stmt(Stmt::ret(Expr::var("this").method("toArray", vec![]).binary(
                "===",
                Expr::var("other").method("toArray", vec![]),
            ))),
        MethodDecl::private("setRecordData")
            .param(record_data())
            .returns("void")
            .stmt(Stmt::expr(Expr::this_prop(RECORD_DATA).assign(Expr::call(
                "array_merge",
                vec![Expr::this_prop(RECORD_DATA), Expr::var(RECORD_DATA)],
            )))),
    ]
}

/// Placeholder mutator for one event: clones the state and returns it.
///
/// The body does not map event fields to state fields; the method name follows
/// the event name, which does not fit events carrying several fields.
pub fn with_event_method(ctx: &GenContext, event: &Vertex) -> MethodDecl {
    MethodDecl::public(ctx.naming().with_method.apply(&event.name))
        .returns("self")
        .stmt(Stmt::expr(Expr::var("instance").assign(Expr::clone_of(Expr::var("this")))))
        .stmt(Stmt::ret(Expr::var("instance")))
}

/// The state schema of an aggregate: its state document's, else its own.
fn state_source<'a>(ctx: &GenContext<'a>, connection: &AggregateConnection, aggregate: &'a Vertex) -> &'a Vertex {
    connection
        .state_document
        .as_ref()
        .and_then(|id| ctx.vertex(id))
        .filter(|doc| doc.type_set().is_some())
        .unwrap_or(aggregate)
}

/// Generates the state class of one aggregate.
pub fn generate_state(ctx: &GenContext, connection: &AggregateConnection) -> Result<Artifact, CodegenError> {
    let aggregate = ctx
        .vertex(&connection.aggregate)
        .ok_or_else(|| CodegenError::UnknownVertex {
            id: connection.aggregate.to_string(),
        })?;
    let location = ctx.resolver.state_class(aggregate)?;
    let mut set = ChangeSet::new(&location.namespace, ClassSpec::final_class(&location.class_name));

    match ctx.state_flavor {
        StateFlavor::ImmutableRecord => {
            immutable_record(&mut set);
            let source = state_source(ctx, connection, aggregate);
            if let Some(type_set) = source.type_set() {
                let object = type_set
                    .root_object()
                    .map_err(|actual| source.shape_error("ObjectType", actual))?;
                let (plans, _) = plan_properties(ctx, source, type_set, object, Nesting::Arrays)?;
                record_members(&mut set, &plans);
            }
        }
        StateFlavor::RawArray => {
            set.import(UseImport::class(framework::IMMUTABLE_RECORD))
                .implements(framework::short(framework::IMMUTABLE_RECORD))
                .property(PropertyDecl::private(Some("array".to_string()), RECORD_DATA).with_default(Expr::list(vec![])))
                .push(CodeChange::MethodGroup(raw_array_methods()));
        }
    }

    for event_id in &connection.events {
        let event = ctx
            .vertex(event_id)
            .ok_or_else(|| CodegenError::UnknownVertex { id: event_id.to_string() })?;
        set.method(with_event_method(ctx, event));
    }

    Ok(Artifact::code(location.class_name.clone(), &location, set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::fixtures;
    use crate::graph::VertexId;
    use crate::merge::MergeEngine;
    use crate::naming::{NameResolver, NamingStrategies};
    use crate::php::{parse_source, print, SourceTree};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn state(flavor: StateFlavor) -> Artifact {
        let (graph, psr4, layout, naming) = (
            fixtures::building_graph(),
            fixtures::psr4(),
            fixtures::layout(),
            NamingStrategies::conventional(),
        );
        let ctx = GenContext::new(NameResolver::new(&layout, &psr4, &naming, &graph), flavor);
        let map = graph.aggregate_map().unwrap();
        generate_state(&ctx, &map[&VertexId::from("a1")]).unwrap()
    }

    fn render(artifact: &Artifact) -> String {
        print(&MergeEngine::default().merge(SourceTree::new(), artifact.change_set().unwrap()).tree)
    }

    #[test]
    fn immutable_record_state_from_state_document() {
        let artifact = state(StateFlavor::ImmutableRecord);
        assert_eq!(artifact.logical_name, "BuildingState");
        assert_eq!(
            render(&artifact),
            r#"<?php

namespace App\Domain\Model\Building;

use EventEngine\Data\ImmutableRecord;
use EventEngine\Data\ImmutableRecordLogic;
use App\Domain\Model\ValueObject\Address;

final class BuildingState implements ImmutableRecord
{
    use ImmutableRecordLogic;

    public const BUILDING_ID = 'buildingId';
    public const NAME = 'name';
    public const ADDRESS = 'address';

    private string $buildingId;
    private string $name;
    private ?Address $address;

    public function buildingId(): string
    {
        return $this->buildingId;
    }

    public function name(): string
    {
        return $this->name;
    }

    public function address(): ?Address
    {
        return $this->address;
    }

    public function withBuildingAdded(): self
    {
        $instance = clone $this;
        return $instance;
    }

    public function withBuildingRenamed(): self
    {
        $instance = clone $this;
        return $instance;
    }
}
"#
        );
    }

    #[test]
    fn raw_array_state_members() {
        let code = render(&state(StateFlavor::RawArray));
        assert!(code.contains("final class BuildingState implements ImmutableRecord\n{\n    private array $recordData = [];\n"));
        for method in ["fromRecordData", "fromArray", "__construct", "with", "toArray", "equals", "setRecordData"] {
            assert_eq!(code.matches(&format!("function {}(", method)).count(), 1, "{}", method);
        }
        assert!(code.contains("        $this->recordData = array_merge($this->recordData, $recordData);"));
        assert!(code.contains("        return $this->toArray() === $other->toArray();"));
    }

    #[test]
    fn raw_array_group_is_skipped_when_partly_hand_written() {
        let existing = "<?php\n\nnamespace App\\Domain\\Model\\Building;\n\nfinal class BuildingState\n{\n    public function toArray(): array\n    {\n        return ['custom' => true];\n    }\n}\n";
        let tree = parse_source(existing, Path::new("BuildingState.php")).unwrap();
        let artifact = state(StateFlavor::RawArray);
        let code = print(&MergeEngine::default().merge(tree, artifact.change_set().unwrap()).tree);

        assert!(!code.contains("function fromRecordData("));
        assert!(code.contains("return ['custom' => true];"));
        assert!(code.contains("function withBuildingAdded(): self"));
    }
}
