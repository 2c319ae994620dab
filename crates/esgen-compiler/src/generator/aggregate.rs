//! Aggregate behaviour classes.
//!
//! One static method per command and one per recorded event:
//!
//! ```php
//! public static function addBuilding(Message $addBuilding): Generator
//! {
//!     yield [Event::BUILDING_ADDED, $addBuilding->payload()];
//! }
//!
//! public static function whenBuildingAdded(Message $buildingAdded): State
//! {
//!     return State::fromArray($buildingAdded->payload());
//! }
//! ```
//!
//! Commands that modify an existing aggregate take the current `State $state`
//! first, and their events return `$state->with(...)`.

use indexmap::IndexSet;

use super::{framework, Artifact, GenContext};
use crate::diagnostic::CodegenError;
use crate::graph::{AggregateConnection, Vertex, VertexId};
use crate::merge::{ChangeSet, ClassSpec};
use crate::php::{Expr, MethodDecl, Param, Stmt, UseImport};

fn state_param() -> Param {
    Param::typed(framework::STATE_ALIAS, "state")
}

fn payload(message: &str) -> Expr {
    Expr::var(message).method("payload", vec![])
}

/// Static command handler yielding the first recorded event.
pub fn command_method(ctx: &GenContext, command: &Vertex, first_event: &Vertex) -> MethodDecl {
    let naming = ctx.naming();
    let message = ctx.resolver.parameter_name(command);
    let mut method = MethodDecl::public_static(naming.command_method.apply(&command.name));
    if !command.is_new_aggregate() {
        method = method.param(state_param());
    }
    method
        .param(Param::typed(framework::short(framework::MESSAGE), &message))
        .returns(framework::GENERATOR)
        .stmt(Stmt::expr(Expr::yield_value(Expr::list(vec![
            Expr::class_const(framework::API_EVENT, ctx.resolver.constant_name(first_event)),
            payload(&message),
        ]))))
}

/// Static event applier returning the next state.
pub fn event_method(ctx: &GenContext, event: &Vertex, creates_aggregate: bool) -> MethodDecl {
    let naming = ctx.naming();
    let message = ctx.resolver.parameter_name(event);
    let mut method = MethodDecl::public_static(naming.event_method.apply(&event.name));
    let next_state = if creates_aggregate {
        Expr::static_call(framework::STATE_ALIAS, "fromArray", vec![payload(&message)])
    } else {
        method = method.param(state_param());
        Expr::var("state").method("with", vec![payload(&message)])
    };
    method
        .param(Param::typed(framework::short(framework::MESSAGE), &message))
        .returns(framework::STATE_ALIAS)
        .stmt(Stmt::ret(next_state))
}

fn vertex<'a>(ctx: &GenContext<'a>, id: &VertexId) -> Result<&'a Vertex, CodegenError> {
    ctx.vertex(id).ok_or_else(|| CodegenError::UnknownVertex { id: id.to_string() })
}

/// Generates the behaviour class of one aggregate.
///
/// An event is applied the way the first command recording it is handled:
/// events of creating commands build a fresh state.
pub fn generate_behaviour(ctx: &GenContext, connection: &AggregateConnection) -> Result<Artifact, CodegenError> {
    let aggregate = vertex(ctx, &connection.aggregate)?;
    let location = ctx.resolver.locate(aggregate)?;
    let state = ctx.resolver.state_class(aggregate)?;
    let event_api = ctx.resolver.api_class(framework::API_EVENT)?;

    let mut set = ChangeSet::new(&location.namespace, ClassSpec::final_class(&location.class_name));
    set.import(UseImport::class(event_api.fqcn()))
        .import(UseImport::class(framework::MESSAGE))
        .import(UseImport::class(framework::GENERATOR))
        .import(UseImport::aliased(state.fqcn(), framework::STATE_ALIAS));

    let mut applied: IndexSet<&VertexId> = IndexSet::new();
    let mut event_methods = Vec::new();
    for (command_id, events) in &connection.commands {
        let command = vertex(ctx, command_id)?;
        let first = events
            .first()
            .ok_or_else(|| CodegenError::CommandWithoutEvent {
                name: command.name.clone(),
                id: command.id.to_string(),
                aggregate: aggregate.name.clone(),
            })?;
        set.method(command_method(ctx, command, vertex(ctx, first)?));

        for event_id in events {
            if applied.insert(event_id) {
                event_methods.push(event_method(ctx, vertex(ctx, event_id)?, command.is_new_aggregate()));
            }
        }
    }
    for method in event_methods {
        set.method(method);
    }

    Ok(Artifact::code(ctx.resolver.class_name(aggregate), &location, set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{fixtures, StateFlavor};
    use crate::merge::{MergeEngine, MergePolicy};
    use crate::naming::{NameResolver, NamingStrategies};
    use crate::php::{parse_source, print, SourceTree};
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};

    const EXPECTED: &str = r#"<?php

declare(strict_types=1);

namespace App\Domain\Model\Building;

use App\Domain\Api\Event;
use EventEngine\Messaging\Message;
use Generator;
use App\Domain\Model\Building\BuildingState as State;

final class Building
{
    public static function addBuilding(Message $addBuilding): Generator
    {
        yield [Event::BUILDING_ADDED, $addBuilding->payload()];
    }

    public static function renameBuilding(State $state, Message $renameBuilding): Generator
    {
        yield [Event::BUILDING_RENAMED, $renameBuilding->payload()];
    }

    public static function whenBuildingAdded(Message $buildingAdded): State
    {
        return State::fromArray($buildingAdded->payload());
    }

    public static function whenBuildingRenamed(State $state, Message $buildingRenamed): State
    {
        return $state->with($buildingRenamed->payload());
    }
}
"#;

    fn behaviour() -> Artifact {
        let (graph, psr4, layout, naming) = (
            fixtures::building_graph(),
            fixtures::psr4(),
            fixtures::layout(),
            NamingStrategies::conventional(),
        );
        let ctx = GenContext::new(NameResolver::new(&layout, &psr4, &naming, &graph), StateFlavor::default());
        let map = graph.aggregate_map().unwrap();
        generate_behaviour(&ctx, &map[&VertexId::from("a1")]).unwrap()
    }

    fn engine() -> MergeEngine {
        MergeEngine::new(MergePolicy::PreserveExisting, true)
    }

    #[test]
    fn generates_behaviour_class() {
        let artifact = behaviour();
        assert_eq!(artifact.logical_name, "Building");
        assert_eq!(artifact.path, PathBuf::from("src/Domain/Model/Building/Building.php"));

        let set = artifact.change_set().unwrap();
        let code = print(&engine().merge(SourceTree::new(), set).tree);
        assert_eq!(code, EXPECTED);
    }

    #[test]
    fn keeps_custom_command_body() {
        let existing = r#"<?php

declare(strict_types=1);

namespace App\Domain\Model\Building;

use EventEngine\Messaging\Message;

final class Building
{
    public static function addBuilding(Message $addBuilding): Generator
    {
        if ($addBuilding->get('name') === '') {
            throw new \InvalidArgumentException('name required');
        }
        yield [Event::BUILDING_ADDED, $addBuilding->payload()];
    }
}
"#;
        let set = behaviour().change_set().unwrap().clone();
        let tree = parse_source(existing, Path::new("Building.php")).unwrap();
        let code = print(&engine().merge(tree, &set).tree);

        assert!(code.contains(
            "        if ($addBuilding->get('name') === '') {\n            throw new \\InvalidArgumentException('name required');\n        }\n"
        ));
        assert_eq!(code.matches("function addBuilding(").count(), 1);
        assert_eq!(code.matches("function whenBuildingAdded(").count(), 1);
        assert_eq!(code.matches("use EventEngine\\Messaging\\Message;").count(), 1);
    }
}
