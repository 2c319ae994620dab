//! Api description classes.
//!
//! `Aggregate`, `Command`, `Event` and `Query` in the api directory are shared
//! by every artifact of their kind. Each generator contributes its own
//! constants and appends its registration to `describe()`; the merge engine
//! skips registrations that are already there.

use super::{framework, Artifact, GenContext};
use crate::diagnostic::CodegenError;
use crate::graph::{AggregateConnection, HasSchema, Vertex, VertexId, VertexKind};
use crate::merge::{ChangeSet, ClassSpec};
use crate::naming::ClassLocation;
use crate::php::{ConstDecl, Expr, MethodDecl, Param, Stmt, UseImport};

const DESCRIBE: &str = "describe";
const CLASS_MAP: &str = "classMap";
const SCHEMA_PATH: &str = "SCHEMA_PATH";

fn description_class(location: &ClassLocation) -> ChangeSet {
    let event_engine = framework::short(framework::EVENT_ENGINE);
    let mut set = ChangeSet::new(&location.namespace, ClassSpec::final_class(&location.class_name));
    set.import(UseImport::class(framework::EVENT_ENGINE))
        .import(UseImport::class(framework::EVENT_ENGINE_DESCRIPTION))
        .implements(framework::short(framework::EVENT_ENGINE_DESCRIPTION))
        .method(
            MethodDecl::public_static(DESCRIBE)
                .param(Param::typed(event_engine, "eventEngine"))
                .returns("void"),
        );
    set
}

/// `public const SCHEMA_PATH = __DIR__ . '/_schema/';`
fn schema_path_constant(ctx: &GenContext) -> ConstDecl {
    ConstDecl::public(
        SCHEMA_PATH,
        Expr::name("__DIR__").concat(Expr::string(ctx.resolver.schema_path_from_api())),
    )
}

/// `JsonSchemaArray::fromFile(self::SCHEMA_PATH . '<name>.json')`
fn schema_file_expr(set: &mut ChangeSet, ctx: &GenContext, name: &str) -> Expr {
    set.import(UseImport::class(framework::JSON_SCHEMA_ARRAY))
        .constant(schema_path_constant(ctx));
    Expr::static_call(
        framework::short(framework::JSON_SCHEMA_ARRAY),
        "fromFile",
        vec![Expr::class_const("self", SCHEMA_PATH).concat(Expr::string(format!("{}.json", name)))],
    )
}

/// The payload schema of a message: its sidecar file, or an empty object.
fn message_schema(set: &mut ChangeSet, ctx: &GenContext, vertex: &Vertex) -> Expr {
    if vertex.schema().is_some() {
        schema_file_expr(set, ctx, &ctx.resolver.constant_value(vertex))
    } else {
        set.import(UseImport::class(framework::JSON_SCHEMA));
        Expr::static_call(framework::short(framework::JSON_SCHEMA), "object", vec![Expr::list(vec![])])
    }
}

fn event_engine() -> Expr {
    Expr::var("eventEngine")
}

/// Command or event registration in `Command`/`Event`, plus its class map
/// entry.
pub fn message_description(ctx: &GenContext, vertex: &Vertex) -> Result<Artifact, CodegenError> {
    let (class_name, register) = match vertex.kind {
        VertexKind::Command => (framework::API_COMMAND, "registerCommand"),
        VertexKind::Event => (framework::API_EVENT, "registerEvent"),
        _ => return Err(vertex.shape_error("Command or Event", vertex.kind.as_str())),
    };
    let location = ctx.resolver.api_class(class_name)?;
    let record = ctx.resolver.locate(vertex)?;
    let constant = ctx.resolver.constant_name(vertex);

    let mut set = description_class(&location);
    set.constant(ConstDecl::public(&constant, Expr::string(ctx.resolver.constant_value(vertex))));
    let schema = message_schema(&mut set, ctx, vertex);
    set.inject(
        DESCRIBE,
        vec![Stmt::expr(
            event_engine().method(register, vec![Expr::class_const("self", &constant), schema]),
        )],
    )
    .import(UseImport::class(record.fqcn()))
    .method(MethodDecl::public_static(CLASS_MAP).returns("array"))
    .class_map_entry(
        CLASS_MAP,
        Expr::class_const("self", &constant),
        Expr::class_ref(&record.class_name),
    );

    Ok(Artifact::code(format!("Api\\{}", class_name), &location, set))
}

/// The fluent registration of one command in `Aggregate::describe()`.
pub fn registration(
    ctx: &GenContext,
    aggregate: &Vertex,
    command: &Vertex,
    events: &[&Vertex],
    behaviour: &str,
) -> Expr {
    let naming = ctx.naming();
    let resolver = &ctx.resolver;
    let is_new = command.is_new_aggregate();
    let handle = |method: String| Expr::list(vec![Expr::class_ref(behaviour), Expr::string(method)]);
    let identifier = aggregate
        .identifier()
        .map(str::to_string)
        .unwrap_or_else(|| naming.identifier.apply(&aggregate.name));

    let mut chain = event_engine()
        .method(
            "process",
            vec![Expr::class_const(framework::API_COMMAND, resolver.constant_name(command))],
        )
        .method(
            if is_new { "withNew" } else { "withExisting" },
            vec![Expr::class_const("self", resolver.constant_name(aggregate))],
        )
        .method("identifiedBy", vec![Expr::string(identifier)])
        .method("handle", vec![handle(naming.command_method.apply(&command.name))]);

    for (i, event) in events.iter().enumerate() {
        chain = chain
            .method(
                if i == 0 { "recordThat" } else { "orRecordThat" },
                vec![Expr::class_const(framework::API_EVENT, resolver.constant_name(event))],
            )
            .method("apply", vec![handle(naming.event_method.apply(&event.name))]);
    }

    match (&naming.store_state, is_new) {
        (Some(store), true) => chain.method("storeStateIn", vec![Expr::string(store.apply(&aggregate.name))]),
        _ => chain,
    }
}

/// Aggregate constant and one registration chain per command.
pub fn aggregate_description(ctx: &GenContext, connection: &AggregateConnection) -> Result<Artifact, CodegenError> {
    let lookup = |id: &VertexId| ctx.vertex(id).ok_or_else(|| CodegenError::UnknownVertex { id: id.to_string() });
    let aggregate = lookup(&connection.aggregate)?;
    let location = ctx.resolver.api_class(framework::API_AGGREGATE)?;
    let behaviour = ctx.resolver.locate(aggregate)?;

    let mut set = description_class(&location);
    set.constant(ConstDecl::public(
        ctx.resolver.constant_name(aggregate),
        Expr::string(ctx.resolver.constant_value(aggregate)),
    ))
    .import(UseImport::class(behaviour.fqcn()));

    let mut statements = Vec::with_capacity(connection.commands.len());
    for (command_id, event_ids) in &connection.commands {
        let command = lookup(command_id)?;
        let events = event_ids.iter().map(lookup).collect::<Result<Vec<_>, _>>()?;
        statements.push(Stmt::expr(registration(ctx, aggregate, command, &events, &behaviour.class_name)));
    }
    set.inject(DESCRIBE, statements);

    Ok(Artifact::code(
        format!("Api\\{}", framework::API_AGGREGATE),
        &location,
        set,
    ))
}

/// Query registration in `Query::describe()`.
///
/// The returned document is registered as a type when it has a schema, so
/// that `JsonSchema::typeRef()` can point at it.
pub fn query_description(
    ctx: &GenContext,
    document: &Vertex,
    query_name: &str,
    resolver_class: &ClassLocation,
) -> Result<Artifact, CodegenError> {
    let location = ctx.resolver.api_class(framework::API_QUERY)?;
    let constant = ctx.naming().constant_name.apply(query_name);
    let type_name = ctx.resolver.class_name(document);

    let mut set = description_class(&location);
    set.constant(ConstDecl::public(&constant, Expr::string(query_name)))
        .import(UseImport::class(resolver_class.fqcn()))
        .import(UseImport::class(framework::JSON_SCHEMA));

    let mut statements = Vec::new();
    if document.schema().is_some() {
        let schema = schema_file_expr(&mut set, ctx, &type_name);
        statements.push(Stmt::expr(
            event_engine().method("registerType", vec![Expr::string(&type_name), schema]),
        ));
    }
    let request_schema = schema_file_expr(&mut set, ctx, query_name);
    statements.push(Stmt::expr(
        event_engine()
            .method("registerQuery", vec![Expr::class_const("self", &constant), request_schema])
            .method("resolveWith", vec![Expr::class_ref(&resolver_class.class_name)])
            .method(
                "setReturnType",
                vec![Expr::static_call(
                    framework::short(framework::JSON_SCHEMA),
                    "typeRef",
                    vec![Expr::string(&type_name)],
                )],
            ),
    ));
    set.inject(DESCRIBE, statements);

    Ok(Artifact::code(format!("Api\\{}", framework::API_QUERY), &location, set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{fixtures, StateFlavor};
    use crate::merge::{MergeEngine, MergePolicy};
    use crate::naming::{FilterStep, Filter, NameResolver, NamingStrategies};
    use crate::php::{parse_source, print, SourceTree};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn naming() -> NamingStrategies {
        NamingStrategies::conventional().with_store_state(Filter::from_steps(vec![FilterStep::Snake, FilterStep::Plural]))
    }

    fn engine() -> MergeEngine {
        MergeEngine::new(MergePolicy::PreserveExisting, true)
    }

    fn merge_all(artifacts: &[Artifact]) -> String {
        let sets: Vec<ChangeSet> = artifacts.iter().filter_map(|a| a.change_set().cloned()).collect();
        print(&engine().merge_all(SourceTree::new(), &sets).tree)
    }

    #[test]
    fn aggregate_description_chains() {
        let (graph, psr4, layout, naming) = (fixtures::building_graph(), fixtures::psr4(), fixtures::layout(), naming());
        let ctx = GenContext::new(NameResolver::new(&layout, &psr4, &naming, &graph), StateFlavor::default());
        let map = graph.aggregate_map().unwrap();
        let artifact = aggregate_description(&ctx, &map[&VertexId::from("a1")]).unwrap();

        let code = merge_all(std::slice::from_ref(&artifact));
        assert_eq!(
            code,
            r#"<?php

declare(strict_types=1);

namespace App\Domain\Api;

use EventEngine\EventEngine;
use EventEngine\EventEngineDescription;
use App\Domain\Model\Building\Building;

final class Aggregate implements EventEngineDescription
{
    public const BUILDING = 'Building';

    public static function describe(EventEngine $eventEngine): void
    {
        $eventEngine->process(Command::ADD_BUILDING)
            ->withNew(self::BUILDING)
            ->identifiedBy('buildingId')
            ->handle([Building::class, 'addBuilding'])
            ->recordThat(Event::BUILDING_ADDED)
            ->apply([Building::class, 'whenBuildingAdded'])
            ->storeStateIn('buildings');
        $eventEngine->process(Command::RENAME_BUILDING)
            ->withExisting(self::BUILDING)
            ->identifiedBy('buildingId')
            ->handle([Building::class, 'renameBuilding'])
            ->recordThat(Event::BUILDING_RENAMED)
            ->apply([Building::class, 'whenBuildingRenamed']);
    }
}
"#
        );

        // regenerating into its own output is byte-identical
        let tree = parse_source(&code, Path::new("Aggregate.php")).unwrap();
        let again = engine().merge(tree, artifact.change_set().unwrap());
        assert!(!again.modified);
        assert_eq!(print(&again.tree), code);
    }

    #[test]
    fn store_state_requires_strategy() {
        let (graph, psr4, layout) = (fixtures::building_graph(), fixtures::psr4(), fixtures::layout());
        let naming = NamingStrategies::conventional();
        let ctx = GenContext::new(NameResolver::new(&layout, &psr4, &naming, &graph), StateFlavor::default());
        let map = graph.aggregate_map().unwrap();
        let code = merge_all(&[aggregate_description(&ctx, &map[&VertexId::from("a1")]).unwrap()]);
        assert!(!code.contains("storeStateIn"));
        assert!(code.contains("->withNew(self::BUILDING)"));
    }

    #[test]
    fn multiple_events_chain_or_record_that() {
        let (graph, psr4, layout, naming) = (fixtures::building_graph(), fixtures::psr4(), fixtures::layout(), naming());
        let ctx = GenContext::new(NameResolver::new(&layout, &psr4, &naming, &graph), StateFlavor::default());
        let v = |id: &str| graph.vertex(&VertexId::from(id)).unwrap();
        let chain = registration(&ctx, v("a1"), v("c2"), &[v("e1"), v("e2")], "Building");
        let printed = crate::php::print_expr(&chain);
        assert!(printed.contains("->recordThat(Event::BUILDING_ADDED)\n    ->apply([Building::class, 'whenBuildingAdded'])\n    ->orRecordThat(Event::BUILDING_RENAMED)"));
        assert!(!printed.contains("storeStateIn"));
    }

    #[test]
    fn command_description_and_class_map() {
        let (graph, psr4, layout, naming) = (fixtures::building_graph(), fixtures::psr4(), fixtures::layout(), naming());
        let ctx = GenContext::new(NameResolver::new(&layout, &psr4, &naming, &graph), StateFlavor::default());
        let v = |id: &str| graph.vertex(&VertexId::from(id)).unwrap();
        let artifacts = vec![
            message_description(&ctx, v("c1")).unwrap(),
            message_description(&ctx, v("c2")).unwrap(),
            message_description(&ctx, v("c1")).unwrap(),
        ];
        assert_eq!(artifacts[0].logical_name, "Api\\Command");

        let code = merge_all(&artifacts);
        assert_eq!(
            code,
            r#"<?php

declare(strict_types=1);

namespace App\Domain\Api;

use EventEngine\EventEngine;
use EventEngine\EventEngineDescription;
use EventEngine\JsonSchema\JsonSchemaArray;
use App\Domain\Model\Command\AddBuilding;
use EventEngine\JsonSchema\JsonSchema;
use App\Domain\Model\Command\RenameBuilding;

final class Command implements EventEngineDescription
{
    public const ADD_BUILDING = 'AddBuilding';
    public const SCHEMA_PATH = __DIR__ . '/_schema/';
    public const RENAME_BUILDING = 'RenameBuilding';

    public static function describe(EventEngine $eventEngine): void
    {
        $eventEngine->registerCommand(self::ADD_BUILDING, JsonSchemaArray::fromFile(self::SCHEMA_PATH . 'AddBuilding.json'));
        $eventEngine->registerCommand(self::RENAME_BUILDING, JsonSchema::object([]));
    }

    public static function classMap(): array
    {
        return [
            self::ADD_BUILDING => AddBuilding::class,
            self::RENAME_BUILDING => RenameBuilding::class,
        ];
    }
}
"#
        );
    }

    #[test]
    fn query_description_registers_type_and_query() {
        let (graph, psr4, layout, naming) = (fixtures::building_graph(), fixtures::psr4(), fixtures::layout(), naming());
        let ctx = GenContext::new(NameResolver::new(&layout, &psr4, &naming, &graph), StateFlavor::default());
        let document = graph.vertex(&VertexId::from("d1")).unwrap();
        let resolver = ctx.resolver.locate_in(&layout.resolver_dir, "BuildingResolver").unwrap();

        let code = merge_all(&[query_description(&ctx, document, "GetBuilding", &resolver).unwrap()]);
        assert!(code.contains(
            "        $eventEngine->registerType('Building', JsonSchemaArray::fromFile(self::SCHEMA_PATH . 'Building.json'));\n        $eventEngine->registerQuery(self::GET_BUILDING, JsonSchemaArray::fromFile(self::SCHEMA_PATH . 'GetBuilding.json'))\n            ->resolveWith(BuildingResolver::class)\n            ->setReturnType(JsonSchema::typeRef('Building'));\n"
        ));
        assert!(code.contains("use App\\Domain\\Resolver\\BuildingResolver;"));
    }
}
