//! Queries on documents: request record, resolver, finder and registration.

use super::php_type::{immutable_record, plan_properties, record_members, Nesting};
use super::{api, framework, Artifact, GenContext};
use crate::diagnostic::CodegenError;
use crate::graph::{HasQuery, Vertex, VertexKind};
use crate::merge::{ChangeSet, ClassSpec};
use crate::naming::ClassLocation;
use crate::php::{Expr, MethodDecl, Param, PropertyDecl, Stmt, UseImport};

/// Name of the query on a document: its own `queryName`, else the strategy.
pub fn query_name(ctx: &GenContext, document: &Vertex) -> String {
    document
        .query_name()
        .map(str::to_string)
        .unwrap_or_else(|| ctx.naming().query_name.apply(&document.name))
}

/// The aggregate whose stored state answers a query on `document`.
///
/// Only set when a store-state strategy is configured: without a collection
/// name there is nothing to look state up in.
fn stored_aggregate<'a>(ctx: &GenContext<'a>, document: &'a Vertex) -> Option<(&'a Vertex, &'a Vertex)> {
    ctx.naming().store_state.as_ref()?;
    let graph = ctx.graph();
    let state = if document.is_aggregate_state() {
        document
    } else {
        graph.state_document_for(&document.id)?
    };
    let aggregate = graph.aggregate_for(&state.id)?;
    Some((aggregate, state))
}

fn identifier(ctx: &GenContext, aggregate: &Vertex) -> String {
    aggregate
        .identifier()
        .map(str::to_string)
        .unwrap_or_else(|| ctx.naming().identifier.apply(&aggregate.name))
}

fn constructor_injected(set: &mut ChangeSet, class: &str, property: &str) {
    set.property(PropertyDecl::private(Some(class.to_string()), property))
        .method(
            MethodDecl::public("__construct")
                .param(Param::typed(class, property))
                .stmt(Stmt::expr(Expr::this_prop(property).assign(Expr::var(property)))),
        );
}

/// `find<Aggregate>(string $id): ?<State>` over the document store.
fn finder(
    ctx: &GenContext,
    aggregate: &Vertex,
    location: &ClassLocation,
    state: &ClassLocation,
) -> Result<(ChangeSet, String), CodegenError> {
    let naming = ctx.naming();
    let id = identifier(ctx, aggregate);
    let collection = naming
        .store_state
        .as_ref()
        .map(|store| store.apply(&aggregate.name))
        .unwrap_or_default();
    let method = naming.finder_method.apply(&aggregate.name);

    let mut set = ChangeSet::new(&location.namespace, ClassSpec::final_class(&location.class_name));
    set.import(UseImport::class(framework::DOCUMENT_STORE));
    if state.namespace != location.namespace {
        set.import(UseImport::class(state.fqcn()));
    }
    constructor_injected(&mut set, framework::short(framework::DOCUMENT_STORE), "documentStore");
    set.method(
        MethodDecl::public(&method)
            .param(Param::typed("string", &id))
            .returns(format!("?{}", state.class_name))
            .stmt(Stmt::expr(Expr::var("document").assign(
                Expr::this_prop("documentStore").method("getDoc", vec![Expr::string(collection), Expr::var(&id)]),
            )))
            .stmt(Stmt::ret(Expr::Raw(format!(
                "$document === null ? null : {}::fromArray($document)",
                state.class_name
            )))),
    );
    Ok((set, method))
}

/// Generates the artifacts of the query on one document.
///
/// Returns nothing for documents without a query schema.
pub fn generate_query(ctx: &GenContext, document: &Vertex) -> Result<Vec<Artifact>, CodegenError> {
    if !document.is(VertexKind::Document) {
        return Err(document.shape_error("Document", document.kind.as_str()));
    }
    let Some(type_set) = document.query_type_set() else {
        return Ok(Vec::new());
    };
    let resolver = &ctx.resolver;
    let layout = resolver.layout;
    let name = query_name(ctx, document);
    let class_name = ctx.naming().class_name.apply(&name);
    let message = ctx.naming().parameter_name.apply(&name);
    let mut artifacts = Vec::new();

    // request record
    let request = resolver.locate_in(&layout.query_dir, &class_name)?;
    let object = type_set
        .root_object()
        .map_err(|actual| document.shape_error("ObjectType", actual))?;
    let (plans, _) = plan_properties(ctx, document, type_set, object, Nesting::Arrays)?;
    let mut set = ChangeSet::new(&request.namespace, ClassSpec::final_class(&request.class_name));
    immutable_record(&mut set);
    record_members(&mut set, &plans);
    artifacts.push(Artifact::code(format!("Query\\{}", class_name), &request, set));

    // resolver, backed by a finder when the state is stored
    let document_class = resolver.class_name(document);
    let location = resolver.locate_in(&layout.resolver_dir, &format!("{}Resolver", document_class))?;
    let mut set = ChangeSet::new(&location.namespace, ClassSpec::final_class(&location.class_name));
    set.import(UseImport::class(framework::RESOLVER))
        .import(UseImport::class(framework::MESSAGE))
        .implements(framework::short(framework::RESOLVER));
    let resolve = MethodDecl::public("resolve").param(Param::typed(framework::short(framework::MESSAGE), &message));

    match stored_aggregate(ctx, document) {
        Some((aggregate, _)) => {
            let state = resolver.state_class(aggregate)?;
            let finder_location = resolver.locate_in(
                &layout.finder_dir,
                &format!("{}Finder", resolver.class_name(aggregate)),
            )?;
            let (finder_set, method) = finder(ctx, aggregate, &finder_location, &state)?;

            set.import(UseImport::class(finder_location.fqcn()))
                .import(UseImport::class(state.fqcn()));
            constructor_injected(&mut set, &finder_location.class_name, "finder");
            set.method(
                resolve.returns(format!("?{}", state.class_name)).stmt(Stmt::ret(
                    Expr::this_prop("finder").method(
                        &method,
                        vec![Expr::var(&message).method("get", vec![Expr::string(identifier(ctx, aggregate))])],
                    ),
                )),
            );
            artifacts.push(Artifact::code(
                format!("Resolver\\{}", location.class_name),
                &location,
                set,
            ));
            artifacts.push(Artifact::code(
                format!("Finder\\{}", finder_location.class_name),
                &finder_location,
                finder_set,
            ));
        }
        None => {
            set.method(resolve.returns("array").stmt(Stmt::ret(Expr::list(vec![]))));
            artifacts.push(Artifact::code(
                format!("Resolver\\{}", location.class_name),
                &location,
                set,
            ));
        }
    }

    artifacts.push(api::query_description(ctx, document, &name, &location)?);
    Ok(artifacts)
}
