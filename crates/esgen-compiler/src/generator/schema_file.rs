//! JSON schema sidecar files, loaded by the api classes via
//! `JsonSchemaArray::fromFile()`.

use serde_json::Value;

use super::query::query_name;
use super::{Artifact, GenContext};
use crate::diagnostic::CodegenError;
use crate::graph::{HasQuery, HasSchema, Vertex, VertexKind};

fn pretty(schema: &Value) -> Result<String, CodegenError> {
    serde_json::to_string_pretty(schema)
        .map(|mut text| {
            text.push('\n');
            text
        })
        .map_err(|e| CodegenError::InvalidSchema { message: e.to_string() })
}

fn sidecar(ctx: &GenContext, name: &str, schema: &Value) -> Result<Artifact, CodegenError> {
    Ok(Artifact::verbatim(
        format!("Schema\\{}", name),
        ctx.resolver.schema_file(name),
        pretty(schema)?,
    ))
}

/// Sidecar files of one vertex.
///
/// Commands and events are named after their message name, documents after
/// their class and query requests after the query.
pub fn generate_schema_files(ctx: &GenContext, vertex: &Vertex) -> Result<Vec<Artifact>, CodegenError> {
    let mut files = Vec::new();
    match vertex.kind {
        VertexKind::Command | VertexKind::Event => {
            if let Some(schema) = vertex.schema() {
                files.push(sidecar(ctx, &ctx.resolver.constant_value(vertex), schema)?);
            }
        }
        VertexKind::Document => {
            if let Some(schema) = vertex.schema() {
                files.push(sidecar(ctx, &ctx.resolver.class_name(vertex), schema)?);
            }
            if let Some(query) = vertex.query_schema() {
                files.push(sidecar(ctx, &query_name(ctx, vertex), query)?);
            }
        }
        _ => {}
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{fixtures, ArtifactContent, StateFlavor};
    use crate::graph::VertexId;
    use crate::naming::{NameResolver, NamingStrategies};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn files(id: &str) -> Vec<Artifact> {
        let (graph, psr4, layout, naming) = (
            fixtures::building_graph(),
            fixtures::psr4(),
            fixtures::layout(),
            NamingStrategies::conventional(),
        );
        let ctx = GenContext::new(NameResolver::new(&layout, &psr4, &naming, &graph), StateFlavor::default());
        generate_schema_files(&ctx, graph.vertex(&VertexId::from(id)).unwrap()).unwrap()
    }

    #[test]
    fn command_schema_is_pretty_printed() {
        let files = files("c1");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("src/Domain/Api/_schema/AddBuilding.json"));
        let ArtifactContent::Verbatim(text) = &files[0].content else {
            panic!("expected a verbatim file");
        };
        assert!(text.starts_with("{\n  \"type\": \"object\",\n  \"properties\": {\n    \"buildingId\""));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn document_schema_named_after_class() {
        let files = files("d2");
        assert_eq!(files[0].logical_name, "Schema\\Address");
        assert_eq!(files[0].path, PathBuf::from("src/Domain/Api/_schema/Address.json"));
    }

    #[test]
    fn no_schema_no_file() {
        assert!(files("e2").is_empty());
        assert!(files("a1").is_empty());
    }
}
