//! Artifact generators.
//!
//! Every generator is a pure function of the graph, the name resolver and the
//! typed property model. It never reads or edits a file: it returns
//! [`Artifact`]s, each describing one class as a [`ChangeSet`] or one
//! pass-through file. Merging into existing sources happens later, in the
//! orchestrator.
//!
//! A generator either returns all artifacts of its vertex or an error; it never
//! emits a partial set.

pub mod aggregate;
pub mod api;
pub mod framework;
pub mod message;
mod php_type;
pub mod query;
pub mod schema_file;
pub mod state;
pub mod value_object;

use std::path::{Path, PathBuf};

use crate::graph::{EventSourcingGraph, Vertex, VertexId};
use crate::merge::ChangeSet;
use crate::naming::{ClassLocation, NameResolver, NamingStrategies};

pub use state::StateFlavor;

/// What a generated file is made of.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactContent {
    /// A class, merged into the existing file.
    Code(ChangeSet),
    /// A file written as is (schema sidecars).
    Verbatim(String),
}

/// One generated logical unit of code.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Key of the artifact in the generated-files map (`Building`,
    /// `ADD_BUILDING`, `Api\Command`, ...).
    pub logical_name: String,
    /// Project-relative file path.
    pub path: PathBuf,
    pub content: ArtifactContent,
}

impl Artifact {
    pub fn code(logical_name: impl Into<String>, location: &ClassLocation, set: ChangeSet) -> Self {
        Self {
            logical_name: logical_name.into(),
            path: location.path.clone(),
            content: ArtifactContent::Code(set),
        }
    }

    pub fn verbatim(logical_name: impl Into<String>, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            path: path.as_ref().to_path_buf(),
            content: ArtifactContent::Verbatim(text.into()),
        }
    }

    pub fn change_set(&self) -> Option<&ChangeSet> {
        match &self.content {
            ArtifactContent::Code(set) => Some(set),
            ArtifactContent::Verbatim(_) => None,
        }
    }
}

/// Everything a generator needs besides its vertex.
#[derive(Debug, Clone, Copy)]
pub struct GenContext<'a> {
    pub resolver: NameResolver<'a>,
    pub state_flavor: StateFlavor,
}

impl<'a> GenContext<'a> {
    pub fn new(resolver: NameResolver<'a>, state_flavor: StateFlavor) -> Self {
        Self { resolver, state_flavor }
    }

    pub fn graph(&self) -> &'a EventSourcingGraph {
        self.resolver.graph
    }

    pub fn naming(&self) -> &'a NamingStrategies {
        self.resolver.naming
    }

    /// Looks up a vertex the graph guarantees to exist.
    pub(crate) fn vertex(&self, id: &VertexId) -> Option<&'a Vertex> {
        self.resolver.graph.vertex(id)
    }
}

/// Location of a class generated next to another one.
pub(crate) fn sibling(location: &ClassLocation, class_name: &str) -> ClassLocation {
    let dir = location.path.parent().map(Path::to_path_buf).unwrap_or_default();
    ClassLocation {
        namespace: location.namespace.clone(),
        class_name: class_name.to_string(),
        path: dir.join(format!("{}.php", class_name)),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::json;

    use crate::graph::EventSourcingGraph;
    use crate::naming::{Layout, Psr4Map};

    /// Building aggregate with one creating and one modifying command.
    pub fn building_graph() -> EventSourcingGraph {
        let doc = json!({
            "nodes": [
                { "id": "a1", "name": "Building", "type": "aggregate", "targets": ["e1", "e2"] },
                { "id": "c1", "name": "Add Building", "type": "command", "targets": ["a1", "e1"],
                  "metadata": {
                      "newAggregate": true,
                      "schema": {
                          "type": "object",
                          "properties": {
                              "buildingId": { "type": "string", "format": "uuid" },
                              "name": { "type": "string" }
                          },
                          "required": ["buildingId", "name"]
                      }
                  } },
                { "id": "c2", "name": "Rename Building", "type": "command", "targets": ["a1", "e2"] },
                { "id": "e1", "name": "Building Added", "type": "event",
                  "metadata": { "schema": { "type": "object", "properties": { "buildingId": { "type": "string" } } } } },
                { "id": "e2", "name": "Building Renamed", "type": "event" },
                { "id": "d1", "name": "Building", "type": "document", "sources": ["a1"],
                  "metadata": {
                      "aggregateState": true,
                      "schema": {
                          "type": "object",
                          "properties": {
                              "buildingId": { "type": "string" },
                              "name": { "type": "string" },
                              "address": { "$ref": "#/definitions/Address" }
                          },
                          "required": ["buildingId", "name"]
                      }
                  } },
                { "id": "d2", "name": "Address", "type": "document",
                  "metadata": {
                      "schema": {
                          "type": "object",
                          "properties": {
                              "street": { "type": "string" },
                              "zip": { "type": ["string", "null"] }
                          },
                          "required": ["street", "zip"]
                      }
                  } }
            ]
        });
        EventSourcingGraph::from_json(&doc.to_string()).unwrap()
    }

    pub fn psr4() -> Psr4Map {
        Psr4Map::new().with("App\\", "src")
    }

    pub fn layout() -> Layout {
        Layout::default()
    }
}
