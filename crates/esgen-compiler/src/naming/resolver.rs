//! Vertex → class name, namespace and file path.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use super::psr4::{slash_path, Psr4Map};
use super::strategies::NamingStrategies;
use crate::diagnostic::CodegenError;
use crate::graph::{EventSourcingGraph, Vertex, VertexKind};

/// Project directories the generated classes are placed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Aggregates live in `<model_dir>/<Aggregate>/`.
    pub model_dir: PathBuf,
    pub api_dir: PathBuf,
    pub value_object_dir: PathBuf,
    pub query_dir: PathBuf,
    pub resolver_dir: PathBuf,
    pub finder_dir: PathBuf,
    pub schema_dir: PathBuf,
    pub command_dir: Option<PathBuf>,
    pub event_dir: Option<PathBuf>,
    /// Place commands and events in the folder of their aggregate.
    pub aggregate_folder: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("src/Domain/Model"),
            api_dir: PathBuf::from("src/Domain/Api"),
            value_object_dir: PathBuf::from("src/Domain/Model/ValueObject"),
            query_dir: PathBuf::from("src/Domain/Query"),
            resolver_dir: PathBuf::from("src/Domain/Resolver"),
            finder_dir: PathBuf::from("src/Infrastructure/Finder"),
            schema_dir: PathBuf::from("src/Domain/Api/_schema"),
            command_dir: None,
            event_dir: None,
            aggregate_folder: false,
        }
    }
}

impl Layout {
    /// Rejects layouts with two competing rules for the same path.
    pub fn validate(&self) -> Result<(), CodegenError> {
        if self.aggregate_folder && (self.command_dir.is_some() || self.event_dir.is_some()) {
            return Err(CodegenError::config(
                "aggregate_folder cannot be combined with command_dir or event_dir",
            ));
        }
        Ok(())
    }
}

/// Where a class lives: namespace, short name and file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLocation {
    pub namespace: String,
    pub class_name: String,
    pub path: PathBuf,
}

impl ClassLocation {
    pub fn fqcn(&self) -> String {
        if self.namespace.is_empty() {
            self.class_name.clone()
        } else {
            format!("{}\\{}", self.namespace, self.class_name)
        }
    }
}

/// Derives identifiers and paths for graph vertices.
///
/// Every derivation is a pure function of the vertex, its position in the
/// graph and the configuration; repeated runs produce the same names.
#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'a> {
    pub layout: &'a Layout,
    pub psr4: &'a Psr4Map,
    pub naming: &'a NamingStrategies,
    pub graph: &'a EventSourcingGraph,
}

impl<'a> NameResolver<'a> {
    pub fn new(
        layout: &'a Layout,
        psr4: &'a Psr4Map,
        naming: &'a NamingStrategies,
        graph: &'a EventSourcingGraph,
    ) -> Self {
        Self {
            layout,
            psr4,
            naming,
            graph,
        }
    }

    pub fn class_name(&self, vertex: &Vertex) -> String {
        self.naming.class_name.apply(&vertex.name)
    }

    pub fn constant_name(&self, vertex: &Vertex) -> String {
        self.naming.constant_name.apply(&vertex.name)
    }

    /// Message name registered in the event engine (`AddBuilding`).
    pub fn constant_value(&self, vertex: &Vertex) -> String {
        self.naming.constant_value.apply(&vertex.name)
    }

    pub fn parameter_name(&self, vertex: &Vertex) -> String {
        self.naming.parameter_name.apply(&vertex.name)
    }

    /// Directory of the aggregate folder `<model_dir>/<Aggregate>`.
    pub fn aggregate_dir(&self, aggregate: &Vertex) -> PathBuf {
        self.layout.model_dir.join(self.class_name(aggregate))
    }

    /// Directory the class of a vertex is placed in.
    pub fn resolve_dir(&self, vertex: &Vertex) -> Result<PathBuf, CodegenError> {
        match vertex.kind {
            VertexKind::Aggregate => Ok(self.aggregate_dir(vertex)),
            VertexKind::Command | VertexKind::Event => {
                let (custom, folder) = if vertex.is(VertexKind::Command) {
                    (&self.layout.command_dir, "Command")
                } else {
                    (&self.layout.event_dir, "Event")
                };
                if self.layout.aggregate_folder {
                    let aggregate = self
                        .graph
                        .aggregate_for(&vertex.id)
                        .ok_or_else(|| vertex.missing_aggregate())?;
                    return Ok(self.aggregate_dir(aggregate).join(folder));
                }
                Ok(custom.clone().unwrap_or_else(|| self.layout.model_dir.join(folder)))
            }
            VertexKind::Document => match vertex.namespace_override() {
                Some(ns) if ns.starts_with('\\') => self.psr4.namespace_dir(ns, &self.naming.namespace_to_directory),
                Some(ns) => Ok(self
                    .layout
                    .value_object_dir
                    .join(self.naming.namespace_to_directory.apply(ns.trim_matches('\\')))),
                None => Ok(self.layout.value_object_dir.clone()),
            },
            other => Err(CodegenError::config(format!(
                "{} '{}' ({}) has no class layout",
                other, vertex.name, vertex.id
            ))),
        }
    }

    /// File path of the class generated for a vertex.
    pub fn resolve_path(&self, vertex: &Vertex) -> Result<PathBuf, CodegenError> {
        Ok(self.resolve_dir(vertex)?.join(format!("{}.php", self.class_name(vertex))))
    }

    /// Namespace and class name of the class generated for a vertex.
    pub fn resolve_fqcn(&self, vertex: &Vertex) -> Result<(String, String), CodegenError> {
        let location = self.locate(vertex)?;
        Ok((location.namespace, location.class_name))
    }

    pub fn locate(&self, vertex: &Vertex) -> Result<ClassLocation, CodegenError> {
        let dir = self.resolve_dir(vertex)?;
        let mut location = self.locate_in(&dir, &self.class_name(vertex))?;
        if let Some(ns) = vertex.namespace_override().filter(|ns| ns.starts_with('\\')) {
            location.namespace = ns.trim_matches('\\').to_string();
        }
        Ok(location)
    }

    /// Location of an arbitrary class in a project directory.
    pub fn locate_in(&self, dir: &Path, class_name: &str) -> Result<ClassLocation, CodegenError> {
        Ok(ClassLocation {
            namespace: self.psr4.namespace_for_dir(dir, &self.naming.directory_to_namespace)?,
            class_name: class_name.to_string(),
            path: dir.join(format!("{}.php", class_name)),
        })
    }

    /// The state class of an aggregate, next to its behaviour class.
    pub fn state_class(&self, aggregate: &Vertex) -> Result<ClassLocation, CodegenError> {
        let class_name = self.naming.state_class_name.apply(&aggregate.name);
        self.locate_in(&self.aggregate_dir(aggregate), &class_name)
    }

    /// One of the shared API description classes (`Aggregate`, `Command`, ...).
    pub fn api_class(&self, class_name: &str) -> Result<ClassLocation, CodegenError> {
        self.locate_in(&self.layout.api_dir, class_name)
    }

    pub fn schema_file(&self, name: &str) -> PathBuf {
        self.layout.schema_dir.join(format!("{}.json", name))
    }

    /// Path of the schema directory relative to the API directory, as used
    /// in `__DIR__ . '/_schema/'`.
    pub fn schema_path_from_api(&self) -> String {
        let relative = pathdiff::diff_paths(&self.layout.schema_dir, &self.layout.api_dir)
            .map(|p| slash_path(&p))
            .unwrap_or_default();
        if relative.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", relative)
        }
    }
}
