//! One generation run over a graph.
//!
//! Artifacts are collected in graph order (aggregates, commands, events,
//! documents), grouped by file, merged into the existing sources and printed.
//! A failing artifact is reported and skipped; the rest of the run goes on.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::diagnostic::CodegenError;
use crate::generator::{
    aggregate, api, message, query, schema_file, state, value_object, Artifact, ArtifactContent, GenContext,
};
use crate::graph::{EventSourcingGraph, VertexKind};
use crate::merge::{ChangeSet, MergeEngine};
use crate::naming::NameResolver;
use crate::php::{parse_source, print, SourceTree};
use crate::store::SourceStore;

/// What a run did to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Created,
    Updated,
    Unchanged,
}

/// One generated file.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    /// Project-relative path.
    pub filename: PathBuf,
    pub code: String,
    pub status: FileStatus,
}

/// Generated files by logical name, in generation order.
pub type GeneratedFiles = IndexMap<String, GeneratedFile>;

/// Result of a run: every file that could be generated, and every error of
/// the artifacts or changes that could not.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub files: GeneratedFiles,
    pub errors: Vec<CodegenError>,
}

impl GenerationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn changed(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.files.values().filter(|f| f.status != FileStatus::Unchanged)
    }
}

/// Everything headed for one file.
#[derive(Debug)]
enum FileContent {
    Code(Vec<ChangeSet>),
    Verbatim(String),
}

#[derive(Debug)]
struct FileGroup {
    logical_name: String,
    content: FileContent,
}

/// Artifacts grouped by file, in first-seen order.
#[derive(Debug, Default)]
struct FilePlan {
    groups: IndexMap<PathBuf, FileGroup>,
}

impl FilePlan {
    /// Adds an artifact to its file.
    ///
    /// Code artifacts share a file only when they are parts of the same
    /// logical unit describing the same class (the api classes, a finder used
    /// by several resolvers); verbatim files only when their content is
    /// identical.
    fn add(&mut self, artifact: Artifact) -> Result<(), CodegenError> {
        let Some(group) = self.groups.get_mut(&artifact.path) else {
            let content = match artifact.content {
                ArtifactContent::Code(set) => FileContent::Code(vec![set]),
                ArtifactContent::Verbatim(text) => FileContent::Verbatim(text),
            };
            self.groups.insert(
                artifact.path,
                FileGroup {
                    logical_name: artifact.logical_name,
                    content,
                },
            );
            return Ok(());
        };

        let same_unit = group.logical_name == artifact.logical_name;
        let shareable = match (&mut group.content, &artifact.content) {
            (FileContent::Code(sets), ArtifactContent::Code(set)) => {
                let same_class = same_unit && sets.first().is_some_and(|first| first.targets_same_class(set));
                if same_class {
                    sets.push(set.clone());
                }
                same_class
            }
            (FileContent::Verbatim(existing), ArtifactContent::Verbatim(text)) => existing == text,
            _ => false,
        };
        if shareable {
            Ok(())
        } else {
            Err(CodegenError::FilenameCollision {
                filename: artifact.path.display().to_string(),
                first: group.logical_name.clone(),
                second: artifact.logical_name,
            })
        }
    }
}

/// Runs the generators and the merge engine.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
    engine: MergeEngine,
}

impl Generator {
    /// Creates a generator, rejecting invalid configuration up front.
    pub fn new(config: GeneratorConfig) -> Result<Self, CodegenError> {
        config.validate()?;
        let engine = MergeEngine::new(config.merge_policy, config.strict_types);
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Every artifact of the graph, plus the errors of the ones that failed.
    pub fn artifacts(&self, graph: &EventSourcingGraph) -> (Vec<Artifact>, Vec<CodegenError>) {
        let resolver = NameResolver::new(&self.config.layout, &self.config.psr4, &self.config.naming, graph);
        let ctx = GenContext::new(resolver, self.config.state_flavor);
        let mut artifacts = Vec::new();
        let mut errors = Vec::new();
        let mut collect = |vertex: &str, result: Result<Vec<Artifact>, CodegenError>| match result {
            Ok(generated) => artifacts.extend(generated),
            Err(error) => {
                warn!(vertex, error = %error, "Skipping artifact");
                errors.push(error);
            }
        };

        for (id, vertex) in graph.vertex_map().iter().filter(|(_, v)| v.is(VertexKind::Aggregate)) {
            let connection = match graph.aggregate_connection(id) {
                Ok(connection) => connection,
                Err(error) => {
                    collect(&vertex.name, Err(error));
                    continue;
                }
            };
            collect(&vertex.name, aggregate::generate_behaviour(&ctx, &connection).map(|a| vec![a]));
            collect(&vertex.name, state::generate_state(&ctx, &connection).map(|a| vec![a]));
            collect(&vertex.name, api::aggregate_description(&ctx, &connection).map(|a| vec![a]));
        }

        for vertex in graph.command_map().values().chain(graph.event_map().values()) {
            collect(&vertex.name, message::generate_message(&ctx, vertex).map(|a| vec![a]));
            collect(&vertex.name, api::message_description(&ctx, vertex).map(|a| vec![a]));
            collect(&vertex.name, schema_file::generate_schema_files(&ctx, vertex));
        }

        for vertex in graph.document_map().values() {
            collect(&vertex.name, value_object::generate_value_objects(&ctx, vertex));
            collect(&vertex.name, query::generate_query(&ctx, vertex));
            collect(&vertex.name, schema_file::generate_schema_files(&ctx, vertex));
        }

        (artifacts, errors)
    }

    /// Generates every file of the graph against the existing sources.
    pub fn generate(&self, graph: &EventSourcingGraph, store: &dyn SourceStore) -> GenerationReport {
        let (artifacts, mut errors) = self.artifacts(graph);

        let mut plan = FilePlan::default();
        for artifact in artifacts {
            if let Err(error) = plan.add(artifact) {
                warn!(error = %error, "Skipping artifact");
                errors.push(error);
            }
        }

        let mut files = GeneratedFiles::new();
        for (path, group) in plan.groups {
            match self.render(&path, &group.content, store) {
                Ok((code, status, mut issues)) => {
                    errors.append(&mut issues);
                    debug!(file = %path.display(), ?status, "Rendered");
                    let key = if files.contains_key(&group.logical_name) {
                        format!("{} ({})", group.logical_name, path.display())
                    } else {
                        group.logical_name
                    };
                    files.insert(
                        key,
                        GeneratedFile {
                            filename: path,
                            code,
                            status,
                        },
                    );
                }
                Err(error) => {
                    warn!(file = %path.display(), error = %error, "Leaving file untouched");
                    errors.push(error);
                }
            }
        }

        info!(files = files.len(), errors = errors.len(), "Generation finished");
        GenerationReport { files, errors }
    }

    /// Merges or passes through one file.
    ///
    /// Changes that could not be applied are returned next to the code; the
    /// file keeps every change that did apply. An existing file that gains
    /// nothing, or whose change sets were rejected, is returned as read. Only
    /// an unreadable or unparsable existing file fails as a whole.
    fn render(
        &self,
        path: &Path,
        content: &FileContent,
        store: &dyn SourceStore,
    ) -> Result<(String, FileStatus, Vec<CodegenError>), CodegenError> {
        let existing = store.read(path)?;
        let (code, issues) = match content {
            FileContent::Verbatim(text) => (text.clone(), Vec::new()),
            FileContent::Code(sets) => {
                let tree = match &existing {
                    Some(source) => parse_source(source, path)?,
                    None => SourceTree::new(),
                };
                let outcome = self.engine.merge_all(tree, sets);
                for issue in &outcome.issues {
                    warn!(file = %path.display(), error = %issue, "Change not applied");
                }
                match &existing {
                    // nothing to add, or the file belongs to someone else
                    Some(source) if !outcome.applied || !outcome.modified => (source.clone(), outcome.issues),
                    _ => (print(&outcome.tree), outcome.issues),
                }
            }
        };
        let status = match existing.as_deref() {
            None => FileStatus::Created,
            Some(old) if old == code => FileStatus::Unchanged,
            Some(_) => FileStatus::Updated,
        };
        Ok((code, status, issues))
    }
}

/// Writes every created or updated file below `root`.
///
/// Returns the number of files written.
pub fn write_files(root: &Path, files: &GeneratedFiles) -> Result<usize, CodegenError> {
    let mut written = 0;
    for file in files.values().filter(|f| f.status != FileStatus::Unchanged) {
        let path = root.join(&file.filename);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CodegenError::io(parent, e.to_string()))?;
        }
        std::fs::write(&path, &file.code).map_err(|e| CodegenError::io(&path, e.to_string()))?;
        debug!(file = %path.display(), "Written");
        written += 1;
    }
    Ok(written)
}
