//! Generator error types.
#![allow(unused_assignments)]

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

use crate::graph::VertexKind;

/// Errors that can occur while generating or merging code.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum CodegenError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to access file '{}': {message}", path.display())]
    #[diagnostic(code(esgen::io::access_failed))]
    IoError {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Graph Consistency Errors
    // =========================================================================
    #[error("{kind} '{name}' ({id}) has no aggregate connection")]
    #[diagnostic(
        code(esgen::graph::missing_aggregate_connection),
        help("Connect the element to an aggregate, or disable the aggregate folder layout")
    )]
    MissingAggregateConnection {
        kind: VertexKind,
        name: String,
        id: String,
    },

    #[error("Aggregate '{name}' ({id}) not found in aggregate map")]
    #[diagnostic(code(esgen::graph::aggregate_not_found))]
    AggregateNotFound {
        name: String,
        id: String,
    },

    #[error("Command '{name}' ({id}) of aggregate '{aggregate}' does not record any event")]
    #[diagnostic(
        code(esgen::graph::command_without_event),
        help("Connect the command or its aggregate to at least one event")
    )]
    CommandWithoutEvent {
        name: String,
        id: String,
        aggregate: String,
    },

    #[error("Unknown vertex reference '{id}' in graph document")]
    #[diagnostic(code(esgen::graph::unknown_vertex))]
    UnknownVertex {
        id: String,
    },

    #[error("Duplicate vertex id '{id}' in graph document")]
    #[diagnostic(code(esgen::graph::duplicate_vertex))]
    DuplicateVertex {
        id: String,
    },

    #[error("Unknown vertex type '{kind}' for '{name}' ({id})")]
    #[diagnostic(code(esgen::graph::unknown_vertex_type))]
    UnknownVertexType {
        kind: String,
        name: String,
        id: String,
    },

    // =========================================================================
    // Schema Shape Errors
    // =========================================================================
    #[error("{kind} '{name}' ({id}): expected {expected}, got {actual}")]
    #[diagnostic(
        code(esgen::schema::unexpected_shape),
        help("Check the JSON schema attached to the element's metadata")
    )]
    SchemaShape {
        kind: VertexKind,
        name: String,
        id: String,
        expected: String,
        actual: String,
    },

    #[error("Unresolvable schema reference '{reference}'")]
    #[diagnostic(
        code(esgen::schema::unknown_reference),
        help("References must point to a local definition or to a document of the graph")
    )]
    UnknownReference {
        reference: String,
    },

    #[error("Invalid schema: {message}")]
    #[diagnostic(code(esgen::schema::invalid))]
    InvalidSchema {
        message: String,
    },

    // =========================================================================
    // Metadata Parsing Errors
    // =========================================================================
    #[error("Failed to parse metadata of {kind} '{name}' ({id}): {message}")]
    #[diagnostic(code(esgen::metadata::parse_failed))]
    MetadataParse {
        kind: VertexKind,
        name: String,
        id: String,
        message: String,
    },

    #[error("Failed to parse graph document: {message}")]
    #[diagnostic(code(esgen::metadata::graph_parse_failed))]
    GraphParse {
        message: String,
    },

    // =========================================================================
    // Source Parse Errors
    // =========================================================================
    #[error("Failed to initialize PHP parser")]
    #[diagnostic(code(esgen::parse::init_failed))]
    ParserInitFailed,

    #[error("Failed to parse file: {}", path.display())]
    #[diagnostic(code(esgen::parse::parse_failed))]
    ParseFailed {
        path: PathBuf,
    },

    #[error("Syntax error in {} at {line}:{column}", file.display())]
    #[diagnostic(
        code(esgen::parse::syntax_error),
        help("Fix the file by hand; it is left untouched until it parses again")
    )]
    SyntaxError {
        file: PathBuf,
        line: usize,
        column: usize,
    },

    // =========================================================================
    // Merge Target Errors
    // =========================================================================
    #[error("Target method '{method}' not found in class '{class}' for statement injection")]
    #[diagnostic(code(esgen::merge::target_method_not_found))]
    TargetMethodNotFound {
        class: String,
        method: String,
    },

    #[error("File declares class '{found}', expected '{expected}'")]
    #[diagnostic(
        code(esgen::merge::class_name_mismatch),
        help("Rename the class or move the file; generation never adds a second class")
    )]
    ClassNameMismatch {
        expected: String,
        found: String,
    },

    #[error("File declares namespace '{found}', expected '{expected}'")]
    #[diagnostic(code(esgen::merge::namespace_mismatch))]
    NamespaceMismatch {
        expected: String,
        found: String,
    },

    #[error("Cannot import '{import}' into class '{class}': '{existing}' is already imported under the same name")]
    #[diagnostic(
        code(esgen::merge::import_conflict),
        help("Alias or remove the existing import; generated code refers to the class by its short name")
    )]
    ImportConflict {
        class: String,
        import: String,
        existing: String,
    },

    #[error("Method '{method}' of class '{class}' has no array return to extend")]
    #[diagnostic(code(esgen::merge::class_map_not_found))]
    ClassMapNotFound {
        class: String,
        method: String,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(esgen::config::invalid))]
    Configuration {
        message: String,
    },

    #[error("No PSR-4 autoload prefix covers '{target}'")]
    #[diagnostic(
        code(esgen::config::no_autoload_prefix),
        help("Add a matching entry to autoload.psr-4 in composer.json")
    )]
    NoAutoloadPrefix {
        target: String,
    },

    #[error("'{first}' and '{second}' both resolve to file '{filename}'")]
    #[diagnostic(
        code(esgen::config::filename_collision),
        help("Rename one of the elements or give it a custom namespace")
    )]
    FilenameCollision {
        filename: String,
        first: String,
        second: String,
    },
}

impl CodegenError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
