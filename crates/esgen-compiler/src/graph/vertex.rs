//! Typed graph vertices.

use std::fmt;
use serde::Serialize;

use super::metadata::Metadata;
use crate::diagnostic::CodegenError;

/// Stable identifier of a vertex inside one graph document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VertexId(String);

impl VertexId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VertexId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The closed set of element kinds a domain graph can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VertexKind {
    Aggregate,
    Command,
    Event,
    Document,
    Feature,
    BoundedContext,
    Policy,
    Role,
    Ui,
    HotSpot,
    ExternalSystem,
}

impl VertexKind {
    /// Parses the `type` field of a graph node.
    ///
    /// Matching ignores case and the `-`/`_` separators so that `boundedContext`,
    /// `bounded-context` and `BOUNDED_CONTEXT` are the same kind.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .chars()
            .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
            .flat_map(|c| c.to_lowercase())
            .collect();

        let kind = match normalized.as_str() {
            "aggregate" => Self::Aggregate,
            "command" => Self::Command,
            "event" => Self::Event,
            "document" => Self::Document,
            "feature" => Self::Feature,
            "boundedcontext" => Self::BoundedContext,
            "policy" => Self::Policy,
            "role" => Self::Role,
            "ui" => Self::Ui,
            "hotspot" => Self::HotSpot,
            "externalsystem" => Self::ExternalSystem,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aggregate => "Aggregate",
            Self::Command => "Command",
            Self::Event => "Event",
            Self::Document => "Document",
            Self::Feature => "Feature",
            Self::BoundedContext => "BoundedContext",
            Self::Policy => "Policy",
            Self::Role => "Role",
            Self::Ui => "UI",
            Self::HotSpot => "HotSpot",
            Self::ExternalSystem => "ExternalSystem",
        }
    }
}

impl fmt::Display for VertexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed node of the domain graph.
///
/// Vertices are immutable once the graph is loaded. Kind-specific behaviour is
/// reached through the capability traits in [`super::metadata`], which read the
/// optional metadata instead of relying on a type hierarchy.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: VertexId,
    /// The label as drawn in the model.
    pub label: String,
    /// The label with whitespace collapsed and trimmed.
    pub name: String,
    pub kind: VertexKind,
    pub metadata: Option<Metadata>,
    pub parent: Option<VertexId>,
}

impl Vertex {
    pub fn new(id: impl Into<VertexId>, label: impl Into<String>, kind: VertexKind) -> Self {
        let label = label.into();
        Self {
            id: id.into(),
            name: normalize_label(&label),
            label,
            kind,
            metadata: None,
            parent: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn is(&self, kind: VertexKind) -> bool {
        self.kind == kind
    }

    /// Builds a schema-shape error pointing at this vertex.
    pub fn shape_error(&self, expected: impl Into<String>, actual: impl Into<String>) -> CodegenError {
        CodegenError::SchemaShape {
            kind: self.kind,
            name: self.name.clone(),
            id: self.id.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Builds a missing-aggregate error pointing at this vertex.
    pub fn missing_aggregate(&self) -> CodegenError {
        CodegenError::MissingAggregateConnection {
            kind: self.kind,
            name: self.name.clone(),
            id: self.id.to_string(),
        }
    }
}

impl From<String> for VertexId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Collapses runs of whitespace (including line breaks from sticky notes).
pub fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_variants() {
        assert_eq!(VertexKind::parse("aggregate"), Some(VertexKind::Aggregate));
        assert_eq!(VertexKind::parse("boundedContext"), Some(VertexKind::BoundedContext));
        assert_eq!(VertexKind::parse("hot-spot"), Some(VertexKind::HotSpot));
        assert_eq!(VertexKind::parse("EXTERNAL_SYSTEM"), Some(VertexKind::ExternalSystem));
        assert_eq!(VertexKind::parse("sticky"), None);
    }

    #[test]
    fn normalizes_labels() {
        assert_eq!(normalize_label("  Add\n Building "), "Add Building");
        let vertex = Vertex::new("c1", "Add\nBuilding", VertexKind::Command);
        assert_eq!(vertex.name, "Add Building");
        assert_eq!(vertex.label, "Add\nBuilding");
    }
}
