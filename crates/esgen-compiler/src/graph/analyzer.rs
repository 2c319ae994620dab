//! Event-sourcing analysis of a loaded domain graph.
//!
//! The graph is an immutable snapshot: every back-reference (aggregate of a
//! command, state document of an aggregate) is an explicit lookup by id that
//! returns an `Option`.

use std::collections::HashSet;
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use serde_json::Value;

use super::metadata::{HasSchema, Metadata};
use super::vertex::{Vertex, VertexId, VertexKind};
use crate::diagnostic::CodegenError;
use crate::types::Definitions;

/// Raw graph document as read from JSON.
#[derive(Debug, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeDocument>,
}

/// Raw node of a graph document.
#[derive(Debug, Deserialize)]
pub struct NodeDocument {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub parent: Option<String>,
}

/// Edges attached to one identity vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub identity: VertexId,
    /// Vertices with an edge pointing at the identity.
    pub from: Vec<VertexId>,
    /// Vertices the identity points at.
    pub to: Vec<VertexId>,
}

/// An aggregate with its commands and the events each command records.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateConnection {
    pub aggregate: VertexId,
    /// Command → events, in graph order. Never empty per command.
    pub commands: IndexMap<VertexId, Vec<VertexId>>,
    /// Every event recorded by any command, deduplicated, in order.
    pub events: Vec<VertexId>,
    pub state_document: Option<VertexId>,
}

/// The analyzed graph.
#[derive(Debug, Clone, Default)]
pub struct EventSourcingGraph {
    vertices: IndexMap<VertexId, Vertex>,
    outgoing: IndexMap<VertexId, IndexSet<VertexId>>,
    incoming: IndexMap<VertexId, IndexSet<VertexId>>,
    definitions: Definitions,
}

impl EventSourcingGraph {
    /// Parses a JSON graph document.
    pub fn from_json(source: &str) -> Result<Self, CodegenError> {
        let document: GraphDocument = serde_json::from_str(source).map_err(|e| CodegenError::GraphParse {
            message: e.to_string(),
        })?;
        Self::from_document(document)
    }

    pub fn from_document(document: GraphDocument) -> Result<Self, CodegenError> {
        let mut vertices = Vec::with_capacity(document.nodes.len());
        let mut edges = Vec::new();

        for node in document.nodes {
            let kind = VertexKind::parse(&node.kind).ok_or_else(|| CodegenError::UnknownVertexType {
                kind: node.kind.clone(),
                name: node.name.clone(),
                id: node.id.clone(),
            })?;
            let mut vertex = Vertex::new(node.id.as_str(), node.name.as_str(), kind);
            if let Some(raw) = &node.metadata {
                vertex.metadata = Some(Metadata::parse(raw, kind, &vertex.name, &node.id)?);
            }
            vertex.parent = node.parent.map(VertexId::new);

            for source in node.sources {
                edges.push((VertexId::new(source), vertex.id.clone()));
            }
            for target in node.targets {
                edges.push((vertex.id.clone(), VertexId::new(target)));
            }
            vertices.push(vertex);
        }

        Self::from_parts(vertices, edges)
    }

    /// Builds a graph from already typed vertices and directed edges.
    pub fn from_parts(vertices: Vec<Vertex>, edges: Vec<(VertexId, VertexId)>) -> Result<Self, CodegenError> {
        let mut graph = Self::default();
        for vertex in vertices {
            if graph.vertices.contains_key(&vertex.id) {
                return Err(CodegenError::DuplicateVertex {
                    id: vertex.id.to_string(),
                });
            }
            graph.outgoing.insert(vertex.id.clone(), IndexSet::new());
            graph.incoming.insert(vertex.id.clone(), IndexSet::new());
            graph.vertices.insert(vertex.id.clone(), vertex);
        }

        for (from, to) in edges {
            for id in [&from, &to] {
                if !graph.vertices.contains_key(id) {
                    return Err(CodegenError::UnknownVertex { id: id.to_string() });
                }
            }
            if let Some(out) = graph.outgoing.get_mut(&from) {
                out.insert(to.clone());
            }
            if let Some(inc) = graph.incoming.get_mut(&to) {
                inc.insert(from);
            }
        }

        let mut definitions = Definitions::new();
        for vertex in graph.vertices.values().filter(|v| v.is(VertexKind::Document)) {
            if let Some(schema) = vertex.schema() {
                let name: String = crate::naming::case::to_pascal_case(&vertex.name);
                definitions.insert(name, schema.clone())?;
            }
        }
        graph.definitions = definitions;

        Ok(graph)
    }

    pub fn vertex_map(&self) -> &IndexMap<VertexId, Vertex> {
        &self.vertices
    }

    pub fn vertex(&self, id: &VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    /// Graph-wide schema definitions (one per document with a schema).
    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn connection(&self, id: &VertexId) -> Option<Connection> {
        let from = self.incoming.get(id)?;
        let to = self.outgoing.get(id)?;
        Some(Connection {
            identity: id.clone(),
            from: from.iter().cloned().collect(),
            to: to.iter().cloned().collect(),
        })
    }

    fn of_kind(&self, kind: VertexKind) -> IndexMap<VertexId, &Vertex> {
        self.vertices
            .iter()
            .filter(|(_, v)| v.is(kind))
            .map(|(id, v)| (id.clone(), v))
            .collect()
    }

    pub fn command_map(&self) -> IndexMap<VertexId, &Vertex> {
        self.of_kind(VertexKind::Command)
    }

    pub fn event_map(&self) -> IndexMap<VertexId, &Vertex> {
        self.of_kind(VertexKind::Event)
    }

    pub fn document_map(&self) -> IndexMap<VertexId, &Vertex> {
        self.of_kind(VertexKind::Document)
    }

    /// Neighbours of a vertex in both directions, outgoing first, deduplicated.
    fn neighbours(&self, id: &VertexId) -> Vec<&Vertex> {
        let mut seen = HashSet::new();
        let out = self.outgoing.get(id).into_iter().flatten();
        let inc = self.incoming.get(id).into_iter().flatten();
        out.chain(inc)
            .filter(|n| seen.insert((*n).clone()))
            .filter_map(|n| self.vertices.get(n))
            .collect()
    }

    fn targets_of_kind(&self, id: &VertexId, kind: VertexKind) -> Vec<VertexId> {
        self.outgoing
            .get(id)
            .into_iter()
            .flatten()
            .filter(|t| self.vertices.get(*t).is_some_and(|v| v.is(kind)))
            .cloned()
            .collect()
    }

    /// Builds the connection of one aggregate.
    pub fn aggregate_connection(&self, aggregate_id: &VertexId) -> Result<AggregateConnection, CodegenError> {
        let aggregate = self
            .vertices
            .get(aggregate_id)
            .filter(|v| v.is(VertexKind::Aggregate))
            .ok_or_else(|| CodegenError::AggregateNotFound {
                name: aggregate_id.to_string(),
                id: aggregate_id.to_string(),
            })?;

        let aggregate_events = self.targets_of_kind(aggregate_id, VertexKind::Event);
        let mut commands = IndexMap::new();
        let mut events: Vec<VertexId> = Vec::new();

        for command in self.neighbours(aggregate_id).into_iter().filter(|v| v.is(VertexKind::Command)) {
            let direct = self.targets_of_kind(&command.id, VertexKind::Event);
            let recorded = if direct.is_empty() { aggregate_events.clone() } else { direct };
            if recorded.is_empty() {
                return Err(CodegenError::CommandWithoutEvent {
                    name: command.name.clone(),
                    id: command.id.to_string(),
                    aggregate: aggregate.name.clone(),
                });
            }
            for event in &recorded {
                if !events.contains(event) {
                    events.push(event.clone());
                }
            }
            commands.insert(command.id.clone(), recorded);
        }

        let state_document = self
            .neighbours(aggregate_id)
            .into_iter()
            .find(|v| v.is_aggregate_state())
            .map(|v| v.id.clone());

        Ok(AggregateConnection {
            aggregate: aggregate_id.clone(),
            commands,
            events,
            state_document,
        })
    }

    /// Every aggregate with its connection, in graph order.
    pub fn aggregate_map(&self) -> Result<IndexMap<VertexId, AggregateConnection>, CodegenError> {
        let mut map = IndexMap::new();
        for (id, vertex) in &self.vertices {
            if vertex.is(VertexKind::Aggregate) {
                map.insert(id.clone(), self.aggregate_connection(id)?);
            }
        }
        Ok(map)
    }

    /// The aggregate owning a command or event, if any.
    ///
    /// A command belongs to the aggregate it is connected to. An event belongs to
    /// the aggregate that records it, either directly or through one of the
    /// aggregate's commands.
    pub fn aggregate_for(&self, id: &VertexId) -> Option<&Vertex> {
        let vertex = self.vertices.get(id)?;
        match vertex.kind {
            VertexKind::Aggregate => Some(vertex),
            VertexKind::Command => self
                .neighbours(id)
                .into_iter()
                .find(|v| v.is(VertexKind::Aggregate)),
            VertexKind::Event => {
                if let Some(agg) = self.neighbours(id).into_iter().find(|v| v.is(VertexKind::Aggregate)) {
                    return Some(agg);
                }
                self.incoming
                    .get(id)
                    .into_iter()
                    .flatten()
                    .filter_map(|src| self.vertices.get(src))
                    .filter(|src| src.is(VertexKind::Command))
                    .find_map(|cmd| self.aggregate_for(&cmd.id))
            }
            VertexKind::Document if vertex.is_aggregate_state() => self
                .neighbours(id)
                .into_iter()
                .find(|v| v.is(VertexKind::Aggregate)),
            _ => None,
        }
    }

    /// Aggregate-state document linked to a query document, if any.
    pub fn state_document_for(&self, document_id: &VertexId) -> Option<&Vertex> {
        self.neighbours(document_id)
            .into_iter()
            .find(|v| v.id != *document_id && v.is_aggregate_state())
    }
}
