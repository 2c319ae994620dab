//! Read-only typed view of the domain graph.
//!
//! The generator never walks raw JSON: it asks this module for vertices of a
//! kind, for the connection of an identity vertex, or for the aggregate that
//! owns a command or event.

mod analyzer;
mod metadata;
mod vertex;

pub use analyzer::{AggregateConnection, Connection, EventSourcingGraph, GraphDocument, NodeDocument};
pub use metadata::{HasCustomData, HasQuery, HasSchema, HasTypeSet, Metadata};
pub use vertex::{normalize_label, Vertex, VertexId, VertexKind};
