//! # esgen compiler
//!
//! Turns an event-sourcing domain graph (aggregates, commands, events,
//! documents) into the PHP skeleton of an event-engine application, and keeps
//! that skeleton in sync with the model without touching hand-written code.
//!
//! ## Architecture
//!
//! ```text
//!   Graph JSON
//!        │
//!        ▼
//! ┌──────────────┐
//! │    Graph     │  Typed vertices, connections, schemas
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │  Generators  │  Vertex → ChangeSet (declarative, per class)
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │    Merge     │  Existing tree + ChangeSets → tree (idempotent)
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Printer    │  Tree → PHP source
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use esgen_compiler::{EventSourcingGraph, FsSourceStore, Generator, GeneratorConfig, Psr4Map};
//!
//! let graph = EventSourcingGraph::from_json(&std::fs::read_to_string("model.json")?)?;
//! let config = GeneratorConfig::new(Psr4Map::new().with("App\\", "src"));
//! let generator = Generator::new(config)?;
//!
//! let report = generator.generate(&graph, &FsSourceStore::new("."));
//! esgen_compiler::write_files(Path::new("."), &report.files)?;
//! ```

pub mod config;
pub mod diagnostic;
pub mod generator;
pub mod graph;
pub mod merge;
pub mod naming;
pub mod orchestrator;
pub mod php;
pub mod store;
pub mod types;

pub use config::{ConfigFile, GeneratorConfig, CONFIG_FILE};
pub use diagnostic::CodegenError;
pub use generator::StateFlavor;
pub use graph::{EventSourcingGraph, Vertex, VertexId, VertexKind};
pub use merge::{ChangeSet, MergeEngine, MergePolicy};
pub use naming::{Layout, NamingStrategies, Psr4Map};
pub use orchestrator::{write_files, FileStatus, GeneratedFile, GeneratedFiles, GenerationReport, Generator};
pub use store::{FsSourceStore, MemorySourceStore, SourceStore};
