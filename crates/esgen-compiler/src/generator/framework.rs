//! Class names of the event-engine framework the generated code targets.

pub const MESSAGE: &str = "EventEngine\\Messaging\\Message";
pub const EVENT_ENGINE: &str = "EventEngine\\EventEngine";
pub const EVENT_ENGINE_DESCRIPTION: &str = "EventEngine\\EventEngineDescription";
pub const IMMUTABLE_RECORD: &str = "EventEngine\\Data\\ImmutableRecord";
pub const IMMUTABLE_RECORD_LOGIC: &str = "EventEngine\\Data\\ImmutableRecordLogic";
pub const JSON_SCHEMA: &str = "EventEngine\\JsonSchema\\JsonSchema";
pub const JSON_SCHEMA_ARRAY: &str = "EventEngine\\JsonSchema\\JsonSchemaArray";
pub const RESOLVER: &str = "EventEngine\\Querying\\Resolver";
pub const DOCUMENT_STORE: &str = "EventEngine\\DocumentStore\\DocumentStore";
pub const GENERATOR: &str = "Generator";

/// Local alias of the aggregate state class inside behaviour classes.
pub const STATE_ALIAS: &str = "State";

/// Api description class names.
pub const API_AGGREGATE: &str = "Aggregate";
pub const API_COMMAND: &str = "Command";
pub const API_EVENT: &str = "Event";
pub const API_QUERY: &str = "Query";

/// Last segment of a fully qualified class name.
pub fn short(fqcn: &str) -> &str {
    fqcn.rsplit('\\').next().unwrap_or(fqcn)
}
