//! End-to-end runs over the building model.

use std::path::Path;

use esgen_compiler::{
    write_files, CodegenError, ConfigFile, EventSourcingGraph, FileStatus, FsSourceStore, GenerationReport, Generator,
    GeneratorConfig, MemorySourceStore, SourceStore,
};
use pretty_assertions::assert_eq;

const MODEL: &str = include_str!("fixtures/building.json");

fn graph() -> EventSourcingGraph {
    EventSourcingGraph::from_json(MODEL).unwrap()
}

fn config(extra: &str) -> GeneratorConfig {
    let source = format!(
        "{}\n[naming]\npreset = \"conventional\"\nstore_state = [\"snake\", \"plural\"]\n\n[psr4]\n\"App\\\\\" = \"src\"\n",
        extra
    );
    ConfigFile::parse(&source).unwrap().resolve(Path::new(".")).unwrap()
}

fn run(store: &dyn SourceStore) -> GenerationReport {
    Generator::new(config("")).unwrap().generate(&graph(), store)
}

/// A store holding the output of a previous run.
fn store_from(report: &GenerationReport) -> MemorySourceStore {
    let mut store = MemorySourceStore::new();
    for file in report.files.values() {
        store.insert(&file.filename, &file.code);
    }
    store
}

fn code<'r>(report: &'r GenerationReport, key: &str) -> &'r str {
    &report.files.get(key).unwrap_or_else(|| panic!("no file {}", key)).code
}

#[test]
fn generates_every_artifact_family() {
    let report = run(&MemorySourceStore::new());
    assert!(report.is_clean(), "{:?}", report.errors);

    let keys: Vec<&str> = report.files.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "Building",
            "BuildingState",
            "Api\\Aggregate",
            "ADD_BUILDING",
            "Api\\Command",
            "Schema\\AddBuilding",
            "RENAME_BUILDING",
            "Schema\\RenameBuilding",
            "BUILDING_ADDED",
            "Api\\Event",
            "Schema\\BuildingAdded",
            "BUILDING_RENAMED",
            "Query\\GetBuilding",
            "Resolver\\BuildingResolver",
            "Finder\\BuildingFinder",
            "Api\\Query",
            "Schema\\Building",
            "Schema\\GetBuilding",
            "Address",
            "Schema\\Address",
        ]
    );
    assert!(report.files.values().all(|f| f.status == FileStatus::Created));
    assert_eq!(
        report.files["Api\\Command"].filename,
        Path::new("src/Domain/Api/Command.php")
    );
}

#[test]
fn second_run_is_a_no_op() {
    let first = run(&MemorySourceStore::new());
    let second = run(&store_from(&first));

    assert!(second.is_clean(), "{:?}", second.errors);
    assert_eq!(second.changed().count(), 0);
    for (key, file) in &second.files {
        assert_eq!(file.code, first.files[key].code, "{}", key);
    }
}

#[test]
fn aggregate_description_with_store_state_is_stable() {
    let first = run(&MemorySourceStore::new());
    let second = run(&store_from(&first));

    let description = code(&second, "Api\\Aggregate");
    assert_eq!(description, code(&first, "Api\\Aggregate"));
    assert_eq!(description.matches("->storeStateIn('buildings');").count(), 1);
    assert!(description.contains(
        "        $eventEngine->process(Command::ADD_BUILDING)\n            ->withNew(self::BUILDING)\n            ->identifiedBy('buildingId')\n"
    ));
    assert!(description.contains("->withExisting(self::BUILDING)"));
}

#[test]
fn new_and_existing_commands() {
    let report = run(&MemorySourceStore::new());
    let behaviour = code(&report, "Building");
    assert!(behaviour.contains("public static function addBuilding(Message $addBuilding): Generator"));
    assert!(behaviour.contains("public static function renameBuilding(State $state, Message $renameBuilding): Generator"));
    assert!(behaviour.contains("        return State::fromArray($buildingAdded->payload());"));
    assert!(behaviour.contains("        return $state->with($buildingRenamed->payload());"));
}

#[test]
fn hand_written_method_body_survives() {
    let existing = r#"<?php

declare(strict_types=1);

namespace App\Domain\Model\Building;

use EventEngine\Messaging\Message;

final class Building
{
    public static function addBuilding(Message $addBuilding): Generator
    {
        // validated upstream
        yield [Event::BUILDING_ADDED, $addBuilding->payload()];
    }
}
"#;
    let store = MemorySourceStore::new().with("src/Domain/Model/Building/Building.php", existing);
    let report = run(&store);
    let behaviour = code(&report, "Building");

    assert_eq!(report.files["Building"].status, FileStatus::Updated);
    assert!(behaviour.contains(
        "    {\n        // validated upstream\n        yield [Event::BUILDING_ADDED, $addBuilding->payload()];\n    }"
    ));
    assert_eq!(behaviour.matches("function addBuilding(").count(), 1);
    assert_eq!(behaviour.matches("function whenBuildingAdded(").count(), 1);
    assert_eq!(behaviour.matches("use EventEngine\\Messaging\\Message;").count(), 1);
}

#[test]
fn file_with_syntax_errors_is_left_alone() {
    let store = MemorySourceStore::new().with(
        "src/Domain/Model/Building/BuildingState.php",
        "<?php\n\nfinal class BuildingState {\n    public function (\n",
    );
    let report = run(&store);

    assert!(!report.files.contains_key("BuildingState"));
    assert!(report.files.contains_key("Building"));
    assert!(report
        .errors
        .iter()
        .any(|e| matches!(e, CodegenError::SyntaxError { .. })));
}

#[test]
fn foreign_class_in_target_file_is_reported() {
    let store = MemorySourceStore::new().with(
        "src/Domain/Model/Command/AddBuilding.php",
        "<?php\n\nnamespace App\\Domain\\Model\\Command;\n\nfinal class CreateBuilding\n{\n}\n",
    );
    let report = run(&store);

    assert!(report.errors.contains(&CodegenError::ClassNameMismatch {
        expected: "AddBuilding".into(),
        found: "CreateBuilding".into(),
    }));
    assert!(!code(&report, "ADD_BUILDING").contains("class AddBuilding"));
}

#[test]
fn rejected_file_is_returned_as_read() {
    let foreign = "<?php\nnamespace App\\Domain\\Model\\Building;\nuse A\\X, B\\Y;\nfinal class Other {}\n";
    let store = MemorySourceStore::new().with("src/Domain/Model/Building/Building.php", foreign);
    let report = run(&store);

    assert!(report.errors.contains(&CodegenError::ClassNameMismatch {
        expected: "Building".into(),
        found: "Other".into(),
    }));
    let file = &report.files["Building"];
    assert_eq!(file.status, FileStatus::Unchanged);
    assert_eq!(file.code, foreign);
}

#[test]
fn complete_file_in_another_layout_is_not_rewritten() {
    let first = run(&MemorySourceStore::new());
    // same declarations, different formatting
    let compact = code(&first, "ADD_BUILDING").replace("\n\n", "\n");
    let store = store_from(&first).with("src/Domain/Model/Command/AddBuilding.php", &compact);
    let report = run(&store);

    assert_eq!(report.files["ADD_BUILDING"].status, FileStatus::Unchanged);
    assert_eq!(code(&report, "ADD_BUILDING"), compact);
}

#[test]
fn colliding_file_names_are_reported() {
    let mut model: serde_json::Value = serde_json::from_str(MODEL).unwrap();
    model["nodes"].as_array_mut().unwrap().push(serde_json::json!({
        "id": "d9",
        "name": "Add Building",
        "type": "document",
        "metadata": { "ns": "\\App\\Domain\\Model\\Command", "schema": { "type": "object" } }
    }));
    let graph = EventSourcingGraph::from_json(&model.to_string()).unwrap();
    let report = Generator::new(config("")).unwrap().generate(&graph, &MemorySourceStore::new());

    assert!(report.errors.contains(&CodegenError::FilenameCollision {
        filename: "src/Domain/Model/Command/AddBuilding.php".into(),
        first: "ADD_BUILDING".into(),
        second: "AddBuilding".into(),
    }));
    // the command record is kept as generated first
    assert!(code(&report, "ADD_BUILDING").contains("public const NAME = 'name';"));
}

#[test]
fn failing_artifacts_do_not_stop_the_run() {
    let model = r#"{ "nodes": [
        { "id": "c1", "name": "Ping", "type": "command" },
        { "id": "d1", "name": "Address", "type": "document",
          "metadata": { "schema": { "type": "object", "properties": { "street": { "type": "string" } } } } }
    ] }"#;
    let graph = EventSourcingGraph::from_json(model).unwrap();
    let report = Generator::new(config("[layout]\naggregate_folder = true"))
        .unwrap()
        .generate(&graph, &MemorySourceStore::new());

    assert!(report
        .errors
        .iter()
        .any(|e| matches!(e, CodegenError::MissingAggregateConnection { name, .. } if name == "Ping")));
    assert!(report.files.contains_key("Address"));
}

#[test]
fn invalid_layout_is_rejected_up_front() {
    let mut config = config("");
    config.layout.aggregate_folder = true;
    config.layout.command_dir = Some("src/Command".into());
    assert!(matches!(
        Generator::new(config),
        Err(CodegenError::Configuration { .. })
    ));
}

#[test]
fn writes_to_disk_and_regenerates_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsSourceStore::new(dir.path());

    let first = run(&store);
    let written = write_files(dir.path(), &first.files).unwrap();
    assert_eq!(written, first.files.len());
    assert!(dir.path().join("src/Domain/Api/_schema/AddBuilding.json").is_file());

    let second = run(&store);
    assert_eq!(second.changed().count(), 0);
    assert_eq!(write_files(dir.path(), &second.files).unwrap(), 0);
}
