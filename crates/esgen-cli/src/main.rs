//! esgen CLI.
//!
//! Generates and merges the PHP skeleton of an event-sourcing model.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use esgen_compiler::{
    write_files, CodegenError, ConfigFile, EventSourcingGraph, FileStatus, FsSourceStore, GeneratorConfig, Generator,
    VertexKind, CONFIG_FILE,
};

mod ui;

#[derive(Parser)]
#[command(name = "esgen")]
#[command(about = "esgen - generates event-sourcing PHP code from a domain graph", version)]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate or update the classes of a model
    Generate {
        /// Graph document (JSON)
        #[arg(short, long)]
        graph: PathBuf,

        /// Config file (default: <root>/esgen.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Project root the generated paths are relative to
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// composer.json to read the PSR-4 autoload map from
        #[arg(long)]
        composer: Option<PathBuf>,

        /// List the files instead of writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Load and validate a graph without generating code
    Check {
        /// Graph document (JSON)
        #[arg(short, long)]
        graph: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    ui::print_compact_header(env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Generate {
            graph,
            config,
            root,
            composer,
            dry_run,
        } => generate(&graph, config.as_deref(), &root, composer.as_deref(), dry_run),
        Commands::Check { graph } => check(&graph),
    }
}

fn load_graph(path: &Path) -> Result<EventSourcingGraph, CodegenError> {
    let source = std::fs::read_to_string(path).map_err(|e| CodegenError::io(path, e.to_string()))?;
    EventSourcingGraph::from_json(&source)
}

/// Config file (explicit, or `esgen.toml` in the root) with the `--composer`
/// override applied.
fn load_config(config: Option<&Path>, root: &Path, composer: Option<&Path>) -> Result<GeneratorConfig, CodegenError> {
    let path = config.map(Path::to_path_buf).unwrap_or_else(|| root.join(CONFIG_FILE));
    let (mut file, base_dir) = if path.is_file() {
        debug!(path = %path.display(), "loading config");
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
        (ConfigFile::load(&path)?, base_dir)
    } else if config.is_some() {
        return Err(CodegenError::io(&path, "config file not found"));
    } else {
        (ConfigFile::default(), root.to_path_buf())
    };

    if let Some(composer) = composer {
        let absolute = std::path::absolute(composer).map_err(|e| CodegenError::io(composer, e.to_string()))?;
        file.composer = Some(absolute);
    }
    file.resolve(&base_dir)
}

fn generate(
    graph_path: &Path,
    config: Option<&Path>,
    root: &Path,
    composer: Option<&Path>,
    dry_run: bool,
) -> miette::Result<()> {
    let graph = load_graph(graph_path)?;
    let generator = Generator::new(load_config(config, root, composer)?)?;
    let report = generator.generate(&graph, &FsSourceStore::new(root));

    for file in report.files.values() {
        ui::file_line(file.status, &file.filename.display().to_string());
    }
    println!();

    let changed = report.changed().count();
    if dry_run {
        ui::info(&format!("{} files would change (dry run, nothing written)", changed));
    } else {
        let written = write_files(root, &report.files)?;
        ui::success(&format!("{} files written", written));
    }
    let unchanged = report.files.values().filter(|f| f.status == FileStatus::Unchanged).count();
    if unchanged > 0 {
        ui::dim(&format!("{} files unchanged", unchanged));
    }

    if report.is_clean() {
        return Ok(());
    }
    println!();
    for error in &report.errors {
        eprintln!("{:?}", miette::Report::new(error.clone()));
    }
    ui::error(&format!("{} problems, see above", report.errors.len()));
    Err(miette::miette!("generation finished with {} errors", report.errors.len()))
}

fn check(graph_path: &Path) -> miette::Result<()> {
    let graph = load_graph(graph_path)?;
    graph.aggregate_map()?;

    let count = |kind: VertexKind| graph.vertex_map().values().filter(|v| v.is(kind)).count();
    ui::success("Graph is consistent");
    println!(
        "    {} aggregates {} {} commands {} {} events {} {} documents",
        count(VertexKind::Aggregate),
        ui::symbols::DOT,
        count(VertexKind::Command),
        ui::symbols::DOT,
        count(VertexKind::Event),
        ui::symbols::DOT,
        count(VertexKind::Document),
    );
    Ok(())
}
