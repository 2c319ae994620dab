//! Generator configuration.
//!
//! A project describes itself in an `esgen.toml` next to its `composer.json`:
//!
//! ```toml
//! strict_types = true
//! state = "immutable-record"
//! merge = "preserve-existing"
//! composer = "composer.json"
//!
//! [layout]
//! model_dir = "src/Domain/Model"
//! aggregate_folder = true
//!
//! [naming]
//! preset = "conventional"
//! store_state = ["snake", "plural"]
//!
//! [psr4]
//! "App\\" = "src"
//! ```
//!
//! Every key is optional. Without `[psr4]` and `composer`, the
//! `composer.json` next to the config file is read.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::diagnostic::CodegenError;
use crate::generator::StateFlavor;
use crate::merge::MergePolicy;
use crate::naming::{Layout, NamingConfig, NamingStrategies, Psr4Map};

/// Default config file name.
pub const CONFIG_FILE: &str = "esgen.toml";

const COMPOSER_FILE: &str = "composer.json";

/// Resolved configuration of one generator run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub layout: Layout,
    pub psr4: Psr4Map,
    pub naming: NamingStrategies,
    pub state_flavor: StateFlavor,
    pub merge_policy: MergePolicy,
    /// Emit `declare(strict_types=1);` in files the generator writes.
    pub strict_types: bool,
}

impl GeneratorConfig {
    /// Default layout and conventional naming for the given autoload map.
    pub fn new(psr4: Psr4Map) -> Self {
        Self {
            layout: Layout::default(),
            psr4,
            naming: NamingStrategies::conventional(),
            state_flavor: StateFlavor::default(),
            merge_policy: MergePolicy::default(),
            strict_types: true,
        }
    }

    pub fn validate(&self) -> Result<(), CodegenError> {
        self.layout.validate()?;
        if self.psr4.is_empty() {
            return Err(CodegenError::config(
                "no PSR-4 autoload mapping (add [psr4] or point `composer` at a composer.json)",
            ));
        }
        Ok(())
    }
}

/// The config file as written.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub layout: Layout,
    pub naming: Option<NamingConfig>,
    pub psr4: IndexMap<String, PathBuf>,
    /// composer.json to read `autoload.psr-4` from, relative to the config file.
    pub composer: Option<PathBuf>,
    pub state: StateFlavor,
    pub merge: MergePolicy,
    pub strict_types: bool,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            naming: None,
            psr4: IndexMap::new(),
            composer: None,
            state: StateFlavor::default(),
            merge: MergePolicy::default(),
            strict_types: true,
        }
    }
}

fn read(path: &Path) -> Result<String, CodegenError> {
    std::fs::read_to_string(path).map_err(|e| CodegenError::io(path, e.to_string()))
}

impl ConfigFile {
    pub fn parse(source: &str) -> Result<Self, CodegenError> {
        toml::from_str(source).map_err(|e| CodegenError::config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, CodegenError> {
        Self::parse(&read(path)?)
    }

    /// Resolves naming presets and the autoload map.
    ///
    /// `base_dir` is the directory relative paths of the file are taken from.
    /// `[psr4]` entries win over composer.json entries with the same prefix.
    pub fn resolve(self, base_dir: &Path) -> Result<GeneratorConfig, CodegenError> {
        let naming = self.naming.unwrap_or_else(NamingConfig::conventional).build()?;

        let composer = match &self.composer {
            Some(path) => Some(base_dir.join(path)),
            None if self.psr4.is_empty() => Some(base_dir.join(COMPOSER_FILE)).filter(|p| p.is_file()),
            None => None,
        };
        let mut psr4 = match composer {
            Some(path) => {
                debug!(path = %path.display(), "reading autoload map");
                Psr4Map::from_composer_json(&read(&path)?)?
            }
            None => Psr4Map::new(),
        };
        for (prefix, dir) in &self.psr4 {
            psr4.insert(prefix, dir);
        }

        let config = GeneratorConfig {
            layout: self.layout,
            psr4,
            naming,
            state_flavor: self.state,
            merge_policy: self.merge,
            strict_types: self.strict_types,
        };
        config.validate()?;
        Ok(config)
    }
}
