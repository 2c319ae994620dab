//! PSR-4 autoload mapping between namespaces and project directories.

use std::path::{Component, Path, PathBuf};
use serde::Deserialize;
use serde_json::Value;

use super::filter::Filter;
use crate::diagnostic::CodegenError;

/// Namespace prefix → directory mapping, resolved by longest prefix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Psr4Map {
    entries: Vec<(String, PathBuf)>,
}

#[derive(Deserialize)]
struct ComposerFile {
    #[serde(default)]
    autoload: Option<ComposerAutoload>,
    #[serde(default, rename = "autoload-dev")]
    autoload_dev: Option<ComposerAutoload>,
}

#[derive(Deserialize)]
struct ComposerAutoload {
    #[serde(default, rename = "psr-4")]
    psr4: Option<serde_json::Map<String, Value>>,
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('\\');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}\\", trimmed)
    }
}

fn normalize_dir(dir: &Path) -> PathBuf {
    dir.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Joins path components with `/`, independent of the host platform.
pub(crate) fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

impl Psr4Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mapping. The prefix may be written with or without the trailing `\`.
    pub fn insert(&mut self, prefix: &str, dir: impl AsRef<Path>) {
        let prefix = normalize_prefix(prefix);
        let dir = normalize_dir(dir.as_ref());
        self.entries.retain(|(p, _)| *p != prefix);
        self.entries.push((prefix, dir));
    }

    pub fn with(mut self, prefix: &str, dir: impl AsRef<Path>) -> Self {
        self.insert(prefix, dir);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads `autoload.psr-4` and `autoload-dev.psr-4` of a composer.json file.
    ///
    /// A prefix mapped to several directories uses the first one.
    pub fn from_composer_json(source: &str) -> Result<Self, CodegenError> {
        let composer: ComposerFile = serde_json::from_str(source)
            .map_err(|e| CodegenError::config(format!("invalid composer.json: {}", e)))?;

        let mut map = Self::new();
        for autoload in [composer.autoload, composer.autoload_dev].into_iter().flatten() {
            for (prefix, dirs) in autoload.psr4.into_iter().flatten() {
                let dir = match &dirs {
                    Value::String(dir) => Some(dir.as_str()),
                    Value::Array(dirs) => dirs.iter().find_map(Value::as_str),
                    _ => None,
                };
                match dir {
                    Some(dir) if !map.entries.iter().any(|(p, _)| *p == normalize_prefix(&prefix)) => {
                        map.insert(&prefix, dir)
                    }
                    Some(_) => {}
                    None => {
                        return Err(CodegenError::config(format!(
                            "psr-4 entry '{}' has no directory",
                            prefix
                        )))
                    }
                }
            }
        }
        Ok(map)
    }

    fn longest_prefix(&self, name: &str) -> Option<&(String, PathBuf)> {
        let qualified = format!("{}\\", name.trim_matches('\\'));
        self.entries
            .iter()
            .filter(|(prefix, _)| qualified.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
    }

    /// Directory holding the classes of a namespace.
    pub fn namespace_dir(&self, namespace: &str, to_directory: &Filter) -> Result<PathBuf, CodegenError> {
        let namespace = namespace.trim_matches('\\');
        let (prefix, dir) = self
            .longest_prefix(namespace)
            .ok_or_else(|| CodegenError::NoAutoloadPrefix {
                target: namespace.to_string(),
            })?;
        let rest = format!("{}\\", namespace)
            .strip_prefix(prefix.as_str())
            .unwrap_or_default()
            .trim_end_matches('\\')
            .to_string();
        if rest.is_empty() {
            Ok(dir.clone())
        } else {
            Ok(dir.join(to_directory.apply(&rest)))
        }
    }

    /// File of a fully qualified class name.
    pub fn class_path(&self, fqcn: &str, to_directory: &Filter) -> Result<PathBuf, CodegenError> {
        let fqcn = fqcn.trim_matches('\\');
        let (namespace, class) = fqcn.rsplit_once('\\').unwrap_or(("", fqcn));
        let dir = self.namespace_dir(namespace, to_directory)?;
        Ok(dir.join(format!("{}.php", class)))
    }

    /// Namespace of a project directory: the deepest mapped directory
    /// containing it, plus the remaining path.
    pub fn namespace_for_dir(&self, dir: &Path, to_namespace: &Filter) -> Result<String, CodegenError> {
        let dir = normalize_dir(dir);
        let best = self
            .entries
            .iter()
            .filter_map(|(prefix, base)| {
                let relative = pathdiff::diff_paths(&dir, base)?;
                if relative.components().any(|c| matches!(c, Component::ParentDir)) {
                    return None;
                }
                Some((prefix, base, relative))
            })
            .max_by_key(|(_, base, _)| base.components().count());

        let (prefix, _, relative) = best.ok_or_else(|| CodegenError::NoAutoloadPrefix {
            target: slash_path(&dir),
        })?;

        let rest = slash_path(&relative);
        let namespace = if rest.is_empty() {
            prefix.trim_end_matches('\\').to_string()
        } else {
            format!("{}{}", prefix, to_namespace.apply(&rest))
        };
        Ok(namespace)
    }
}
