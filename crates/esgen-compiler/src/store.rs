//! Access to the existing sources of the target project.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::diagnostic::CodegenError;

/// Read access to existing project files by project-relative path.
pub trait SourceStore {
    /// The file content, or `None` when the file does not exist yet.
    fn read(&self, path: &Path) -> Result<Option<String>, CodegenError>;
}

/// Files under a project root on disk.
#[derive(Debug, Clone)]
pub struct FsSourceStore {
    root: PathBuf,
}

impl FsSourceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceStore for FsSourceStore {
    fn read(&self, path: &Path) -> Result<Option<String>, CodegenError> {
        let full = self.root.join(path);
        match std::fs::read_to_string(&full) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CodegenError::io(full, e.to_string())),
        }
    }
}

/// In-memory sources, for tests and dry runs over generated output.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceStore {
    files: HashMap<PathBuf, String>,
}

impl MemorySourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn with(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }
}

impl SourceStore for MemorySourceStore {
    fn read(&self, path: &Path) -> Result<Option<String>, CodegenError> {
        Ok(self.files.get(path).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_store_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/A.php"), "<?php\n").unwrap();

        let store = FsSourceStore::new(dir.path());
        assert_eq!(store.read(Path::new("src/A.php")).unwrap().as_deref(), Some("<?php\n"));
        assert_eq!(store.read(Path::new("src/B.php")).unwrap(), None);
    }

    #[test]
    fn memory_store() {
        let store = MemorySourceStore::new().with("src/A.php", "<?php\n");
        assert!(store.read(Path::new("src/A.php")).unwrap().is_some());
        assert!(store.read(Path::new("src/B.php")).unwrap().is_none());
    }
}
