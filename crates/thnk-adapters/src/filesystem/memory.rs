//! In-memory filesystem adapter for testing.
//!
//! Modification times come from a logical clock: every write advances it by
//! one second, so "written later" always means "newer" without sleeping.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use thnk_core::{
    application::{ApplicationError, ports::Filesystem},
    error::ThnkResult,
};

/// In-memory filesystem for testing.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: HashMap<PathBuf, MemoryFile>,
    directories: HashSet<PathBuf>,
    clock: u64,
}

#[derive(Debug, Clone)]
struct MemoryFile {
    content: String,
    modified: u64,
}

impl MemoryFilesystemInner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn add_parents(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        if let Some(parent) = path.parent() {
            for component in parent.components() {
                current.push(component);
                self.directories.insert(current.clone());
            }
        }
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Seed a file, creating its parents (testing helper).
    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> Self {
        self.set(path, content);
        self
    }

    /// Create or replace a file, making it the newest one.
    pub fn set(&self, path: impl AsRef<Path>, content: &str) {
        if let Ok(mut inner) = self.inner.write() {
            let path = path.as_ref();
            inner.add_parents(path);
            let modified = inner.tick();
            inner.files.insert(
                path.to_path_buf(),
                MemoryFile {
                    content: content.to_string(),
                    modified,
                },
            );
        }
    }

    /// Bump a file's mtime without changing its content.
    pub fn touch(&self, path: impl AsRef<Path>) {
        if let Ok(mut inner) = self.inner.write() {
            let modified = inner.tick();
            if let Some(file) = inner.files.get_mut(path.as_ref()) {
                file.modified = modified;
            }
        }
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path.as_ref()).map(|f| f.content.clone())
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        let mut files: Vec<_> = inner.files.keys().cloned().collect();
        files.sort();
        files
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> ThnkResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned)?;

        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            inner.directories.insert(current.clone());
        }

        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> ThnkResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned)?;

        // Ensure parent exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "Parent directory does not exist".into(),
                }
                .into());
            }
        }

        let modified = inner.tick();
        inner.files.insert(
            path.to_path_buf(),
            MemoryFile {
                content: content.to_string(),
                modified,
            },
        );
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> ThnkResult<String> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::LockPoisoned)?;

        inner
            .files
            .get(path)
            .map(|f| f.content.clone())
            .ok_or_else(|| {
                ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "No such file".into(),
                }
                .into()
            })
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .is_ok_and(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        let inner = self.inner.read().ok()?;
        inner
            .files
            .get(path)
            .map(|f| UNIX_EPOCH + Duration::from_secs(f.modified))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_writes_are_newer() {
        let fs = MemoryFilesystem::new()
            .with_file("a.txt", "a")
            .with_file("b.txt", "b");
        let a = fs.modified(Path::new("a.txt")).unwrap();
        let b = fs.modified(Path::new("b.txt")).unwrap();
        assert!(a < b);

        fs.touch("a.txt");
        assert!(fs.modified(Path::new("a.txt")).unwrap() > b);
        assert_eq!(fs.read_file("a.txt").as_deref(), Some("a"));
    }

    #[test]
    fn write_requires_parent_directory() {
        let fs = MemoryFilesystem::new();
        assert!(fs.write_file(Path::new("out/a.txt"), "x").is_err());

        fs.create_dir_all(Path::new("out")).unwrap();
        fs.write_file(Path::new("out/a.txt"), "x").unwrap();
        assert!(fs.exists(Path::new("out")));
        assert_eq!(fs.list_files(), [PathBuf::from("out/a.txt")]);
    }

    #[test]
    fn missing_file_has_no_mtime() {
        let fs = MemoryFilesystem::new();
        assert!(fs.modified(Path::new("nope")).is_none());
        assert!(fs.read_to_string(Path::new("nope")).is_err());
    }
}
