//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;
use std::time::SystemTime;

use thnk_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{ThnkError, ThnkResult},
};

/// Production filesystem implementation using `std::fs`.
///
/// Relative paths resolve against the process working directory, which the
/// CLI sets to the directory holding the Thnkfile.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> ThnkResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> ThnkResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn read_to_string(&self, path: &Path) -> ThnkResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        std::fs::metadata(path).and_then(|m| m.modified()).ok()
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> ThnkError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_read_and_mtime_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out.txt");
        let fs = LocalFilesystem::new();

        assert!(fs.modified(&path).is_none());
        fs.create_dir_all(path.parent().unwrap()).unwrap();
        fs.write_file(&path, "hello").unwrap();

        assert!(fs.exists(&path));
        assert_eq!(fs.read_to_string(&path).unwrap(), "hello");
        assert!(fs.modified(&path).is_some());
    }

    #[test]
    fn missing_file_read_names_the_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.txt");
        let err = LocalFilesystem::new().read_to_string(&path).unwrap_err();
        assert!(err.to_string().contains("absent.txt"));
    }
}
