//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use pypeline_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{PypelineError, PypelineResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> PypelineResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> PypelineResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn read_to_string(&self, path: &Path) -> PypelineResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn remove_dir_all(&self, path: &Path) -> PypelineResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }
}

pub(crate) fn map_io_error(path: &Path, e: io::Error, operation: &str) -> PypelineError {
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
    fn write_then_read_roundtrip_on_disk() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let nested = dir.path().join("a/b");

        fs.create_dir_all(&nested).unwrap();
        fs.write_file(&nested.join("x.py"), "print('hi')\n").unwrap();

        assert!(fs.is_dir(&nested));
        assert_eq!(fs.read_to_string(&nested.join("x.py")).unwrap(), "print('hi')\n");
    }

    #[test]
    fn missing_file_maps_to_filesystem_error() {
        let dir = TempDir::new().unwrap();
        let err = LocalFilesystem::new()
            .read_to_string(&dir.path().join("nope.toml"))
            .unwrap_err();
        assert!(matches!(
            err,
            PypelineError::Application(ApplicationError::FilesystemError { ref reason, .. })
                if reason.starts_with("Failed to read file")
        ));
    }
}
