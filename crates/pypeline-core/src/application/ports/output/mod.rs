//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `pypeline-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use semver::Version;
use serde::Serialize;

use crate::domain::{ExclusionRules, PythonRequirement};
use crate::error::PypelineResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `pypeline_adapters::filesystem::LocalFilesystem` (production)
/// - `pypeline_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> PypelineResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &str) -> PypelineResult<()>;

    fn read_to_string(&self, path: &Path) -> PypelineResult<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> PypelineResult<()>;
}

/// Port for template retrieval.
///
/// Implemented by:
/// - `pypeline_adapters::templates::BuiltinTemplates` (compiled in)
/// - `pypeline_adapters::templates::FilesystemTemplateStore` (user overrides)
#[cfg_attr(test, mockall::automock)]
pub trait TemplateStore: Send + Sync {
    /// Raw template text for `id`, or `TemplateNotFound`.
    fn load(&self, id: &str) -> PypelineResult<String>;
}

/// Port for the version-control bootstrap done by `init --git`.
#[cfg_attr(test, mockall::automock)]
pub trait VersionControl: Send + Sync {
    fn init(&self, root: &Path) -> PypelineResult<()>;

    /// Stage everything and commit.
    fn initial_commit(&self, root: &Path, message: &str) -> PypelineResult<()>;
}

/// A Python interpreter found on the machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interpreter {
    pub program: PathBuf,
    #[serde(serialize_with = "serialize_version")]
    pub version: Version,
}

fn serialize_version<S: serde::Serializer>(version: &Version, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(version)
}

/// Port for the local Python toolchain used by `install`.
#[cfg_attr(test, mockall::automock)]
pub trait Toolchain: Send + Sync {
    /// First interpreter whose version satisfies `requirement`.
    fn detect(&self, requirement: &PythonRequirement) -> PypelineResult<Interpreter>;

    /// `python -m venv <venv>`
    fn create_environment(&self, interpreter: &Interpreter, venv: &Path) -> PypelineResult<()>;

    /// Upgrade pip inside `venv`, then install `root` in editable mode.
    fn install_project(&self, venv: &Path, root: &Path) -> PypelineResult<()>;
}

/// What an archiver wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ArchiveSummary {
    pub entries: usize,
    pub bytes: u64,
}

/// Port for build archives.
#[cfg_attr(test, mockall::automock)]
pub trait Archiver: Send + Sync {
    /// Archive `root` into `destination`, skipping paths matched by `rules`.
    fn archive(
        &self,
        root: &Path,
        destination: &Path,
        rules: &ExclusionRules,
    ) -> PypelineResult<ArchiveSummary>;
}
