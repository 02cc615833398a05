//! Infrastructure adapters for Pypeline.
//!
//! This crate implements the ports defined in `pypeline-core::application::ports`.
//! It contains all external dependencies and I/O operations: the local
//! filesystem, the template sets, `git`, the Python toolchain and zip archives.

pub mod archive;
pub mod filesystem;
pub mod process;
pub mod templates;
pub mod toolchain;
pub mod vcs;

// Re-export commonly used adapters
pub use archive::ZipArchiver;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use templates::{BuiltinTemplates, FilesystemTemplateStore};
pub use toolchain::PythonToolchain;
pub use vcs::GitCli;
