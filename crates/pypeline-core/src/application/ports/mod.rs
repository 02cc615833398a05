//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `pypeline-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `TemplateStore`: Template retrieval
//!   - `VersionControl`: git bootstrap
//!   - `Toolchain`: Python interpreter, venv and pip
//!   - `Archiver`: Build archives
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    ArchiveSummary, Archiver, Filesystem, Interpreter, TemplateStore, Toolchain, VersionControl,
};

#[cfg(test)]
pub use output::{MockArchiver, MockFilesystem, MockTemplateStore, MockToolchain, MockVersionControl};
