//! Application layer for Pypeline.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (ProjectService, DependencyService, BuildService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. Name rules, merging and aggregator edits live in
//! `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    BuildReport, BuildService, DependencyService, GitOutcome, InitReport, InstallReport,
    PipelineReport, ProcessorReport, ProjectLocator, ProjectService, SyncReport,
};

pub use ports::{
    ArchiveSummary, Archiver, Filesystem, Interpreter, TemplateStore, Toolchain, VersionControl,
};

pub use error::ApplicationError;
