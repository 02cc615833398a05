//! Application services - orchestrate use cases.
//!
//! Each public service backs one or more CLI commands. The smaller
//! building blocks (locator, scaffolder, registry updater) are shared
//! between them.

pub mod build_service;
pub mod dependency_service;
pub mod locator;
pub mod project_service;
pub mod registry_service;
pub mod scaffold_service;

pub use build_service::{BuildReport, BuildService};
pub use dependency_service::{DependencyService, InstallReport, SyncReport};
pub use locator::ProjectLocator;
pub use project_service::{GitOutcome, InitReport, PipelineReport, ProcessorReport, ProjectService};
pub use registry_service::RegistryUpdater;
pub use scaffold_service::{ScaffoldReport, Scaffolder};
