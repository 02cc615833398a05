//! Core domain layer for Pypeline.
//!
//! This module contains pure logic: name normalization, template
//! substitution, dependency merging, manifest and aggregator editing.
//! Filesystem, process and template storage concerns are reached through
//! ports defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: Every function takes and returns values
//! - **Value objects**: `Identifier`, `Dependency`, `License` are Clone + PartialEq

pub mod dependency;
pub mod error;
pub mod license;
pub mod manifest;
pub mod naming;
pub mod packaging;
pub mod project;
pub mod registry;
pub mod runtime;
pub mod scaffold;
pub mod template;

pub use dependency::{
    Dependency, DependencySet, MergeOutcome, VersionOp, VersionSpec, parse_dependency_file,
};
pub use error::{DomainError, ErrorCategory};
pub use license::License;
pub use manifest::Manifest;
pub use naming::{Identifier, normalize, to_pascal_case, to_snake_case};
pub use packaging::ExclusionRules;
pub use project::{
    PipelineDescriptor, ProcessorDescriptor, ProjectContext, ProjectMetadata, validate_email,
};
pub use registry::{RegistryUpdate, update_registry};
pub use runtime::{PythonRequirement, parse_python_version};
pub use scaffold::ScaffoldFile;
pub use template::RenderContext;
