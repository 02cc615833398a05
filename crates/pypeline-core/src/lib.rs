//! Pypeline Core - Hexagonal Architecture Implementation
//!
//! Domain and application layers of the Pypeline ETL project generator,
//! following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           pypeline-cli (CLI)            │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (Project, Dependency, Build services)  │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Filesystem, TemplateStore, Toolchain…) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    pypeline-adapters (Infrastructure)   │
//! │ (LocalFilesystem, GitCli, ZipArchiver)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::path::Path;
//! use pypeline_core::prelude::*;
//!
//! let service = ProjectService::new(filesystem, templates, vcs);
//! let report = service.create_pipeline(Path::new("."), "daily sales")?;
//! println!("registered {}", report.pipeline.class_name);
//! ```

pub mod domain;

pub mod application;

pub mod error;

pub mod prelude {
    pub use crate::application::{
        BuildService, DependencyService, ProjectService,
        ports::{Archiver, Filesystem, TemplateStore, Toolchain, VersionControl},
    };
    pub use crate::domain::{
        Dependency, Identifier, License, Manifest, ProjectContext, ProjectMetadata,
        PythonRequirement, RenderContext,
    };
    pub use crate::error::{PypelineError, PypelineResult};
}

/// Written into `[tool.pypeline].cli-version` of generated projects.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
