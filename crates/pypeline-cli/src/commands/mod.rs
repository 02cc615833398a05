//! Command handlers.
//!
//! Each handler turns parsed arguments into a core service call and prints
//! the result. Adapter wiring is shared through the helpers below.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use pypeline_adapters::{
    BuiltinTemplates, FilesystemTemplateStore, GitCli, LocalFilesystem, PythonToolchain,
    ZipArchiver,
};
use pypeline_core::application::{
    BuildService, DependencyService, ProjectService,
    ports::{Filesystem, TemplateStore},
};

use crate::{config::AppConfig, error::IntoCli, error::CliResult};

pub mod build;
pub mod completions;
pub mod config;
pub mod create_pipeline;
pub mod create_processor;
pub mod init;
pub mod install;
pub mod sync_deps;

fn filesystem() -> Arc<dyn Filesystem> {
    Arc::new(LocalFilesystem::new())
}

/// Built-in templates, or the configured override directory on top of them.
fn templates(config: &AppConfig) -> Arc<dyn TemplateStore> {
    match &config.templates.local_path {
        Some(dir) => {
            debug!(dir = %dir.display(), "Using template override directory");
            Arc::new(FilesystemTemplateStore::new(dir))
        }
        None => Arc::new(BuiltinTemplates::new()),
    }
}

pub(crate) fn project_service(config: &AppConfig) -> ProjectService {
    ProjectService::new(filesystem(), templates(config), Arc::new(GitCli::new()))
}

pub(crate) fn dependency_service() -> DependencyService {
    DependencyService::new(filesystem(), Arc::new(PythonToolchain::new()))
}

pub(crate) fn build_service() -> BuildService {
    BuildService::new(filesystem(), Arc::new(ZipArchiver::new()))
}

/// Directory the project search starts from.
pub(crate) fn working_dir() -> CliResult<PathBuf> {
    std::env::current_dir().with_cli_context(|| "Failed to read the current directory")
}
