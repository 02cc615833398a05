//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// No manifest carrying the marker section was found walking upwards.
    #[error("Not inside a pypeline project (no pyproject.toml with [tool.pypeline] above {start})")]
    ProjectNotFound { start: PathBuf },

    /// The file or directory about to be generated already exists.
    #[error("Destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// The template store has no template with this id.
    #[error("Template not found: {id}")]
    TemplateNotFound { id: String },

    /// A processor was requested for a pipeline that does not exist.
    #[error("Pipeline '{name}' does not exist")]
    PipelineNotFound { name: String },

    /// No interpreter satisfying the project's requirement was found.
    #[error("No Python runtime satisfying '{requirement}' was found")]
    RuntimeNotFound { requirement: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// A git or python subprocess failed.
    #[error("External command failed: {command}: {reason}")]
    ExternalCommandFailed { command: String, reason: String },

    /// In-memory store lock was poisoned.
    #[error("Store lock poisoned")]
    StoreLockError,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ProjectNotFound { .. } => vec![
                "Run this command from inside a project created with 'pypeline init'".into(),
                "The project root holds a pyproject.toml with a [tool.pypeline] section".into(),
            ],
            Self::DestinationExists { path } => vec![
                format!("'{}' already exists", path.display()),
                "Choose a different name".into(),
                "Or remove the existing path first".into(),
            ],
            Self::TemplateNotFound { id } => vec![
                format!("No template registered under '{id}'"),
                "Check templates.local_path in your configuration".into(),
            ],
            Self::PipelineNotFound { name } => vec![
                format!("Create it first: pypeline create-pipeline --name {name}"),
                "Pipelines live under src/<package>/pipelines/".into(),
            ],
            Self::RuntimeNotFound { requirement } => vec![
                format!("Install a Python interpreter matching {requirement}"),
                "Make sure python3 is on your PATH".into(),
                "Or relax requires-python in pyproject.toml".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::ExternalCommandFailed { command, .. } => vec![
                format!("'{command}' did not succeed"),
                "Ensure the command is installed and in your PATH".into(),
                "Re-run with -vv for the command output".into(),
            ],
            Self::StoreLockError => vec!["Try again in a moment".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ProjectNotFound { .. }
            | Self::TemplateNotFound { .. }
            | Self::PipelineNotFound { .. }
            | Self::RuntimeNotFound { .. } => ErrorCategory::NotFound,
            Self::DestinationExists { .. } => ErrorCategory::Validation,
            Self::FilesystemError { .. }
            | Self::ExternalCommandFailed { .. }
            | Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}
