//! Dependency Service - `sync-deps` and `install`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    application::{
        ports::{Filesystem, Interpreter, Toolchain},
        services::locator::ProjectLocator,
    },
    domain::{Dependency, Manifest, MergeOutcome, PythonRequirement, parse_dependency_file},
    error::PypelineResult,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub manifest: PathBuf,
    /// Entries found in `dependencies.py`.
    pub requested: usize,
    pub outcome: MergeOutcome,
    pub written: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub requirement: String,
    pub interpreter: Interpreter,
    pub venv: PathBuf,
    pub created_venv: bool,
}

/// Merge `incoming` into the manifest at `path`, writing only on change.
///
/// A missing manifest starts out empty.
pub(crate) fn merge_manifest(
    filesystem: &dyn Filesystem,
    path: &Path,
    incoming: &[Dependency],
) -> PypelineResult<(MergeOutcome, bool)> {
    let mut manifest = if filesystem.exists(path) {
        Manifest::parse(&filesystem.read_to_string(path)?)?
    } else {
        Manifest::empty()
    };

    let outcome = manifest.merge_dependencies(incoming)?;
    if outcome.is_unchanged() {
        debug!(path = %path.display(), "Manifest dependencies already up to date");
        return Ok((outcome, false));
    }

    filesystem.write_file(path, &manifest.to_toml_string()?)?;
    info!(
        path = %path.display(),
        added = outcome.added.len(),
        updated = outcome.updated.len(),
        "Manifest dependencies updated"
    );
    Ok((outcome, true))
}

pub struct DependencyService {
    filesystem: Arc<dyn Filesystem>,
    toolchain: Arc<dyn Toolchain>,
    locator: ProjectLocator,
}

impl DependencyService {
    pub fn new(filesystem: Arc<dyn Filesystem>, toolchain: Arc<dyn Toolchain>) -> Self {
        Self {
            locator: ProjectLocator::new(Arc::clone(&filesystem)),
            filesystem,
            toolchain,
        }
    }

    /// Copy the `DEPENDENCIES` list of `dependencies.py` into
    /// `[project].dependencies`.
    #[instrument(skip(self), fields(start = %start.display()))]
    pub fn sync(&self, start: &Path) -> PypelineResult<SyncReport> {
        let project = self.locator.locate(start)?;
        let source = self.filesystem.read_to_string(&project.dependency_file())?;
        let requested = parse_dependency_file(&source)?;

        let manifest = project.manifest_path();
        let (outcome, written) = merge_manifest(self.filesystem.as_ref(), &manifest, &requested)?;
        Ok(SyncReport {
            manifest,
            requested: requested.len(),
            outcome,
            written,
        })
    }

    /// Create `.venv` with a matching interpreter when missing, then install
    /// the project into it in editable mode.
    #[instrument(skip(self), fields(start = %start.display()))]
    pub fn install(&self, start: &Path) -> PypelineResult<InstallReport> {
        let project = self.locator.locate(start)?;
        let manifest = self.locator.manifest(&project)?;
        let requirement = manifest
            .requires_python()
            .map(PythonRequirement::parse)
            .transpose()?
            .unwrap_or_default();

        let interpreter = self.toolchain.detect(&requirement)?;
        info!(
            program = %interpreter.program.display(),
            version = %interpreter.version,
            requirement = %requirement,
            "Using interpreter"
        );

        let venv = project.venv_dir();
        let created_venv = !self.filesystem.exists(&venv);
        if created_venv {
            self.toolchain.create_environment(&interpreter, &venv)?;
        } else {
            debug!(venv = %venv.display(), "Reusing virtual environment");
        }

        self.toolchain.install_project(&venv, project.root())?;
        Ok(InstallReport {
            requirement: requirement.to_string(),
            interpreter,
            venv,
            created_venv,
        })
    }
}
