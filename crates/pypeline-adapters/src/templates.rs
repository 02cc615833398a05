//! Template stores.
//!
//! Two implementations of [`TemplateStore`]:
//!
//! - [`BuiltinTemplates`] - the template set compiled into the binary from
//!   `crates/pypeline-adapters/templates/`.
//! - [`FilesystemTemplateStore`] - reads `<dir>/<id>` first and falls back
//!   to the built-in set, so a user can override single files.
//!
//! # Template ids
//!
//! Ids are slash-separated paths relative to the templates directory, e.g.
//! `pipeline/runner.py` or `license/mit`. The same id resolves to
//! `<override-dir>/pipeline/runner.py` on disk.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use pypeline_core::{
    application::{ApplicationError, ports::TemplateStore},
    error::PypelineResult,
};

use crate::filesystem::map_io_error;

// ── Built-in set ──────────────────────────────────────────────────────────────

macro_rules! builtin {
    ($($id:literal),+ $(,)?) => {
        &[$(($id, include_str!(concat!("../templates/", $id)))),+]
    };
}

static BUILTIN: &[(&str, &str)] = builtin![
    "project/pyproject.toml",
    "project/dependencies.py",
    "project/README.md",
    "project/gitignore",
    "license/mit",
    "license/bsd-2-clause",
    "license/bsd-3-clause",
    "license/unlicense",
    "license/proprietary",
    "license/notice",
    "package/__init__.py",
    "package/utils/__init__.py",
    "package/utils/session.py",
    "package/pipelines/__init__.py",
    "tests/__init__.py",
    "tests/test_package.py",
    "pipeline/__init__.py",
    "pipeline/runner.py",
    "pipeline/config.py",
    "pipeline/README.md",
    "pipeline/processors/__init__.py",
    "pipeline/tests/__init__.py",
    "processor/processor.py",
    "processor/test_processor.py",
];

/// Templates shipped with pypeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplates;

impl BuiltinTemplates {
    pub fn new() -> Self {
        Self
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> {
        BUILTIN.iter().map(|(id, _)| *id)
    }

    pub fn get(&self, id: &str) -> Option<&'static str> {
        BUILTIN
            .iter()
            .find(|(known, _)| *known == id)
            .map(|(_, body)| *body)
    }
}

impl TemplateStore for BuiltinTemplates {
    fn load(&self, id: &str) -> PypelineResult<String> {
        self.get(id)
            .map(str::to_string)
            .ok_or_else(|| ApplicationError::TemplateNotFound { id: id.to_string() }.into())
    }
}

// ── Override directory ────────────────────────────────────────────────────────

/// Reads templates from a directory, falling back to [`BuiltinTemplates`].
#[derive(Debug, Clone)]
pub struct FilesystemTemplateStore {
    root: PathBuf,
    fallback: BuiltinTemplates,
}

impl FilesystemTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fallback: BuiltinTemplates,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// On-disk location of `id`. Ids with `..` or absolute components are
    /// not resolved against the directory.
    fn path_for(&self, id: &str) -> Option<PathBuf> {
        let relative = Path::new(id);
        let safe = relative
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_)));
        safe.then(|| self.root.join(relative))
    }
}

impl TemplateStore for FilesystemTemplateStore {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn load(&self, id: &str) -> PypelineResult<String> {
        if let Some(path) = self.path_for(id).filter(|p| p.is_file()) {
            debug!(path = %path.display(), "Using template override");
            return std::fs::read_to_string(&path).map_err(|e| map_io_error(&path, e, "read template"));
        }
        self.fallback.load(id)
    }
}
