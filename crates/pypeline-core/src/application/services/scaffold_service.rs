//! Scaffolder - renders file plans onto the filesystem.
//!
//! Scaffolding runs in two passes:
//! 1. Check required variables, load and render every template in memory
//! 2. Create parent directories and write each file, overwriting
//!
//! A missing variable or template therefore fails before anything is
//! written. A write failure part way through leaves earlier files in place.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    application::ports::{Filesystem, TemplateStore},
    domain::{RenderContext, ScaffoldFile, project::PACKAGE_MARKER},
    error::PypelineResult,
};

/// Files written by one scaffold run, in plan order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScaffoldReport {
    pub files: Vec<PathBuf>,
}

impl ScaffoldReport {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

pub struct Scaffolder {
    filesystem: Arc<dyn Filesystem>,
    templates: Arc<dyn TemplateStore>,
}

impl Scaffolder {
    pub fn new(filesystem: Arc<dyn Filesystem>, templates: Arc<dyn TemplateStore>) -> Self {
        Self {
            filesystem,
            templates,
        }
    }

    #[instrument(skip_all, fields(root = %root.display(), files = files.len()))]
    pub fn scaffold(
        &self,
        root: &Path,
        files: &[ScaffoldFile],
        context: &RenderContext,
    ) -> PypelineResult<ScaffoldReport> {
        let rendered = self.render_all(root, files, context)?;

        let mut report = ScaffoldReport::default();
        for (path, content) in rendered {
            if let Some(parent) = path.parent() {
                self.filesystem.create_dir_all(parent)?;
            }
            self.filesystem.write_file(&path, &content)?;
            info!(path = %path.display(), "Created file");
            report.files.push(path);
        }
        Ok(report)
    }

    fn render_all(
        &self,
        root: &Path,
        files: &[ScaffoldFile],
        context: &RenderContext,
    ) -> PypelineResult<Vec<(PathBuf, String)>> {
        for file in files {
            file.check(context)?;
        }

        files
            .iter()
            .map(|file| {
                let destination = root.join(file.render_destination(context)?);
                let template = self.templates.load(&file.template)?;
                let content = context.render(&template)?;
                debug!(template = %file.template, path = %destination.display(), "Rendered");
                Ok((destination, content))
            })
            .collect()
    }

    /// Create an empty `__init__.py` in each directory that lacks one.
    ///
    /// Returns the markers that were created.
    pub fn ensure_package_markers(&self, dirs: &[PathBuf]) -> PypelineResult<Vec<PathBuf>> {
        let mut created = Vec::new();
        for dir in dirs {
            let marker = dir.join(PACKAGE_MARKER);
            if self.filesystem.exists(&marker) {
                continue;
            }
            self.filesystem.create_dir_all(dir)?;
            self.filesystem.write_file(&marker, "")?;
            info!(path = %marker.display(), "Created package marker");
            created.push(marker);
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use crate::application::ports::{MockFilesystem, MockTemplateStore};
    use crate::domain::DomainError;
    use crate::error::PypelineError;

    fn store() -> MockTemplateStore {
        let mut store = MockTemplateStore::new();
        store.expect_load().returning(|id| match id {
            "greeting" => Ok("Hello $name\n".to_string()),
            other => Err(ApplicationError::TemplateNotFound { id: other.into() }.into()),
        });
        store
    }

    #[test]
    fn writes_rendered_files_and_reports_them() {
        let mut fs = MockFilesystem::new();
        fs.expect_create_dir_all()
            .withf(|path| path == Path::new("/p/out"))
            .times(1)
            .returning(|_| Ok(()));
        fs.expect_write_file()
            .withf(|path, content| path == Path::new("/p/out/World.txt") && content == "Hello World\n")
            .times(1)
            .returning(|_, _| Ok(()));

        let scaffolder = Scaffolder::new(Arc::new(fs), Arc::new(store()));
        let ctx = RenderContext::new().with_variable("name", "World");
        let plan = [ScaffoldFile::new("greeting", "out/${name}.txt").requires(&["name"])];

        let report = scaffolder.scaffold(Path::new("/p"), &plan, &ctx).unwrap();
        assert_eq!(report.files, vec![PathBuf::from("/p/out/World.txt")]);
    }

    #[test]
    fn missing_variable_writes_nothing() {
        let mut fs = MockFilesystem::new();
        fs.expect_write_file().never();
        fs.expect_create_dir_all().never();

        let scaffolder = Scaffolder::new(Arc::new(fs), Arc::new(store()));
        let plan = [
            ScaffoldFile::new("greeting", "a.txt"),
            ScaffoldFile::new("greeting", "b.txt").requires(&["name"]),
        ];

        let err = scaffolder
            .scaffold(Path::new("/p"), &plan, &RenderContext::new())
            .unwrap_err();
        assert!(matches!(
            err,
            PypelineError::Domain(DomainError::MissingVariable { .. })
        ));
    }

    #[test]
    fn unknown_template_writes_nothing() {
        let mut fs = MockFilesystem::new();
        fs.expect_write_file().never();

        let scaffolder = Scaffolder::new(Arc::new(fs), Arc::new(store()));
        let ctx = RenderContext::new().with_variable("name", "x");
        let plan = [
            ScaffoldFile::new("greeting", "a.txt"),
            ScaffoldFile::new("nope", "b.txt"),
        ];

        let err = scaffolder.scaffold(Path::new("/p"), &plan, &ctx).unwrap_err();
        assert!(matches!(
            err,
            PypelineError::Application(ApplicationError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn package_markers_skip_existing() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists()
            .returning(|p| p == Path::new("/p/a/__init__.py"));
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file()
            .withf(|path, content| path == Path::new("/p/b/__init__.py") && content.is_empty())
            .times(1)
            .returning(|_, _| Ok(()));

        let scaffolder = Scaffolder::new(Arc::new(fs), Arc::new(store()));
        let created = scaffolder
            .ensure_package_markers(&[PathBuf::from("/p/a"), PathBuf::from("/p/b")])
            .unwrap();
        assert_eq!(created, vec![PathBuf::from("/p/b/__init__.py")]);
    }
}
