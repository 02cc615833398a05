//! Project Locator - finds the project root above a starting directory.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    application::{ApplicationError, ports::Filesystem},
    domain::{Identifier, Manifest, ProjectContext, project::MANIFEST_FILE},
    error::PypelineResult,
};

pub struct ProjectLocator {
    filesystem: Arc<dyn Filesystem>,
}

impl ProjectLocator {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Walk from `start` towards the filesystem root and return the first
    /// directory whose `pyproject.toml` carries `[tool.pypeline]`.
    ///
    /// Unreadable or unparsable manifests are skipped, not reported.
    #[instrument(skip(self), fields(start = %start.display()))]
    pub fn locate(&self, start: &Path) -> PypelineResult<ProjectContext> {
        for dir in start.ancestors() {
            let candidate = dir.join(MANIFEST_FILE);
            if !self.filesystem.exists(&candidate) {
                continue;
            }

            let manifest = match self
                .filesystem
                .read_to_string(&candidate)
                .and_then(|text| Manifest::parse(&text).map_err(Into::into))
            {
                Ok(manifest) => manifest,
                Err(e) => {
                    debug!(path = %candidate.display(), error = %e, "Skipping unreadable manifest");
                    continue;
                }
            };

            if !manifest.has_marker() {
                debug!(path = %candidate.display(), "Manifest has no [tool.pypeline] section");
                continue;
            }

            let package = Self::package_name(&manifest, dir)?;
            debug!(root = %dir.display(), package = %package, "Project located");
            return Ok(ProjectContext::new(dir, package));
        }

        Err(ApplicationError::ProjectNotFound {
            start: start.to_path_buf(),
        }
        .into())
    }

    /// Read and parse the manifest of a located project.
    pub fn manifest(&self, project: &ProjectContext) -> PypelineResult<Manifest> {
        let text = self.filesystem.read_to_string(&project.manifest_path())?;
        Ok(Manifest::parse(&text)?)
    }

    /// `[tool.pypeline].package`, else the normalized `[project].name`,
    /// else the directory name.
    fn package_name(manifest: &Manifest, dir: &Path) -> PypelineResult<Identifier> {
        let raw = manifest
            .package()
            .or_else(|| manifest.project_name())
            .map(str::to_string)
            .or_else(|| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default();
        Ok(Identifier::parse(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockFilesystem;
    use crate::error::PypelineError;
    use std::path::PathBuf;

    const MARKED: &str = "[project]\nname = \"sales-etl\"\n\n[tool.pypeline]\npackage = \"sales_etl\"\n";

    fn fs_with(files: Vec<(&'static str, &'static str)>) -> MockFilesystem {
        let mut fs = MockFilesystem::new();
        let paths: Vec<PathBuf> = files.iter().map(|(p, _)| PathBuf::from(p)).collect();
        fs.expect_exists()
            .returning(move |p| paths.iter().any(|known| known == p));
        fs.expect_read_to_string().returning(move |p| {
            files
                .iter()
                .find(|(known, _)| Path::new(known) == p)
                .map(|(_, text)| text.to_string())
                .ok_or_else(|| {
                    ApplicationError::FilesystemError {
                        path: p.to_path_buf(),
                        reason: "missing".into(),
                    }
                    .into()
                })
        });
        fs
    }

    #[test]
    fn finds_root_three_levels_up() {
        let fs = fs_with(vec![("/work/sales/pyproject.toml", MARKED)]);
        let locator = ProjectLocator::new(Arc::new(fs));

        let ctx = locator
            .locate(Path::new("/work/sales/src/sales_etl/pipelines"))
            .unwrap();
        assert_eq!(ctx.root(), Path::new("/work/sales"));
        assert_eq!(ctx.package().as_str(), "sales_etl");
    }

    #[test]
    fn skips_unmarked_and_broken_manifests() {
        let fs = fs_with(vec![
            ("/work/sales/pyproject.toml", MARKED),
            ("/work/sales/vendor/pyproject.toml", "[project]\nname = \"other\"\n"),
            ("/work/sales/vendor/lib/pyproject.toml", "[project\nbroken"),
        ]);
        let locator = ProjectLocator::new(Arc::new(fs));

        let ctx = locator.locate(Path::new("/work/sales/vendor/lib/x")).unwrap();
        assert_eq!(ctx.root(), Path::new("/work/sales"));
    }

    #[test]
    fn falls_back_to_project_name() {
        let fs = fs_with(vec![(
            "/p/pyproject.toml",
            "[project]\nname = \"My-Proj\"\n[tool.pypeline]\ncli-version = \"0.1.0\"\n",
        )]);
        let ctx = ProjectLocator::new(Arc::new(fs))
            .locate(Path::new("/p"))
            .unwrap();
        assert_eq!(ctx.package().as_str(), "my_proj");
    }

    #[test]
    fn reports_not_found_with_start() {
        let fs = fs_with(vec![]);
        let err = ProjectLocator::new(Arc::new(fs))
            .locate(Path::new("/nowhere/deep"))
            .unwrap_err();
        assert!(matches!(
            err,
            PypelineError::Application(ApplicationError::ProjectNotFound { ref start })
                if start == Path::new("/nowhere/deep")
        ));
    }
}
