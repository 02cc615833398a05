//! Build Service - packs a project into `dist/<package>-<version>.zip`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    application::{
        ports::{Archiver, Filesystem},
        services::locator::ProjectLocator,
    },
    domain::{ExclusionRules, packaging::archive_name},
    error::PypelineResult,
};

const FALLBACK_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub archive: PathBuf,
    pub version: String,
    pub entries: usize,
    pub bytes: u64,
}

pub struct BuildService {
    filesystem: Arc<dyn Filesystem>,
    archiver: Arc<dyn Archiver>,
    locator: ProjectLocator,
    rules: ExclusionRules,
}

impl BuildService {
    pub fn new(filesystem: Arc<dyn Filesystem>, archiver: Arc<dyn Archiver>) -> Self {
        Self {
            locator: ProjectLocator::new(Arc::clone(&filesystem)),
            filesystem,
            archiver,
            rules: ExclusionRules::default(),
        }
    }

    /// Clear `dist/` and write a fresh archive of the project tree.
    #[instrument(skip(self), fields(start = %start.display()))]
    pub fn build(&self, start: &Path) -> PypelineResult<BuildReport> {
        let project = self.locator.locate(start)?;
        let manifest = self.locator.manifest(&project)?;
        let version = manifest
            .project_version()
            .unwrap_or(FALLBACK_VERSION)
            .to_string();

        let dist = project.dist_dir();
        if self.filesystem.exists(&dist) {
            self.filesystem.remove_dir_all(&dist)?;
        }
        self.filesystem.create_dir_all(&dist)?;

        let archive = dist.join(archive_name(project.package().as_str(), &version));
        let summary = self.archiver.archive(project.root(), &archive, &self.rules)?;
        info!(
            archive = %archive.display(),
            entries = summary.entries,
            bytes = summary.bytes,
            "Build complete"
        );

        Ok(BuildReport {
            archive,
            version,
            entries: summary.entries,
            bytes: summary.bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ArchiveSummary, MockArchiver, MockFilesystem};

    fn fs(manifest: &'static str, dist_exists: bool) -> MockFilesystem {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(move |p| {
            p == Path::new("/p/pyproject.toml") || (dist_exists && p == Path::new("/p/dist"))
        });
        fs.expect_read_to_string()
            .returning(move |_| Ok(manifest.to_string()));
        fs.expect_create_dir_all()
            .withf(|p| p == Path::new("/p/dist"))
            .times(1)
            .returning(|_| Ok(()));
        fs
    }

    fn archiver(expected: &'static str) -> MockArchiver {
        let mut archiver = MockArchiver::new();
        archiver
            .expect_archive()
            .withf(move |root, dest, rules| {
                root == Path::new("/p") && dest == Path::new(expected) && rules.root_names.contains(&".venv".to_string())
            })
            .times(1)
            .returning(|_, _, _| Ok(ArchiveSummary { entries: 7, bytes: 512 }));
        archiver
    }

    #[test]
    fn archive_named_after_package_and_version() {
        let mut fs = fs(
            "[project]\nname = \"sales-etl\"\nversion = \"1.2.0\"\n[tool.pypeline]\npackage = \"sales_etl\"\n",
            true,
        );
        fs.expect_remove_dir_all()
            .withf(|p| p == Path::new("/p/dist"))
            .times(1)
            .returning(|_| Ok(()));

        let report = BuildService::new(Arc::new(fs), Arc::new(archiver("/p/dist/sales_etl-1.2.0.zip")))
            .build(Path::new("/p"))
            .unwrap();
        assert_eq!(report.version, "1.2.0");
        assert_eq!(report.entries, 7);
    }

    #[test]
    fn version_defaults_when_absent() {
        let mut fs = fs("[tool.pypeline]\npackage = \"sales_etl\"\n", false);
        fs.expect_remove_dir_all().never();

        let report = BuildService::new(Arc::new(fs), Arc::new(archiver("/p/dist/sales_etl-0.1.0.zip")))
            .build(Path::new("/p"))
            .unwrap();
        assert_eq!(report.version, "0.1.0");
    }
}
