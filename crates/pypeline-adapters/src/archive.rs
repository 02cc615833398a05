//! Zip archiver for `pypeline build`.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use pypeline_core::{
    application::{
        ApplicationError,
        ports::{ArchiveSummary, Archiver},
    },
    domain::ExclusionRules,
    error::{PypelineError, PypelineResult},
};

use crate::filesystem::map_io_error;

/// Writes deflated zip archives with `/`-separated entry names relative to
/// the archived root. Entries are added in file-name order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

impl ZipArchiver {
    pub fn new() -> Self {
        Self
    }

    fn files(root: &Path, destination: &Path, rules: &ExclusionRules) -> PypelineResult<Vec<(PathBuf, String)>> {
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry
                    .path()
                    .strip_prefix(root)
                    .map(|relative| relative.as_os_str().is_empty() || !rules.is_excluded(relative))
                    .unwrap_or(false)
            });

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| ApplicationError::FilesystemError {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()),
                reason: e.to_string(),
            })?;
            if !entry.file_type().is_file() || entry.path() == destination {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| PypelineError::Internal { message: e.to_string() })?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push((entry.path().to_path_buf(), name));
        }
        Ok(files)
    }
}

impl Archiver for ZipArchiver {
    #[instrument(skip(self, rules), fields(root = %root.display(), destination = %destination.display()))]
    fn archive(
        &self,
        root: &Path,
        destination: &Path,
        rules: &ExclusionRules,
    ) -> PypelineResult<ArchiveSummary> {
        let files = Self::files(root, destination, rules)?;
        let zip_error = |e: zip::result::ZipError| -> PypelineError {
            ApplicationError::FilesystemError {
                path: destination.to_path_buf(),
                reason: format!("Failed to write archive: {e}"),
            }
            .into()
        };

        let out = File::create(destination).map_err(|e| map_io_error(destination, e, "create archive"))?;
        let mut zip = ZipWriter::new(out);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (path, name) in &files {
            zip.start_file(name.as_str(), options).map_err(zip_error)?;
            let mut source = File::open(path).map_err(|e| map_io_error(path, e, "open file"))?;
            io::copy(&mut source, &mut zip).map_err(|e| map_io_error(path, e, "archive file"))?;
            debug!(entry = %name, "Archived");
        }
        zip.finish().map_err(zip_error)?;

        let bytes = std::fs::metadata(destination)
            .map_err(|e| map_io_error(destination, e, "stat archive"))?
            .len();
        Ok(ArchiveSummary {
            entries: files.len(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, relative).unwrap();
    }

    fn entry_names(archive: &Path) -> Vec<String> {
        let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn excluded_paths_are_left_out() {
        let project = TempDir::new().unwrap();
        let root = project.path();
        for file in [
            "pyproject.toml",
            "src/pkg/__init__.py",
            "src/pkg/__pycache__/x.cpython-312.pyc",
            "src/pkg/stale.pyc",
            ".git/HEAD",
            ".venv/bin/python",
            "pkg.egg-info/PKG-INFO",
        ] {
            touch(root, file);
        }
        fs::create_dir_all(root.join("dist")).unwrap();
        let destination = root.join("dist/pkg-0.1.0.zip");

        let summary = ZipArchiver::new()
            .archive(root, &destination, &ExclusionRules::default())
            .unwrap();

        assert_eq!(summary.entries, 2);
        assert!(summary.bytes > 0);
        assert_eq!(
            entry_names(&destination),
            vec!["pyproject.toml".to_string(), "src/pkg/__init__.py".to_string()]
        );
    }

    #[test]
    fn pipeline_named_like_an_artifact_dir_is_packaged() {
        let project = TempDir::new().unwrap();
        let root = project.path();
        for file in [
            "pyproject.toml",
            "build/lib/stale.py",
            "src/pkg/pipelines/build/build_runner.py",
            "src/pkg/pipelines/dist/config.py",
        ] {
            touch(root, file);
        }
        fs::create_dir_all(root.join("dist")).unwrap();
        let destination = root.join("dist/pkg-0.1.0.zip");

        ZipArchiver::new()
            .archive(root, &destination, &ExclusionRules::default())
            .unwrap();

        assert_eq!(
            entry_names(&destination),
            vec![
                "pyproject.toml".to_string(),
                "src/pkg/pipelines/build/build_runner.py".to_string(),
                "src/pkg/pipelines/dist/config.py".to_string(),
            ]
        );
    }

    #[test]
    fn unwritable_destination_is_filesystem_error() {
        let project = TempDir::new().unwrap();
        touch(project.path(), "a.py");
        let err = ZipArchiver::new()
            .archive(
                project.path(),
                &project.path().join("missing-dir/out.zip"),
                &ExclusionRules::default(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            PypelineError::Application(ApplicationError::FilesystemError { .. })
        ));
    }
}
