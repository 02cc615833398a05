//! What goes into a build archive.

use std::path::{Component, Path};

use serde::Serialize;

/// Paths left out of build archives.
///
/// Paths are relative to the project root. `root_names` only match the first
/// component, so a pipeline called `build` or `dist` is still packaged.
/// `names` and `suffixes` match a component at any depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExclusionRules {
    pub root_names: Vec<String>,
    pub names: Vec<String>,
    pub suffixes: Vec<String>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self {
            root_names: [".venv", "venv", "dist", "build"]
                .into_iter()
                .map(String::from)
                .collect(),
            names: [
                ".git",
                "__pycache__",
                ".pytest_cache",
                ".ruff_cache",
                ".mypy_cache",
                ".DS_Store",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            suffixes: [".egg-info", ".pyc", ".pyo"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ExclusionRules {
    pub fn is_excluded(&self, relative: &Path) -> bool {
        let mut names = relative.components().filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        });

        let Some(first) = names.next() else {
            return false;
        };
        if self.root_names.iter().any(|n| *n == first) {
            return true;
        }
        std::iter::once(first).chain(names).any(|name| {
            self.names.iter().any(|n| *n == name)
                || self.suffixes.iter().any(|s| name.ends_with(s.as_str()))
        })
    }
}

/// `dist/<package>-<version>.zip`
pub fn archive_name(package: &str, version: &str) -> String {
    format!("{package}-{version}.zip")
}
