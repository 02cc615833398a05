//! `pyproject.toml` access.
//!
//! The manifest is held as a `toml::Table` (insertion-ordered via the
//! `preserve_order` feature), so rewriting it keeps every table and key the
//! user had in place. Only `[project].dependencies` is ever modified.

use toml::{Table, Value};

use crate::domain::DomainError;
use crate::domain::dependency::{Dependency, DependencySet, MergeOutcome};

/// Section whose presence marks a directory as a pypeline project.
pub const MARKER_TABLE: &str = "pypeline";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    table: Table,
}

impl Manifest {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn parse(source: &str) -> Result<Self, DomainError> {
        let table = toml::from_str::<Table>(source).map_err(|e| DomainError::MalformedManifest {
            reason: e.to_string().trim().to_string(),
        })?;
        Ok(Self { table })
    }

    /// `true` when `[tool.pypeline]` exists and is a table.
    pub fn has_marker(&self) -> bool {
        self.marker().is_some()
    }

    fn marker(&self) -> Option<&Table> {
        self.table
            .get("tool")?
            .as_table()?
            .get(MARKER_TABLE)?
            .as_table()
    }

    fn project(&self) -> Option<&Table> {
        self.table.get("project")?.as_table()
    }

    fn project_str(&self, key: &str) -> Option<&str> {
        self.project()?.get(key)?.as_str()
    }

    /// `[tool.pypeline].package`
    pub fn package(&self) -> Option<&str> {
        self.marker()?.get("package")?.as_str()
    }

    /// `[tool.pypeline].cli-version`
    pub fn cli_version(&self) -> Option<&str> {
        self.marker()?.get("cli-version")?.as_str()
    }

    pub fn project_name(&self) -> Option<&str> {
        self.project_str("name")
    }

    pub fn project_version(&self) -> Option<&str> {
        self.project_str("version")
    }

    pub fn requires_python(&self) -> Option<&str> {
        self.project_str("requires-python")
    }

    /// Raw strings of `[project].dependencies`; absent means empty.
    pub fn dependencies(&self) -> Result<Vec<String>, DomainError> {
        let Some(value) = self.project().and_then(|p| p.get("dependencies")) else {
            return Ok(Vec::new());
        };
        let array = value.as_array().ok_or_else(|| DomainError::MalformedManifest {
            reason: "[project].dependencies must be an array of strings".into(),
        })?;
        array
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| DomainError::MalformedManifest {
                        reason: format!("dependency entry {v} is not a string"),
                    })
            })
            .collect()
    }

    /// Replace `[project].dependencies`, creating `[project]` if needed.
    pub fn set_dependencies(&mut self, dependencies: Vec<String>) -> Result<(), DomainError> {
        let project = self
            .table
            .entry("project")
            .or_insert(Value::Table(Table::new()));
        let project = project
            .as_table_mut()
            .ok_or_else(|| DomainError::MalformedManifest {
                reason: "[project] is not a table".into(),
            })?;
        project.insert(
            "dependencies".to_string(),
            Value::Array(dependencies.into_iter().map(Value::String).collect()),
        );
        Ok(())
    }

    /// Merge `incoming` into `[project].dependencies` (last write wins).
    ///
    /// The list is rewritten whenever the deduplicated result differs from
    /// what the manifest held, so repeated names never survive a merge.
    pub fn merge_dependencies(
        &mut self,
        incoming: &[Dependency],
    ) -> Result<MergeOutcome, DomainError> {
        let existing = self.dependencies()?;
        let mut set = DependencySet::from_existing(&existing);
        let outcome = set.merge(incoming);
        let merged = set.to_vec();
        if merged != existing {
            self.set_dependencies(merged)?;
        }
        Ok(outcome)
    }

    pub fn to_toml_string(&self) -> Result<String, DomainError> {
        toml::to_string_pretty(&self.table).map_err(|e| DomainError::MalformedManifest {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dependency::parse_all;

    const SAMPLE: &str = r#"
[build-system]
requires = ["hatchling"]
build-backend = "hatchling.build"

[project]
name = "sales-etl"
version = "0.2.0"
requires-python = ">=3.11"
dependencies = ["pandas>=2.0", "numpy"]

[tool.pypeline]
package = "sales_etl"
cli-version = "0.1.0"

[tool.ruff]
line-length = 100
"#;

    #[test]
    fn reads_marker_and_metadata() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        assert!(manifest.has_marker());
        assert_eq!(manifest.package(), Some("sales_etl"));
        assert_eq!(manifest.cli_version(), Some("0.1.0"));
        assert_eq!(manifest.project_name(), Some("sales-etl"));
        assert_eq!(manifest.project_version(), Some("0.2.0"));
        assert_eq!(manifest.requires_python(), Some(">=3.11"));
        assert_eq!(manifest.dependencies().unwrap(), vec!["pandas>=2.0", "numpy"]);
    }

    #[test]
    fn plain_pyproject_has_no_marker() {
        let manifest = Manifest::parse("[project]\nname = \"x\"\n").unwrap();
        assert!(!manifest.has_marker());
        let scalar = Manifest::parse("[tool]\npypeline = 1\n").unwrap();
        assert!(!scalar.has_marker());
    }

    #[test]
    fn malformed_toml_is_reported() {
        assert!(matches!(
            Manifest::parse("[project\nname ="),
            Err(DomainError::MalformedManifest { .. })
        ));
    }

    #[test]
    fn merge_leaves_other_sections_untouched() {
        let mut manifest = Manifest::parse(SAMPLE).unwrap();
        let outcome = manifest
            .merge_dependencies(&parse_all(&["pandas>=2.3.3", "ruff==0.14.9"]).unwrap())
            .unwrap();
        assert_eq!(outcome.updated, vec!["pandas"]);
        assert_eq!(outcome.added, vec!["ruff"]);

        let reparsed = Manifest::parse(&manifest.to_toml_string().unwrap()).unwrap();
        assert_eq!(
            reparsed.dependencies().unwrap(),
            vec!["pandas>=2.3.3", "numpy", "ruff==0.14.9"]
        );
        assert_eq!(reparsed.package(), Some("sales_etl"));

        let text = manifest.to_toml_string().unwrap();
        let build = text.find("[build-system]").unwrap();
        let project = text.find("[project]").unwrap();
        let ruff = text.find("[tool.ruff]").unwrap();
        assert!(build < project && project < ruff);
        assert!(text.contains("line-length = 100"));
    }

    #[test]
    fn empty_manifest_gains_project_dependencies() {
        let mut manifest = Manifest::empty();
        manifest
            .merge_dependencies(&parse_all(&["a>=1.0", "b==2.0"]).unwrap())
            .unwrap();
        assert_eq!(manifest.dependencies().unwrap(), vec!["a>=1.0", "b==2.0"]);
    }

    #[test]
    fn repeated_names_are_folded_on_any_merge() {
        let source = "[project]\ndependencies = [\"pandas>=1.0\", \"Pandas==2.0\"]\n";

        let mut manifest = Manifest::parse(source).unwrap();
        let outcome = manifest
            .merge_dependencies(&parse_all(&["Pandas==2.0"]).unwrap())
            .unwrap();
        assert_eq!(manifest.dependencies().unwrap(), vec!["Pandas==2.0"]);
        assert_eq!(outcome.collapsed, vec!["pandas"]);
        assert!(!outcome.is_unchanged());

        let mut manifest = Manifest::parse(source).unwrap();
        let outcome = manifest
            .merge_dependencies(&parse_all(&["numpy"]).unwrap())
            .unwrap();
        assert_eq!(manifest.dependencies().unwrap(), vec!["Pandas==2.0", "numpy"]);
        assert_eq!(outcome.added, vec!["numpy"]);
        assert_eq!(outcome.collapsed, vec!["pandas"]);
    }

    #[test]
    fn non_string_dependency_is_malformed() {
        let manifest = Manifest::parse("[project]\ndependencies = [1]\n").unwrap();
        assert!(manifest.dependencies().is_err());
    }
}
