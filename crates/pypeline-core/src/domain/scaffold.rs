//! File plans: which template goes where, and what it needs.

use serde::Serialize;

use crate::domain::{DomainError, License, RenderContext};

/// Template id of a pipeline's `processors/__init__.py`.
pub const PROCESSORS_AGGREGATOR_TEMPLATE: &str = "pipeline/processors/__init__.py";

/// One file to generate.
///
/// `destination` is relative to the project root and may contain
/// placeholders (`src/${package}/__init__.py`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaffoldFile {
    pub template: String,
    pub destination: String,
    pub required: Vec<String>,
}

impl ScaffoldFile {
    pub fn new(template: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            destination: destination.into(),
            required: Vec::new(),
        }
    }

    #[must_use]
    pub fn requires(mut self, names: &[&str]) -> Self {
        self.required.extend(names.iter().map(|n| (*n).to_string()));
        self
    }

    /// First required variable missing from `ctx`.
    pub fn check(&self, ctx: &RenderContext) -> Result<(), DomainError> {
        match self.required.iter().find(|name| !ctx.contains(name)) {
            Some(name) => Err(DomainError::MissingVariable { name: name.clone() }),
            None => Ok(()),
        }
    }

    pub fn render_destination(&self, ctx: &RenderContext) -> Result<String, DomainError> {
        ctx.render(&self.destination)
    }
}

const PROJECT_VARS: &[&str] = &["project_name", "package"];

/// Files written by `init`.
pub fn init_plan(license: License) -> Vec<ScaffoldFile> {
    vec![
        ScaffoldFile::new("project/pyproject.toml", "pyproject.toml").requires(&[
            "project_name_toml",
            "package",
            "description_toml",
            "author_name_toml",
            "author_email_toml",
            "license_expression_toml",
            "cli_version",
        ]),
        ScaffoldFile::new("project/dependencies.py", "dependencies.py")
            .requires(&["dependency_list"]),
        ScaffoldFile::new("project/README.md", "README.md")
            .requires(PROJECT_VARS)
            .requires(&["description", "license"]),
        ScaffoldFile::new(license.template_id(), "LICENSE").requires(&["year", "holder"]),
        ScaffoldFile::new("project/gitignore", ".gitignore"),
        ScaffoldFile::new("package/__init__.py", "src/${package}/__init__.py")
            .requires(PROJECT_VARS),
        ScaffoldFile::new("package/utils/__init__.py", "src/${package}/utils/__init__.py"),
        ScaffoldFile::new("package/utils/session.py", "src/${package}/utils/session.py"),
        ScaffoldFile::new(
            "package/pipelines/__init__.py",
            "src/${package}/pipelines/__init__.py",
        ),
        ScaffoldFile::new("tests/__init__.py", "tests/__init__.py"),
        ScaffoldFile::new("tests/test_package.py", "tests/test_${package}.py")
            .requires(PROJECT_VARS),
    ]
}

const PIPELINE_DIR: &str = "src/${package}/pipelines/${pipeline}";

/// Files written by `create-pipeline`.
pub fn pipeline_plan() -> Vec<ScaffoldFile> {
    let at = |file: &str| format!("{PIPELINE_DIR}/{file}");
    let vars = ["package", "pipeline", "pipeline_name", "pipeline_class"];
    vec![
        ScaffoldFile::new("pipeline/__init__.py", at("__init__.py")).requires(&vars),
        ScaffoldFile::new("pipeline/runner.py", at("${pipeline}_runner.py")).requires(&vars),
        ScaffoldFile::new("pipeline/config.py", at("config.py")).requires(&vars),
        ScaffoldFile::new("pipeline/README.md", at("README.md")).requires(&vars),
        processors_aggregator(),
        ScaffoldFile::new("pipeline/tests/__init__.py", at("tests/__init__.py")),
    ]
}

pub fn processors_aggregator() -> ScaffoldFile {
    ScaffoldFile::new(
        PROCESSORS_AGGREGATOR_TEMPLATE,
        format!("{PIPELINE_DIR}/processors/__init__.py"),
    )
    .requires(&["package", "pipeline"])
}

/// Files written by `create-processor`.
pub fn processor_plan() -> Vec<ScaffoldFile> {
    let vars = [
        "package",
        "pipeline",
        "processor",
        "processor_name",
        "processor_class",
    ];
    vec![
        ScaffoldFile::new(
            "processor/processor.py",
            format!("{PIPELINE_DIR}/processors/${{processor}}_processor.py"),
        )
        .requires(&vars),
        ScaffoldFile::new(
            "processor/test_processor.py",
            format!("{PIPELINE_DIR}/tests/test_${{processor}}_processor.py"),
        )
        .requires(&vars),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_reports_missing_required_variable() {
        let file = ScaffoldFile::new("t", "x").requires(&["a", "b"]);
        let ctx = RenderContext::new().with_variable("a", "1");
        assert_eq!(
            file.check(&ctx),
            Err(DomainError::MissingVariable { name: "b".into() })
        );
    }

    #[test]
    fn destinations_render_with_descriptor_variables() {
        let ctx = RenderContext::new()
            .with_variable("package", "sales")
            .with_variable("pipeline", "daily")
            .with_variable("processor", "clean");
        let paths: Vec<String> = processor_plan()
            .iter()
            .map(|f| f.render_destination(&ctx).unwrap())
            .collect();
        assert_eq!(
            paths,
            vec![
                "src/sales/pipelines/daily/processors/clean_processor.py",
                "src/sales/pipelines/daily/tests/test_clean_processor.py",
            ]
        );
    }

    #[test]
    fn init_plan_uses_license_template() {
        let plan = init_plan(License::Gpl3);
        assert!(plan.iter().any(|f| f.template == "license/notice" && f.destination == "LICENSE"));
        let plan = init_plan(License::Mit);
        assert!(plan.iter().any(|f| f.template == "license/mit"));
    }
}
