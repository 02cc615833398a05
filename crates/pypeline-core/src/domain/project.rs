//! Project layout and the descriptors that drive generation.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::naming::Identifier;
use crate::domain::{DomainError, License, RenderContext};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("e-mail pattern is a valid regex")
});

pub const MANIFEST_FILE: &str = "pyproject.toml";
pub const DEPENDENCY_FILE: &str = "dependencies.py";
pub const PACKAGE_MARKER: &str = "__init__.py";

/// Role suffixes for generated class names.
pub const PIPELINE_SUFFIX: &str = "Pipeline";
pub const PROCESSOR_SUFFIX: &str = "Processor";

/// Check `local@domain.tld`.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    if EMAIL.is_match(email.trim()) {
        Ok(())
    } else {
        Err(DomainError::InvalidEmail {
            email: email.to_string(),
        })
    }
}

/// Located project: the root plus the import package name.
///
/// All paths are derived from these two values; nothing is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    root: PathBuf,
    package: Identifier,
}

impl ProjectContext {
    pub fn new(root: impl Into<PathBuf>, package: Identifier) -> Self {
        Self {
            root: root.into(),
            package,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn package(&self) -> &Identifier {
        &self.package
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn dependency_file(&self) -> PathBuf {
        self.root.join(DEPENDENCY_FILE)
    }

    pub fn package_dir(&self) -> PathBuf {
        self.root.join("src").join(self.package.as_str())
    }

    /// The package's `__init__.py`, which registers every pipeline.
    pub fn aggregator(&self) -> PathBuf {
        self.package_dir().join(PACKAGE_MARKER)
    }

    pub fn utils_dir(&self) -> PathBuf {
        self.package_dir().join("utils")
    }

    pub fn pipelines_dir(&self) -> PathBuf {
        self.package_dir().join("pipelines")
    }

    pub fn pipeline_dir(&self, pipeline: &Identifier) -> PathBuf {
        self.pipelines_dir().join(pipeline.as_str())
    }

    pub fn processors_dir(&self, pipeline: &Identifier) -> PathBuf {
        self.pipeline_dir(pipeline).join("processors")
    }

    pub fn processors_aggregator(&self, pipeline: &Identifier) -> PathBuf {
        self.processors_dir(pipeline).join(PACKAGE_MARKER)
    }

    pub fn pipeline_tests_dir(&self, pipeline: &Identifier) -> PathBuf {
        self.pipeline_dir(pipeline).join("tests")
    }

    pub fn tests_dir(&self) -> PathBuf {
        self.root.join("tests")
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.root.join("dist")
    }

    pub fn venv_dir(&self) -> PathBuf {
        self.root.join(".venv")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineDescriptor {
    pub name: String,
    pub identifier: Identifier,
    pub class_name: String,
}

impl PipelineDescriptor {
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        let identifier = Identifier::parse(name)?;
        let class_name = identifier.class_name(PIPELINE_SUFFIX);
        Ok(Self {
            name: name.trim().to_string(),
            identifier,
            class_name,
        })
    }

    pub fn module(&self) -> String {
        format!("{}_runner", self.identifier)
    }

    /// Line registered in the package aggregator.
    pub fn import_line(&self) -> String {
        format!(
            "from .pipelines.{}.{} import {}",
            self.identifier,
            self.module(),
            self.class_name
        )
    }

    pub fn apply(&self, ctx: RenderContext) -> RenderContext {
        ctx.with_variable("pipeline", self.identifier.as_str())
            .with_variable("pipeline_name", self.name.as_str())
            .with_variable("pipeline_class", self.class_name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessorDescriptor {
    pub name: String,
    pub identifier: Identifier,
    pub class_name: String,
    pub pipeline: Identifier,
}

impl ProcessorDescriptor {
    pub fn parse(name: &str, pipeline: &str) -> Result<Self, DomainError> {
        let identifier = Identifier::parse(name)?;
        let pipeline = Identifier::parse(pipeline)?;
        let class_name = identifier.class_name(PROCESSOR_SUFFIX);
        Ok(Self {
            name: name.trim().to_string(),
            identifier,
            class_name,
            pipeline,
        })
    }

    pub fn module(&self) -> String {
        format!("{}_processor", self.identifier)
    }

    /// Line registered in the pipeline's `processors/__init__.py`.
    pub fn import_line(&self) -> String {
        format!("from .{} import {}", self.module(), self.class_name)
    }

    pub fn apply(&self, ctx: RenderContext) -> RenderContext {
        ctx.with_variable("processor", self.identifier.as_str())
            .with_variable("processor_name", self.name.as_str())
            .with_variable("processor_class", self.class_name.as_str())
            .with_variable("pipeline", self.pipeline.as_str())
    }
}

/// Input to `init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetadata {
    pub name: String,
    pub author_name: String,
    pub author_email: String,
    pub description: String,
    pub license: License,
    pub company_name: Option<String>,
    pub destination: PathBuf,
    pub git: bool,
    pub default_dependencies: Vec<String>,
}

impl ProjectMetadata {
    /// Validate the name and e-mail; returns the package identifier.
    pub fn validate(&self) -> Result<Identifier, DomainError> {
        let package = Identifier::parse(&self.name)?;
        validate_email(&self.author_email)?;
        Ok(package)
    }

    /// Copyright holder: the company when given, otherwise the author.
    pub fn holder(&self) -> &str {
        self.company_name
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(self.author_name.as_str())
    }
}

/// Quote a value as a TOML basic string, escapes included.
pub fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
