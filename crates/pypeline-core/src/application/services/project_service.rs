//! Project Service - the `init`, `create-pipeline` and `create-processor`
//! use cases.
//!
//! Each use case validates names first, refuses to overwrite an existing
//! destination, scaffolds the file plan, then patches the relevant aggregator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Datelike;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateStore, VersionControl},
        services::{
            dependency_service::merge_manifest, locator::ProjectLocator,
            registry_service::RegistryUpdater, scaffold_service::Scaffolder,
        },
    },
    domain::{
        Dependency, Identifier, MergeOutcome, PipelineDescriptor, ProcessorDescriptor,
        ProjectContext, ProjectMetadata, RenderContext, dependency::parse_all,
        project::toml_string, scaffold,
    },
    error::PypelineResult,
};

const INITIAL_COMMIT_MESSAGE: &str = "Initial commit (generated by pypeline)";

/// What happened to version control during `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum GitOutcome {
    Skipped,
    Committed,
    /// Repository created, initial commit failed.
    Initialized(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub root: PathBuf,
    pub package: Identifier,
    pub files: Vec<PathBuf>,
    pub markers: Vec<PathBuf>,
    pub dependencies: MergeOutcome,
    pub git: GitOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub root: PathBuf,
    pub pipeline: PipelineDescriptor,
    pub files: Vec<PathBuf>,
    pub registered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessorReport {
    pub root: PathBuf,
    pub processor: ProcessorDescriptor,
    pub files: Vec<PathBuf>,
    pub registered: bool,
}

pub struct ProjectService {
    filesystem: Arc<dyn Filesystem>,
    vcs: Arc<dyn VersionControl>,
    locator: ProjectLocator,
    scaffolder: Scaffolder,
    registry: RegistryUpdater,
}

impl ProjectService {
    pub fn new(
        filesystem: Arc<dyn Filesystem>,
        templates: Arc<dyn TemplateStore>,
        vcs: Arc<dyn VersionControl>,
    ) -> Self {
        Self {
            locator: ProjectLocator::new(Arc::clone(&filesystem)),
            scaffolder: Scaffolder::new(Arc::clone(&filesystem), templates),
            registry: RegistryUpdater::new(Arc::clone(&filesystem)),
            filesystem,
            vcs,
        }
    }

    /// Create a new project under `metadata.destination`.
    #[instrument(skip_all, fields(name = %metadata.name, destination = %metadata.destination.display()))]
    pub fn init(&self, metadata: &ProjectMetadata) -> PypelineResult<InitReport> {
        let package = metadata.validate()?;
        let defaults = parse_all(&metadata.default_dependencies)?;

        let root = metadata.destination.join(package.as_str());
        if self.filesystem.exists(&root) {
            return Err(ApplicationError::DestinationExists { path: root }.into());
        }
        info!(root = %root.display(), package = %package, "Creating project");

        let context = init_context(metadata, &package, &defaults);
        let scaffold = self.scaffolder.scaffold(
            &root,
            &scaffold::init_plan(metadata.license),
            &context,
        )?;

        let project = ProjectContext::new(&root, package.clone());
        let markers = self.scaffolder.ensure_package_markers(&[
            project.package_dir(),
            project.utils_dir(),
            project.pipelines_dir(),
            project.tests_dir(),
        ])?;

        let (dependencies, _) =
            merge_manifest(self.filesystem.as_ref(), &project.manifest_path(), &defaults)?;

        let git = if metadata.git {
            self.bootstrap_git(&root)?
        } else {
            GitOutcome::Skipped
        };

        Ok(InitReport {
            root,
            package,
            files: scaffold.files,
            markers,
            dependencies,
            git,
        })
    }

    /// Add a pipeline package and register its runner class.
    #[instrument(skip(self), fields(start = %start.display()))]
    pub fn create_pipeline(&self, start: &Path, name: &str) -> PypelineResult<PipelineReport> {
        let project = self.locator.locate(start)?;
        let pipeline = PipelineDescriptor::parse(name)?;

        let dir = project.pipeline_dir(&pipeline.identifier);
        if self.filesystem.exists(&dir) {
            return Err(ApplicationError::DestinationExists { path: dir }.into());
        }

        let context = pipeline.apply(project_context(&project));
        let scaffold =
            self.scaffolder
                .scaffold(project.root(), &scaffold::pipeline_plan(), &context)?;
        self.scaffolder
            .ensure_package_markers(&[project.pipelines_dir()])?;

        let registered = self.registry.register(
            &project.aggregator(),
            &pipeline.import_line(),
            &pipeline.class_name,
        )?;

        info!(pipeline = %pipeline.identifier, class = %pipeline.class_name, "Pipeline created");
        Ok(PipelineReport {
            root: project.root().to_path_buf(),
            pipeline,
            files: scaffold.files,
            registered,
        })
    }

    /// Add a processor to an existing pipeline and register its class.
    #[instrument(skip(self), fields(start = %start.display()))]
    pub fn create_processor(
        &self,
        start: &Path,
        name: &str,
        pipeline: &str,
    ) -> PypelineResult<ProcessorReport> {
        let project = self.locator.locate(start)?;
        let processor = ProcessorDescriptor::parse(name, pipeline)?;
        let owner = PipelineDescriptor::parse(pipeline)?;

        if !self
            .filesystem
            .is_dir(&project.pipeline_dir(&processor.pipeline))
        {
            return Err(ApplicationError::PipelineNotFound {
                name: processor.pipeline.to_string(),
            }
            .into());
        }

        let module = project
            .processors_dir(&processor.pipeline)
            .join(format!("{}.py", processor.module()));
        if self.filesystem.exists(&module) {
            return Err(ApplicationError::DestinationExists { path: module }.into());
        }

        let aggregator = project.processors_aggregator(&processor.pipeline);
        let mut plan = Vec::new();
        if !self.filesystem.exists(&aggregator) {
            warn!(path = %aggregator.display(), "Processors aggregator missing, recreating");
            plan.push(scaffold::processors_aggregator());
        }
        plan.extend(scaffold::processor_plan());

        let context = processor.apply(owner.apply(project_context(&project)));
        let scaffold = self.scaffolder.scaffold(project.root(), &plan, &context)?;
        self.scaffolder.ensure_package_markers(&[
            project.processors_dir(&processor.pipeline),
            project.pipeline_tests_dir(&processor.pipeline),
        ])?;

        let registered =
            self.registry
                .register(&aggregator, &processor.import_line(), &processor.class_name)?;

        info!(processor = %processor.identifier, pipeline = %processor.pipeline, "Processor created");
        Ok(ProcessorReport {
            root: project.root().to_path_buf(),
            processor,
            files: scaffold.files,
            registered,
        })
    }

    /// `git init`, then a best-effort initial commit.
    fn bootstrap_git(&self, root: &Path) -> PypelineResult<GitOutcome> {
        self.vcs.init(root)?;
        match self.vcs.initial_commit(root, INITIAL_COMMIT_MESSAGE) {
            Ok(()) => Ok(GitOutcome::Committed),
            Err(e) => {
                warn!(error = %e, "Initial commit failed; repository left uncommitted");
                Ok(GitOutcome::Initialized(e.to_string()))
            }
        }
    }
}

/// Variables shared by every template of a located project.
fn project_context(project: &ProjectContext) -> RenderContext {
    RenderContext::new().with_variable("package", project.package().as_str())
}

fn init_context(
    metadata: &ProjectMetadata,
    package: &Identifier,
    defaults: &[Dependency],
) -> RenderContext {
    let name = metadata.name.trim();
    let license = metadata.license;
    let dependency_list = defaults
        .iter()
        .map(|d| format!("    \"{d}\","))
        .collect::<Vec<_>>()
        .join("\n");

    RenderContext::new()
        .with_variable("project_name", name)
        .with_variable("project_name_toml", toml_string(name))
        .with_variable("package", package.as_str())
        .with_variable("package_class", package.pascal_case())
        .with_variable("description", metadata.description.trim())
        .with_variable("description_toml", toml_string(metadata.description.trim()))
        .with_variable("author_name", metadata.author_name.trim())
        .with_variable("author_name_toml", toml_string(metadata.author_name.trim()))
        .with_variable("author_email", metadata.author_email.trim())
        .with_variable("author_email_toml", toml_string(metadata.author_email.trim()))
        .with_variable("company_name", metadata.company_name.as_deref().unwrap_or(""))
        .with_variable("holder", metadata.holder())
        .with_variable("license", license.spdx_id())
        .with_variable("license_name", license.full_name())
        .with_variable("license_url", license.url().unwrap_or_default())
        .with_variable(
            "license_expression_toml",
            toml_string(license.pyproject_expression()),
        )
        .with_variable("year", chrono::Utc::now().year().to_string())
        .with_variable("cli_version", crate::VERSION)
        .with_variable("dependency_list", dependency_list)
}
