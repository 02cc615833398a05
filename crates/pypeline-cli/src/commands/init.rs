//! Implementation of the `pypeline init` command.
//!
//! Responsibility: resolve every project field (flag, then config default,
//! then an interactive prompt), call the core project service, and display
//! results. No business logic lives here.

use std::io::IsTerminal;
use std::path::PathBuf;

use tracing::{debug, info, instrument};

use pypeline_core::{
    application::{GitOutcome, InitReport},
    domain::{License, ProjectMetadata},
    error::PypelineError,
};

use crate::{
    cli::{InitArgs, OutputFormat},
    commands::{project_service, working_dir},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute `pypeline init`.
///
/// 1. Resolve fields from flags, config and prompts
/// 2. Create the project through `ProjectService::init`
/// 3. Report created files, git status and next steps
#[instrument(skip_all)]
pub fn execute(args: InitArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let prompter = Prompter::new(&output);
    let metadata = resolve_metadata(args, &config, &prompter)?;
    debug!(?metadata, "Init fields resolved");

    output.header(&format!("Creating '{}'...", metadata.name))?;
    let report = project_service(&config).init(&metadata)?;
    info!(root = %report.root.display(), "Project created");

    if output.report(&report)? {
        return Ok(());
    }
    print_summary(&report, &output)
}

fn resolve_metadata(
    args: InitArgs,
    config: &AppConfig,
    prompter: &Prompter,
) -> CliResult<ProjectMetadata> {
    let defaults = &config.defaults;
    let git = args.git_flag().unwrap_or(defaults.git);

    let name = required(args.name, None, "--name", "Project name", prompter)?;
    let author_name = required(
        args.author_name,
        defaults.author_name.clone(),
        "--author-name",
        "Author name",
        prompter,
    )?;
    let author_email = required(
        args.author_email,
        defaults.author_email.clone(),
        "--author-email",
        "Author e-mail",
        prompter,
    )?;
    let description = required(
        args.description,
        None,
        "--description",
        "Description",
        prompter,
    )?;
    let license = args.license.unwrap_or_else(|| defaults.license.clone());
    let license: License = license.parse().map_err(PypelineError::from)?;

    let destination = match args.destination.or_else(|| defaults.destination.clone()) {
        Some(dir) => dir,
        None => working_dir()?,
    };

    Ok(ProjectMetadata {
        name,
        author_name,
        author_email,
        description,
        license,
        company_name: args.company_name.or_else(|| defaults.company_name.clone()),
        destination,
        git,
        default_dependencies: config.dependencies.defaults.clone(),
    })
}

/// Flag value, else config value, else a prompt, else `MissingField`.
fn required(
    flag_value: Option<String>,
    configured: Option<String>,
    flag: &'static str,
    label: &str,
    prompter: &Prompter,
) -> CliResult<String> {
    let given = flag_value
        .or(configured)
        .filter(|value| !value.trim().is_empty());
    if let Some(value) = given {
        return Ok(value);
    }
    match prompter.ask(label)? {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CliError::MissingField { flag }),
    }
}

// ── Prompting ─────────────────────────────────────────────────────────────────

/// Asks for missing fields when stdin is a terminal and output is for humans.
struct Prompter {
    #[cfg_attr(not(feature = "interactive"), allow(dead_code))]
    enabled: bool,
}

impl Prompter {
    fn new(output: &OutputManager) -> Self {
        let enabled = cfg!(feature = "interactive")
            && !output.is_quiet()
            && output.format() != OutputFormat::Json
            && std::io::stdin().is_terminal();
        Self { enabled }
    }

    #[cfg(feature = "interactive")]
    fn ask(&self, label: &str) -> CliResult<Option<String>> {
        if !self.enabled {
            return Ok(None);
        }
        dialoguer::Input::<String>::new()
            .with_prompt(label)
            .interact_text()
            .map(Some)
            .map_err(prompt_error)
    }

    #[cfg(not(feature = "interactive"))]
    fn ask(&self, _label: &str) -> CliResult<Option<String>> {
        Ok(None)
    }
}

#[cfg(feature = "interactive")]
fn prompt_error(err: dialoguer::Error) -> CliError {
    match err {
        dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => {
            CliError::Cancelled
        }
        dialoguer::Error::IO(e) => CliError::IoError {
            message: "Failed to read from the terminal".into(),
            source: e,
        },
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_summary(report: &InitReport, output: &OutputManager) -> CliResult<()> {
    output.created(&report.root, &report.files)?;
    output.created(&report.root, &report.markers)?;
    output.success(&format!(
        "Project '{}' created at {}",
        report.package,
        report.root.display()
    ))?;

    if !report.dependencies.added.is_empty() {
        output.info(&format!(
            "{} default dependencies added to pyproject.toml",
            report.dependencies.added.len()
        ))?;
    }

    match &report.git {
        GitOutcome::Skipped => {}
        GitOutcome::Committed => output.info("Initialized git repository with an initial commit")?,
        GitOutcome::Initialized(reason) => output.warning(&format!(
            "Initialized git repository, but the initial commit failed: {reason}"
        ))?,
    }

    output.print("")?;
    output.print("Next steps:")?;
    output.print(&format!("  cd {}", display_dir(&report.root)))?;
    output.print("  pypeline create-pipeline --name <pipeline>")?;
    output.print("  pypeline install")?;
    Ok(())
}

fn display_dir(root: &std::path::Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| root.strip_prefix(cwd).ok().map(PathBuf::from));
    relative.unwrap_or_else(|| root.to_path_buf()).display().to_string()
}
