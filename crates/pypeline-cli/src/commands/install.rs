//! `pypeline install`: create `.venv` and install the project into it.

use tracing::{info, instrument};

use crate::{
    commands::{dependency_service, working_dir},
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(output: OutputManager) -> CliResult<()> {
    let start = working_dir()?;

    let spinner = output.spinner("Installing project into .venv...");
    let result = dependency_service().install(&start);
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let report = result?;
    info!(interpreter = %report.interpreter.program.display(), "Install finished");

    if output.report(&report)? {
        return Ok(());
    }

    output.info(&format!(
        "Using {} (Python {}) for requires-python '{}'",
        report.interpreter.program.display(),
        report.interpreter.version,
        report.requirement
    ))?;
    if report.created_venv {
        output.info(&format!("Created {}", report.venv.display()))?;
    }
    output.success("Project installed in editable mode")?;
    Ok(())
}
