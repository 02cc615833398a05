//! `pypeline sync-deps`: copy `dependencies.py` into `pyproject.toml`.

use tracing::instrument;

use crate::{
    commands::{dependency_service, working_dir},
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(output: OutputManager) -> CliResult<()> {
    let report = dependency_service().sync(&working_dir()?)?;

    if output.report(&report)? {
        return Ok(());
    }

    if !report.written {
        output.success(&format!(
            "pyproject.toml already lists all {} dependencies",
            report.requested
        ))?;
        return Ok(());
    }

    for dep in &report.outcome.added {
        output.print(&format!("  + {dep}"))?;
    }
    for dep in &report.outcome.updated {
        output.print(&format!("  ~ {dep}"))?;
    }
    for dep in &report.outcome.collapsed {
        output.print(&format!("  - {dep} (repeated entries merged)"))?;
    }
    output.success(&format!(
        "Updated {} ({} added, {} changed)",
        report.manifest.display(),
        report.outcome.added.len(),
        report.outcome.updated.len()
    ))?;
    Ok(())
}
