//! `pypeline build`: archive the project into `dist/`.

use tracing::instrument;

use crate::{
    commands::{build_service, working_dir},
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(output: OutputManager) -> CliResult<()> {
    let start = working_dir()?;

    let spinner = output.spinner("Building archive...");
    let result = build_service().build(&start);
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let report = result?;

    if output.report(&report)? {
        return Ok(());
    }

    output.success(&format!(
        "Built {} ({} files, {})",
        report.archive.display(),
        report.entries,
        human_size(report.bytes)
    ))?;
    Ok(())
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::human_size;

    #[test]
    fn sizes() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KiB");
        assert_eq!(human_size(5 * 1024 * 1024 + 1024 * 512), "5.5 MiB");
    }
}
