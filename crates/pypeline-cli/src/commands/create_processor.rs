//! `pypeline create-processor`.

use tracing::instrument;

use crate::{
    cli::CreateProcessorArgs,
    commands::{project_service, working_dir},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(name = %args.name, pipeline = %args.pipeline))]
pub fn execute(args: CreateProcessorArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let start = working_dir()?;
    let report =
        project_service(&config).create_processor(&start, &args.name, &args.pipeline)?;

    if output.report(&report)? {
        return Ok(());
    }

    output.created(&report.root, &report.files)?;
    output.success(&format!(
        "Processor '{}' added to pipeline '{}' ({})",
        report.processor.identifier, report.processor.pipeline, report.processor.class_name
    ))?;
    if !report.registered {
        output.info("Processors aggregator already exported this processor")?;
    }
    Ok(())
}
