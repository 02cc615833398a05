//! `pypeline create-pipeline`.

use tracing::instrument;

use crate::{
    cli::CreatePipelineArgs,
    commands::{project_service, working_dir},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(name = %args.name))]
pub fn execute(args: CreatePipelineArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let start = working_dir()?;
    let report = project_service(&config).create_pipeline(&start, &args.name)?;

    if output.report(&report)? {
        return Ok(());
    }

    output.created(&report.root, &report.files)?;
    output.success(&format!(
        "Pipeline '{}' created ({})",
        report.pipeline.identifier, report.pipeline.class_name
    ))?;
    if !report.registered {
        output.info("Package aggregator already exported this pipeline")?;
    }
    output.print("")?;
    output.print(&format!(
        "Add processors with: pypeline create-processor --name <processor> --pipeline {}",
        report.pipeline.identifier
    ))?;
    Ok(())
}
