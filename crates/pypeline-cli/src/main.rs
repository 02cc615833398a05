//! # Pypeline CLI
//!
//! Generates and maintains Python ETL projects.
//!
//! ## Startup sequence
//!
//! 1. Load `.env`, then parse arguments (clap exits early for `--help` / `--version`).
//! 2. Install the tracing subscriber.
//! 3. Load configuration (defaults, files, environment).
//! 4. Build the [`OutputManager`] and dispatch to a command handler.
//! 5. Turn any [`CliError`] into a message on stderr and an exit code.
//!
//! ## Exit codes
//!
//! | Code | Meaning                 |
//! |------|-------------------------|
//! |  0   | Success                 |
//! |  1   | Internal / system error |
//! |  2   | User / input error      |
//! |  3   | Resource not found      |
//! |  4   | Configuration error     |

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info, instrument};

use crate::{
    cli::{Cli, Commands, ConfigCommands},
    config::AppConfig,
    error::{CliError, CliResult},
    logging::init_logging,
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => {
            // --help / --version
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(2);
        }
    };

    if let Err(e) = init_logging(&cli.global) {
        eprintln!("Failed to initialise logging: {e}");
        return ExitCode::from(1);
    }

    debug!(
        verbose = cli.global.verbose,
        quiet = cli.global.quiet,
        format = ?cli.global.output_format,
        "CLI started"
    );

    // `config init` may be asked to create the file passed with --config.
    let require_explicit = !matches!(cli.command, Commands::Config(ConfigCommands::Init { .. }));
    let config = match AppConfig::load(cli.global.config.as_deref(), require_explicit) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e:#}");
            eprintln!("Error: failed to load configuration: {e:#}");
            return ExitCode::from(4);
        }
    };

    let output = OutputManager::new(&cli.global, &config);
    let verbose = cli.global.verbose > 0;

    match run(cli, config, output) {
        Ok(()) => {
            info!("pypeline completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => handle_error(e, verbose),
    }
}

/// Dispatch to the correct command handler.
#[instrument(skip_all)]
fn run(cli: Cli, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cli.command {
        Commands::Init(args) => commands::init::execute(args, config, output),
        Commands::CreatePipeline(args) => commands::create_pipeline::execute(args, config, output),
        Commands::CreateProcessor(args) => {
            commands::create_processor::execute(args, config, output)
        }
        Commands::SyncDeps => commands::sync_deps::execute(output),
        Commands::Install => commands::install::execute(output),
        Commands::Build => commands::build::execute(output),
        Commands::Completions(args) => commands::completions::execute(args),
        Commands::Config(cmd) => commands::config::execute(cmd, cli.global.config, config, output),
    }
}

/// Log the error, print it to stderr and map it to an exit code.
fn handle_error(err: CliError, verbose: bool) -> ExitCode {
    err.log();

    let msg = if std::io::stderr().is_terminal() {
        err.format_colored(verbose)
    } else {
        err.format_plain(verbose)
    };
    eprint!("{msg}");

    ExitCode::from(err.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_version_matches_cargo() {
        assert_eq!(Cli::command().get_version(), Some(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn every_command_is_registered() {
        let cmd = Cli::command();
        let names: Vec<_> = cmd.get_subcommands().map(|c| c.get_name().to_string()).collect();
        for expected in [
            "init",
            "create-pipeline",
            "create-processor",
            "sync-deps",
            "install",
            "build",
            "completions",
            "config",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }
}
