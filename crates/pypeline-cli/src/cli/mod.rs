//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name    = "pypeline",
    bin_name = "pypeline",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Scaffold and maintain Python ETL pipeline projects",
    long_about = "Pypeline generates Python ETL projects, adds pipelines and \
                  processors to them, keeps pyproject.toml in sync with \
                  dependencies.py, and packages the result.",
    after_help = "EXAMPLES:\n\
        \x20 pypeline init --name sales-etl --author-name 'Jane Doe' --author-email jane@example.com \\\n\
        \x20     --description 'Daily sales loads' --license MIT\n\
        \x20 pypeline create-pipeline --name daily_sales\n\
        \x20 pypeline create-processor --name clean_orders --pipeline daily_sales\n\
        \x20 pypeline sync-deps && pypeline install && pypeline build",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new project.
    #[command(
        about = "Create a new ETL project",
        after_help = "Fields not given as flags come from the config file, \
                      or are prompted for when running in a terminal."
    )]
    Init(InitArgs),

    /// Add a pipeline to the current project.
    #[command(
        visible_alias = "pipeline",
        about = "Create a pipeline in the current project",
        after_help = "EXAMPLES:\n\
            \x20 pypeline create-pipeline --name daily_sales\n\
            \x20 pypeline create-pipeline --name 'Weekly Returns'   # -> weekly_returns"
    )]
    CreatePipeline(CreatePipelineArgs),

    /// Add a processor to an existing pipeline.
    #[command(
        visible_alias = "processor",
        about = "Create a processor in an existing pipeline",
        after_help = "EXAMPLES:\n\
            \x20 pypeline create-processor --name clean_orders --pipeline daily_sales"
    )]
    CreateProcessor(CreateProcessorArgs),

    /// Copy dependencies.py into pyproject.toml.
    #[command(about = "Merge dependencies.py into pyproject.toml")]
    SyncDeps,

    /// Create .venv and install the project.
    #[command(about = "Create .venv with a matching Python and install the project")]
    Install,

    /// Archive the project into dist/.
    #[command(about = "Build dist/<package>-<version>.zip")]
    Build,

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 pypeline completions bash > ~/.local/share/bash-completion/completions/pypeline\n\
            \x20 pypeline completions zsh  > ~/.zfunc/_pypeline\n\
            \x20 pypeline completions fish > ~/.config/fish/completions/pypeline.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect or create the configuration file.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 pypeline config get defaults.author_name\n\
            \x20 pypeline config list\n\
            \x20 pypeline config init"
    )]
    Config(ConfigCommands),
}

// ── init ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    #[arg(long, value_name = "NAME", help = "Project name (normalized into the package name)")]
    pub name: Option<String>,

    #[arg(long = "author-name", value_name = "NAME")]
    pub author_name: Option<String>,

    #[arg(long = "author-email", value_name = "EMAIL")]
    pub author_email: Option<String>,

    #[arg(long, value_name = "TEXT", help = "One-line project description")]
    pub description: Option<String>,

    #[arg(long, value_name = "SPDX", help = "License id, e.g. MIT, Apache-2.0, Proprietary")]
    pub license: Option<String>,

    #[arg(long = "company-name", value_name = "NAME", help = "Copyright holder, defaults to the author")]
    pub company_name: Option<String>,

    #[arg(
        short = 'd',
        long,
        value_name = "DIR",
        help = "Parent directory of the new project (default: current directory)"
    )]
    pub destination: Option<PathBuf>,

    #[arg(long, overrides_with = "no_git", help = "Initialize a git repository")]
    pub git: bool,

    #[arg(long = "no-git", overrides_with = "git", help = "Do not initialize git")]
    pub no_git: bool,
}

impl InitArgs {
    /// `Some(true)` for `--git`, `Some(false)` for `--no-git`.
    pub fn git_flag(&self) -> Option<bool> {
        match (self.git, self.no_git) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

// ── create-pipeline / create-processor ────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CreatePipelineArgs {
    #[arg(short = 'n', long, value_name = "NAME")]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct CreateProcessorArgs {
    #[arg(short = 'n', long, value_name = "NAME")]
    pub name: String,

    #[arg(short = 'p', long, value_name = "PIPELINE", help = "Existing pipeline to add the processor to")]
    pub pipeline: String,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one value, e.g. `defaults.license`.
    Get { key: String },
    /// Print the effective configuration.
    List,
    /// Print the config file location.
    Path,
    /// Write a default config file.
    Init {
        #[arg(short = 'f', long = "force", help = "Overwrite an existing file")]
        force: bool,
    },
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_processor() {
        let cli = Cli::try_parse_from([
            "pypeline",
            "create-processor",
            "--name",
            "clean orders",
            "--pipeline",
            "daily_sales",
        ])
        .unwrap();
        match cli.command {
            Commands::CreateProcessor(args) => {
                assert_eq!(args.name, "clean orders");
                assert_eq!(args.pipeline, "daily_sales");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn processor_requires_pipeline() {
        assert!(Cli::try_parse_from(["pypeline", "create-processor", "--name", "x"]).is_err());
    }

    #[test]
    fn git_flags_last_one_wins() {
        let parse = |args: &[&str]| match Cli::try_parse_from(args).unwrap().command {
            Commands::Init(init) => init.git_flag(),
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(parse(&["pypeline", "init"]), None);
        assert_eq!(parse(&["pypeline", "init", "--git"]), Some(true));
        assert_eq!(parse(&["pypeline", "init", "--git", "--no-git"]), Some(false));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pypeline", "build", "-vv", "--output-format", "json"]).unwrap();
        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.global.output_format, OutputFormat::Json);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["pypeline", "-q", "-v", "build"]).is_err());
    }
}
