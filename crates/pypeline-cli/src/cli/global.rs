//! Flags accepted by every subcommand.

use std::path::PathBuf;

use clap::{ArgAction, Args, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Debug, Args)]
pub struct GlobalArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help = "More log output (-v info, -vv debug, -vvv trace)"
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Only print errors"
    )]
    pub quiet: bool,

    /// Also set by a non-empty `NO_COLOR` environment variable.
    #[arg(long = "no-color", global = true, env = "NO_COLOR", help = "Disable colored output")]
    pub no_color: bool,

    /// Layered on top of the user and project config files.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "FILE",
        help = "Extra configuration file"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "output-format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Auto,
        help = "How results are printed"
    )]
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `output.format` from config, else human on a terminal and plain otherwise.
    #[default]
    Auto,
    /// Colored status lines.
    Human,
    /// Status lines without color.
    Plain,
    /// One JSON report on stdout.
    Json,
}
