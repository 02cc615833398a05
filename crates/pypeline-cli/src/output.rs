//! Output management and formatting.
//!
//! Human and plain modes print short status lines. JSON mode prints exactly
//! one serialized report on stdout and nothing else.

use std::io::{self, IsTerminal};
use std::path::Path;
use std::time::Duration;

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let requested = match args.output_format {
            OutputFormat::Auto => config.output.format,
            explicit => explicit,
        };
        let resolved_format = match requested {
            OutputFormat::Auto if io::stdout().is_terminal() => OutputFormat::Human,
            OutputFormat::Auto => OutputFormat::Plain,
            explicit => explicit,
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Status lines are dropped in quiet and JSON modes.
    fn chatty(&self) -> bool {
        !self.quiet && self.resolved_format != OutputFormat::Json
    }

    pub fn print(&self, msg: &str) -> io::Result<()> {
        if !self.chatty() {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// `✓ <msg>`
    pub fn success(&self, msg: &str) -> io::Result<()> {
        if !self.chatty() {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2713} {msg}")
        } else {
            format!("{} {}", "\u{2713}".green().bold(), msg.green())
        };
        self.term.write_line(&line)
    }

    /// `⚠ <msg>`
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if !self.chatty() {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{26a0} {msg}")
        } else {
            format!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow())
        };
        self.term.write_line(&line)
    }

    /// `ℹ <msg>`
    pub fn info(&self, msg: &str) -> io::Result<()> {
        if !self.chatty() {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2139} {msg}")
        } else {
            format!("{} {}", "\u{2139}".blue().bold(), msg.blue())
        };
        self.term.write_line(&line)
    }

    pub fn header(&self, text: &str) -> io::Result<()> {
        if !self.chatty() {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// One `+ path` line per generated file, relative to `root` when possible.
    pub fn created(&self, root: &Path, files: &[impl AsRef<Path>]) -> io::Result<()> {
        for file in files {
            let file = file.as_ref();
            let shown = file.strip_prefix(root).unwrap_or(file).display().to_string();
            let line = if self.no_color {
                format!("  + {shown}")
            } else {
                format!("  {} {}", "+".green(), shown.dimmed())
            };
            self.print(&line)?;
        }
        Ok(())
    }

    /// Print `report` as JSON when in JSON mode. Returns whether it printed.
    pub fn report<T: Serialize>(&self, report: &T) -> io::Result<bool> {
        if self.resolved_format != OutputFormat::Json {
            return Ok(false);
        }
        let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
        self.term.write_line(&json)?;
        Ok(true)
    }

    /// A spinner on stderr, only in human mode.
    pub fn spinner(&self, msg: &str) -> Option<ProgressBar> {
        if self.quiet || self.resolved_format != OutputFormat::Human {
            return None;
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(msg.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Some(bar)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
