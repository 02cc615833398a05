//! `git` command-line adapter.

use std::path::Path;

use tracing::{info, instrument};

use pypeline_core::{application::ports::VersionControl, error::PypelineResult};

use crate::process::run;

/// Drives the `git` binary found on `PATH`.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl VersionControl for GitCli {
    #[instrument(skip(self), fields(root = %root.display()))]
    fn init(&self, root: &Path) -> PypelineResult<()> {
        run(&self.program, ["init", "--quiet"], Some(root))?;
        info!("Initialized git repository");
        Ok(())
    }

    #[instrument(skip(self), fields(root = %root.display()))]
    fn initial_commit(&self, root: &Path, message: &str) -> PypelineResult<()> {
        run(&self.program, ["add", "--all"], Some(root))?;
        run(&self.program, ["commit", "--quiet", "-m", message], Some(root))?;
        info!("Created initial commit");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_git_binary_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let git = GitCli::with_program("pypeline-no-such-git");
        assert!(git.init(dir.path()).is_err());
    }
}
