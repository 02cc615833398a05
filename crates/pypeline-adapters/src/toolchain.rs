//! Local Python toolchain: interpreter discovery, venv and pip.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use pypeline_core::{
    application::{
        ApplicationError,
        ports::{Interpreter, Toolchain},
    },
    domain::{PythonRequirement, parse_python_version, runtime::INTERPRETER_CANDIDATES},
    error::PypelineResult,
};

use crate::process::run;

/// Finds interpreters on `PATH` by name, newest first.
#[derive(Debug, Clone)]
pub struct PythonToolchain {
    candidates: Vec<String>,
}

impl Default for PythonToolchain {
    fn default() -> Self {
        Self::with_candidates(INTERPRETER_CANDIDATES.iter().copied())
    }
}

impl PythonToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidates<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    /// Interpreter inside a virtual environment.
    pub fn venv_python(venv: &Path) -> PathBuf {
        if cfg!(windows) {
            venv.join("Scripts").join("python.exe")
        } else {
            venv.join("bin").join("python")
        }
    }

    fn interpreter_version(&self, program: &str) -> Option<semver::Version> {
        let output = run(program, ["--version"], None).ok()?;
        // Python 2 prints its version on stderr.
        let text = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        parse_python_version(&text)
    }
}

impl Toolchain for PythonToolchain {
    #[instrument(skip(self), fields(requirement = %requirement))]
    fn detect(&self, requirement: &PythonRequirement) -> PypelineResult<Interpreter> {
        for candidate in &self.candidates {
            match self.interpreter_version(candidate) {
                Some(version) if requirement.matches(&version) => {
                    debug!(program = %candidate, %version, "Interpreter accepted");
                    return Ok(Interpreter {
                        program: PathBuf::from(candidate),
                        version,
                    });
                }
                Some(version) => {
                    debug!(program = %candidate, %version, "Interpreter rejected");
                }
                None => debug!(program = %candidate, "Not available"),
            }
        }
        Err(ApplicationError::RuntimeNotFound {
            requirement: requirement.to_string(),
        }
        .into())
    }

    #[instrument(skip(self), fields(venv = %venv.display()))]
    fn create_environment(&self, interpreter: &Interpreter, venv: &Path) -> PypelineResult<()> {
        run(
            &interpreter.program,
            [OsStr::new("-m"), OsStr::new("venv"), venv.as_os_str()],
            None,
        )?;
        info!(program = %interpreter.program.display(), "Created virtual environment");
        Ok(())
    }

    #[instrument(skip(self), fields(venv = %venv.display(), root = %root.display()))]
    fn install_project(&self, venv: &Path, root: &Path) -> PypelineResult<()> {
        let python = Self::venv_python(venv);
        run(
            &python,
            ["-m", "pip", "install", "--upgrade", "pip"],
            Some(root),
        )?;
        run(
            &python,
            [
                OsStr::new("-m"),
                OsStr::new("pip"),
                OsStr::new("install"),
                OsStr::new("-e"),
                root.as_os_str(),
            ],
            Some(root),
        )?;
        info!("Installed project in editable mode");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pypeline_core::error::PypelineError;

    #[test]
    fn no_candidates_means_runtime_not_found() {
        let toolchain = PythonToolchain::with_candidates(["pypeline-no-python"]);
        let requirement = PythonRequirement::parse(">=3.9").unwrap();

        let err = toolchain.detect(&requirement).unwrap_err();
        assert!(matches!(
            err,
            PypelineError::Application(ApplicationError::RuntimeNotFound { ref requirement })
                if requirement == ">=3.9"
        ));
    }

    #[test]
    fn venv_python_location() {
        let python = PythonToolchain::venv_python(Path::new("/p/.venv"));
        assert!(python.starts_with("/p/.venv"));
        assert!(python.to_string_lossy().contains("python"));
    }
}
