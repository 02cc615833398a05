//! Running external programs to completion.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};

use tracing::{debug, trace};

use pypeline_core::{application::ApplicationError, error::PypelineResult};

/// Run `program args..` in `cwd` and return its output.
///
/// A spawn failure or a non-zero exit status is `ExternalCommandFailed`;
/// the reason carries the last line of stderr when there is one.
pub(crate) fn run<I, S>(program: impl AsRef<OsStr>, args: I, cwd: Option<&Path>) -> PypelineResult<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program.as_ref());
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    let label = describe(&command);
    debug!(command = %label, "Running");

    let output = command.output().map_err(|e| ApplicationError::ExternalCommandFailed {
        command: label.clone(),
        reason: e.to_string(),
    })?;
    trace!(command = %label, status = %output.status, "Finished");

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.trim().to_string())
            .unwrap_or_else(|| format!("exited with {}", output.status));
        return Err(ApplicationError::ExternalCommandFailed {
            command: label,
            reason,
        }
        .into());
    }
    Ok(output)
}

fn describe(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pypeline_core::error::PypelineError;

    #[test]
    fn missing_program_is_external_command_failure() {
        let err = run("pypeline-definitely-not-a-program", ["--version"], None).unwrap_err();
        assert!(matches!(
            err,
            PypelineError::Application(ApplicationError::ExternalCommandFailed { ref command, .. })
                if command == "pypeline-definitely-not-a-program --version"
        ));
    }
}
