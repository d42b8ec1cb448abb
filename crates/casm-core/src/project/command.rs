use crate::error::{CasmError, Result};
use std::path::Path;
use std::process::Command;
use tracing::{debug, trace};

/// Captured result of a finished external process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn status_text(&self) -> String {
        match self.status {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs external programs on behalf of a [`Project`](super::Project).
///
/// Every interaction with the `casm` executable and with calculator wrapper
/// programs goes through this trait, so callers can substitute a recording
/// implementation.
pub trait CommandRunner {
    /// Runs `program` with `args` in the working directory `cwd` and waits for it.
    ///
    /// # Errors
    ///
    /// Returns [`CasmError::Spawn`] if the process cannot be started. A process
    /// that starts and exits unsuccessfully is not an error at this level.
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput>;
}

/// Spawns real operating-system processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput> {
        debug!("Running '{} {}' in {:?}", program, args.join(" "), cwd);
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|source| CasmError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let result = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        trace!(
            "'{}' finished with {} ({} bytes stdout, {} bytes stderr)",
            program,
            result.status_text(),
            result.stdout.len(),
            result.stderr.len()
        );
        Ok(result)
    }
}
