//! The on-disk CASM project.
//!
//! A [`Project`] is rooted at the directory containing `.casm/`. It knows the
//! project's directory layout ([`layout`]), its settings ([`settings`]) and how
//! to run external programs ([`command`]), most importantly the `casm`
//! executable itself.

pub mod command;
pub mod layout;
pub mod settings;

use crate::error::{CasmError, Result};
use command::{CommandRunner, ProcessRunner};
use layout::DirectoryStructure;
use settings::{ClexDescription, ProjectSettings};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_EXECUTABLE: &str = "casm";

pub struct Project {
    dir: DirectoryStructure,
    settings: ProjectSettings,
    executable: String,
    runner: Box<dyn CommandRunner>,
}

impl Project {
    /// Opens the project containing `path`, searching upward for the `.casm` directory.
    ///
    /// # Errors
    ///
    /// Returns [`CasmError::NotAProject`] if no ancestor of `path` is a project root,
    /// or an I/O / JSON error if the project settings cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let start = std::path::absolute(path).map_err(|e| CasmError::io(path, e))?;
        let root = start
            .ancestors()
            .find(|candidate| DirectoryStructure::is_project_root(candidate))
            .ok_or_else(|| CasmError::NotAProject {
                path: start.clone(),
            })?
            .to_path_buf();

        let dir = DirectoryStructure::new(root);
        let settings = ProjectSettings::load(&dir.project_settings())?;
        info!("Opened CASM project '{}' at {:?}", settings.name, dir.root());

        Ok(Self {
            dir,
            settings,
            executable: DEFAULT_EXECUTABLE.to_string(),
            runner: Box::new(ProcessRunner),
        })
    }

    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.root()
    }

    pub fn dir(&self) -> &DirectoryStructure {
        &self.dir
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    pub fn default_clex(&self) -> &ClexDescription {
        &self.settings.default_clex
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Runs the `casm` executable with `args` from the project root and returns its stdout.
    ///
    /// # Errors
    ///
    /// Returns [`CasmError::CommandFailed`] on a non-zero exit status.
    pub fn command(&self, args: &[String]) -> Result<String> {
        self.run_program(&self.executable, args)
    }

    /// Runs an arbitrary program from the project root and returns its stdout.
    pub fn run_program(&self, program: &str, args: &[String]) -> Result<String> {
        let output = self.runner.run(program, args, self.root())?;
        if !output.success() {
            return Err(CasmError::CommandFailed {
                command: format!("{} {}", program, args.join(" ")),
                status: output.status_text(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        debug!("'{}' succeeded", program);
        Ok(output.stdout)
    }
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("root", &self.dir.root())
            .field("name", &self.settings.name)
            .field("executable", &self.executable)
            .finish_non_exhaustive()
    }
}
