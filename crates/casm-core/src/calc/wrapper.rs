use super::{Calculator, Method, Software};
use crate::error::{CasmError, Result};
use crate::project::Project;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

fn default_program(software: Software, method: Method) -> &'static str {
    match (software, method) {
        (Software::Vasp, Method::Relax) => "vasp.relax",
        (Software::Vasp, Method::Neb) => "vasp.neb",
        (Software::QuantumEspresso, Method::Relax) => "pw.relax",
        (Software::QuantumEspresso, Method::Neb) => "pw.neb",
    }
}

/// The wrapper program registered for each (software, method) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculatorPrograms {
    overrides: HashMap<(Software, Method), String>,
}

impl CalculatorPrograms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, software: Software, method: Method, program: impl Into<String>) {
        self.overrides.insert((software, method), program.into());
    }

    pub fn program(&self, software: Software, method: Method) -> &str {
        self.overrides
            .get(&(software, method))
            .map(String::as_str)
            .unwrap_or_else(|| default_program(software, method))
    }
}

/// A [`Calculator`] backed by an external wrapper program.
///
/// The program is invoked from the project root as
/// `<program> <dir> --setup|--submit|--run`, or
/// `<program> <dir> --properties [--outfilename <name>]`, in which case it must
/// print the properties as a JSON object.
#[derive(Debug)]
pub struct WrapperCalculator<'p> {
    project: &'p Project,
    program: String,
}

impl<'p> WrapperCalculator<'p> {
    pub fn new(project: &'p Project, program: impl Into<String>) -> Self {
        Self {
            project,
            program: program.into(),
        }
    }

    pub fn for_method(
        project: &'p Project,
        programs: &CalculatorPrograms,
        software: Software,
        method: Method,
    ) -> Self {
        Self::new(project, programs.program(software, method))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn invoke(&self, dir: &Path, flags: &[&str]) -> Result<String> {
        let mut args = vec![dir.display().to_string()];
        args.extend(flags.iter().map(|f| f.to_string()));
        debug!("Invoking {} {:?}", self.program, args);
        self.project.run_program(&self.program, &args)
    }
}

impl Calculator for WrapperCalculator<'_> {
    fn setup(&self, configdir: &Path) -> Result<()> {
        self.invoke(configdir, &["--setup"])?;
        info!("Set up {:?}", configdir);
        Ok(())
    }

    fn submit(&self, configdir: &Path) -> Result<()> {
        self.invoke(configdir, &["--submit"])?;
        info!("Submitted {:?}", configdir);
        Ok(())
    }

    fn run(&self, configdir: &Path) -> Result<()> {
        self.invoke(configdir, &["--run"])?;
        info!("Ran {:?}", configdir);
        Ok(())
    }

    fn properties(
        &self,
        final_dir: &Path,
        outfilename: Option<&str>,
    ) -> Result<Map<String, Value>> {
        let mut flags = vec!["--properties"];
        if let Some(name) = outfilename {
            flags.extend(["--outfilename", name]);
        }
        let stdout = self.invoke(final_dir, &flags)?;

        let value: Value = serde_json::from_str(stdout.trim()).map_err(|e| {
            CasmError::InvalidData(format!(
                "'{}' printed invalid properties for {:?}: {}",
                self.program, final_dir, e
            ))
        })?;
        match value {
            Value::Object(map) => Ok(map),
            other => Err(CasmError::InvalidData(format!(
                "'{}' printed {} instead of a properties object for {:?}",
                self.program, other, final_dir
            ))),
        }
    }
}
