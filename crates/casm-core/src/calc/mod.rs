//! # Calculators
//!
//! Names the supported calculator packages ([`Software`]) and methods ([`Method`])
//! and defines the [`Calculator`] seam through which a configuration is set up,
//! submitted, run and finally read back.
//!
//! Calculations themselves are carried out by external wrapper programs (see
//! [`wrapper`]); this crate only drives them and collects their results.

pub mod settings;
pub mod wrapper;

use crate::error::{CasmError, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use wrapper::{CalculatorPrograms, WrapperCalculator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Software {
    Vasp,
    QuantumEspresso,
}

impl Software {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vasp => "vasp",
            Self::QuantumEspresso => "quantum-espresso",
        }
    }

    /// Whether property extraction needs the name of the calculator's output file.
    pub fn needs_outfilename(&self) -> bool {
        matches!(self, Self::QuantumEspresso)
    }
}

impl fmt::Display for Software {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Software {
    type Err = CasmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "vasp" => Ok(Self::Vasp),
            "quantum-espresso" | "quantumespresso" | "quantumexpresso" | "qe" => {
                Ok(Self::QuantumEspresso)
            }
            other => Err(CasmError::InvalidData(format!(
                "unknown calculator software '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Relax,
    Neb,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relax => "relax",
            Self::Neb => "neb",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = CasmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "relax" => Ok(Self::Relax),
            "neb" => Ok(Self::Neb),
            other => Err(CasmError::InvalidData(format!(
                "unknown calculation method '{}'",
                other
            ))),
        }
    }
}

/// Drives one calculator package for one method.
///
/// `setup`, `submit` and `run` act on a configuration directory
/// (`training_data/<configname>`); `properties` reads the results left in a
/// completed run directory.
pub trait Calculator {
    fn setup(&self, configdir: &Path) -> Result<()>;

    fn submit(&self, configdir: &Path) -> Result<()>;

    fn run(&self, configdir: &Path) -> Result<()>;

    /// Extracts the calculated properties from `final_dir`.
    ///
    /// `outfilename` names the calculator's main output file for packages that
    /// need it.
    fn properties(&self, final_dir: &Path, outfilename: Option<&str>)
    -> Result<Map<String, Value>>;
}
