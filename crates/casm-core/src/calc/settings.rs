use super::Software;
use crate::error::{CasmError, Result};
use crate::project::Project;
use crate::project::settings::ClexDescription;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

pub const RELAX_SETTINGS_FILE: &str = "relax.json";
pub const DEFAULT_OUTFILENAME: &str = "std.out";

/// The parts of a calctype's `relax.json` that this crate reads. Everything else
/// in the file belongs to the wrapper programs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RelaxSettings {
    #[serde(default)]
    pub outfilename: Option<String>,
}

impl RelaxSettings {
    /// Reads `relax.json` from `settings_dir`, or `None` if there is no such file.
    pub fn load(settings_dir: &Path) -> Result<Option<Self>> {
        let path = settings_dir.join(RELAX_SETTINGS_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        debug!("Reading calculation settings from {:?}", path);
        let content = std::fs::read_to_string(&path).map_err(|e| CasmError::io(&path, e))?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| CasmError::json(&path, e))
    }
}

/// The output file name passed to the properties extractor, if `software` needs one.
///
/// Taken from the calctype's `relax.json`; when that file or its `outfilename`
/// entry is missing, `fallback` is used with a warning.
pub fn report_outfilename(
    project: &Project,
    clex: &ClexDescription,
    software: Software,
    fallback: &str,
) -> Result<Option<String>> {
    if !software.needs_outfilename() {
        return Ok(None);
    }
    let settings_dir = project.dir().calc_settings_dir(clex);
    let configured = RelaxSettings::load(&settings_dir)?.and_then(|s| s.outfilename);
    Ok(Some(configured.unwrap_or_else(|| {
        warn!(
            "No 'outfilename' in {:?}; using '{}'",
            settings_dir.join(RELAX_SETTINGS_FILE),
            fallback
        );
        fallback.to_string()
    })))
}
