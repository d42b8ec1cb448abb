use crate::error::{CasmError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

fn default_clex_name() -> String {
    "formation_energy".to_string()
}

fn default_choice() -> String {
    "default".to_string()
}

/// Identifies the cluster expansion whose calculations are being driven.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClexDescription {
    #[serde(default = "default_clex_name")]
    pub name: String,
    #[serde(default = "default_clex_name")]
    pub property: String,
    #[serde(default = "default_choice")]
    pub calctype: String,
    #[serde(rename = "ref", default = "default_choice")]
    pub reference: String,
    #[serde(default = "default_choice")]
    pub bset: String,
    #[serde(default = "default_choice")]
    pub eci: String,
}

impl Default for ClexDescription {
    fn default() -> Self {
        Self {
            name: default_clex_name(),
            property: default_clex_name(),
            calctype: default_choice(),
            reference: default_choice(),
            bset: default_choice(),
            eci: default_choice(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectSettings {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub default_clex: ClexDescription,
}

impl ProjectSettings {
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading project settings from {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| CasmError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| CasmError::json(path, e))
    }
}
