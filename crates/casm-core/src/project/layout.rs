use super::settings::ClexDescription;
use std::path::{Path, PathBuf};

const CASM_DIR: &str = ".casm";
const TRAINING_DATA_DIR: &str = "training_data";

/// Resolves the standard file locations inside a CASM project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryStructure {
    root: PathBuf,
}

impl DirectoryStructure {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn casm_dir(&self) -> PathBuf {
        self.root.join(CASM_DIR)
    }

    pub fn project_settings(&self) -> PathBuf {
        self.casm_dir().join("project_settings.json")
    }

    /// The master configuration list, holding the `selected` flag of every configuration.
    pub fn config_list(&self) -> PathBuf {
        self.casm_dir().join("config_list.json")
    }

    pub fn configuration_dir(&self, configname: &str) -> PathBuf {
        self.root.join(TRAINING_DATA_DIR).join(configname)
    }

    pub fn calctype_dir(&self, configname: &str, clex: &ClexDescription) -> PathBuf {
        self.configuration_dir(configname)
            .join(format!("calctype.{}", clex.calctype))
    }

    /// Directory of the completed calculation that properties are extracted from.
    pub fn final_run_dir(&self, configname: &str, clex: &ClexDescription) -> PathBuf {
        self.calctype_dir(configname, clex).join("run.final")
    }

    pub fn calculated_properties(&self, configname: &str, clex: &ClexDescription) -> PathBuf {
        self.calctype_dir(configname, clex)
            .join("properties.calc.json")
    }

    pub fn calc_settings_dir(&self, clex: &ClexDescription) -> PathBuf {
        self.root
            .join(TRAINING_DATA_DIR)
            .join("settings")
            .join(format!("calctype.{}", clex.calctype))
    }

    pub(crate) fn is_project_root(path: &Path) -> bool {
        path.join(CASM_DIR).is_dir()
    }
}
