use casm::selection::ConfigType;
use casm::workflows::calc::{Action, CalcConfig};
use std::path::PathBuf;

pub struct AppConfig {
    pub project_path: PathBuf,
    pub selection: String,
    pub config_type: ConfigType,
    pub action: Option<Action>,
    pub casm_executable: String,
    pub calc: CalcConfig,
}
