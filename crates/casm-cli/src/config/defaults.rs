use casm::calc::settings::DEFAULT_OUTFILENAME;
use casm::project::DEFAULT_EXECUTABLE;

pub struct DefaultsConfig {
    pub casm_executable: String,
    pub report_outfilename: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            casm_executable: DEFAULT_EXECUTABLE.to_string(),
            report_outfilename: DEFAULT_OUTFILENAME.to_string(),
        }
    }
}
