use super::ConfigType;
use super::path::SelectionPath;
use crate::error::{CasmError, Result};
use crate::io::records::RecordsFile;
use crate::io::table::{SELECTED, Table};
use crate::project::Project;
use tracing::debug;

/// Runs `casm query` for `columns` and returns the result as a table.
///
/// Equivalent to `casm query -k <columns...> -o STDOUT --json [-c <selection>]`.
/// A `selected` column in the output is coerced to booleans.
pub fn query(
    project: &Project,
    columns: &[String],
    selection: Option<&SelectionPath>,
    config_type: ConfigType,
) -> Result<Table> {
    let mut args = vec!["query".to_string(), "-k".to_string()];
    args.extend(columns.iter().cloned());
    args.extend(["-o", "STDOUT", "--json"].map(String::from));
    if let Some(selection) = selection {
        args.push("-c".to_string());
        args.push(selection.to_arg());
    }
    if config_type != ConfigType::Config {
        args.push("-t".to_string());
        args.push(config_type.as_str().to_string());
    }

    debug!("Querying columns {:?}", columns);
    let stdout = project.command(&args)?;
    let mut table = RecordsFile::parse(&stdout).map_err(|source| CasmError::QueryOutput {
        command: format!("{} {}", project.executable(), args.join(" ")),
        source,
    })?;
    if table.has_column(SELECTED) {
        table.coerce_bool_column(SELECTED)?;
    }
    Ok(table)
}
