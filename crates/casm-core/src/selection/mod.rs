//! Selections of configurations.
//!
//! A [`Selection`] names a set of configurations together with a `selected` flag
//! for each. Its data is read lazily on first access, edited in memory, and only
//! persisted by an explicit [`Selection::save`]. Mutations delegated to
//! `casm select` drop the cached data so that the next access sees the result.

pub mod path;
pub mod query;

pub use path::SelectionPath;

use crate::error::{CasmError, Result};
use crate::io::atomic::write_atomically;
use crate::io::delimited::DelimitedFile;
use crate::io::records::RecordsFile;
use crate::io::table::{CONFIGNAME, SELECTED, Table};
use crate::io::traits::TableFile;
use crate::project::Project;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// The kind of object a selection refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConfigType {
    #[default]
    Config,
    DiffTrans,
    DiffTransConfig,
    Scel,
}

impl ConfigType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::DiffTrans => "diff_trans",
            Self::DiffTransConfig => "diff_trans_config",
            Self::Scel => "scel",
        }
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigType {
    type Err = CasmError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "config" => Ok(Self::Config),
            "diff_trans" => Ok(Self::DiffTrans),
            "diff_trans_config" => Ok(Self::DiffTransConfig),
            "scel" => Ok(Self::Scel),
            other => Err(CasmError::InvalidData(format!(
                "unknown configuration type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectMode {
    SetOn,
    SetOff,
    Set,
}

impl SelectMode {
    fn flag(self) -> &'static str {
        match self {
            Self::SetOn => "--set-on",
            Self::SetOff => "--set-off",
            Self::Set => "--set",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Selection<'p> {
    project: &'p Project,
    path: SelectionPath,
    config_type: ConfigType,
    data: Option<Table>,
}

impl<'p> Selection<'p> {
    /// Creates a selection of `project` stored at `path`, or one of the reserved
    /// names `MASTER`, `ALL` and `CALCULATED`. Nothing is read until [`Self::data`].
    pub fn new(project: &'p Project, path: &str) -> Self {
        Self {
            project,
            path: SelectionPath::parse(path),
            config_type: ConfigType::default(),
            data: None,
        }
    }

    pub fn with_config_type(mut self, config_type: ConfigType) -> Self {
        self.config_type = config_type;
        self
    }

    pub fn project(&self) -> &'p Project {
        self.project
    }

    pub fn path(&self) -> &SelectionPath {
        &self.path
    }

    pub fn config_type(&self) -> ConfigType {
        self.config_type
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// The selection data, loaded on first access.
    ///
    /// Reserved selections are queried from `casm`; `.json` files are read as
    /// records and any other file as a whitespace-delimited table. The `selected`
    /// column is always boolean afterwards. Edits are kept in memory until
    /// [`Self::save`].
    pub fn data(&mut self) -> Result<&mut Table> {
        let table = match self.data.take() {
            Some(table) => table,
            None => self.load()?,
        };
        Ok(self.data.insert(table))
    }

    fn load(&self) -> Result<Table> {
        debug!("Loading selection '{}'", self.path);
        let table = match &self.path {
            SelectionPath::File(path) if self.path.is_json() => {
                RecordsFile::read_from_path(path).map_err(|e| CasmError::records(path, e))?
            }
            SelectionPath::File(path) => {
                DelimitedFile::read_from_path(path).map_err(|e| CasmError::delimited(path, e))?
            }
            reserved => query::query(
                self.project,
                &[CONFIGNAME.to_string(), SELECTED.to_string()],
                Some(reserved),
                self.config_type,
            )?,
        };
        clean(table)
    }

    /// Configurations whose `selected` flag is set, in table order.
    pub fn selected_confignames(&mut self) -> Result<Vec<String>> {
        self.data()?.selected_confignames()
    }

    /// Persists the selection, first replacing the cached data with `data` if given.
    ///
    /// - `MASTER`: every configuration in the master list is deselected, then each
    ///   row's `selected` flag is applied to its configuration. Without loaded or
    ///   given data this does nothing.
    /// - `ALL` / `CALCULATED`: always fails.
    /// - Files: fails if the file exists and `force` is false, otherwise writes the
    ///   format matching the file name.
    ///
    /// All writes go through `<path>.tmp`, which must not already exist.
    pub fn save(&mut self, data: Option<Table>, force: bool) -> Result<()> {
        match self.path.clone() {
            SelectionPath::All | SelectionPath::Calculated => {
                Err(CasmError::ReadOnlySelection(self.path.to_string()))
            }
            SelectionPath::Master => {
                if let Some(data) = data {
                    self.data = Some(clean(data)?);
                }
                self.save_master()
            }
            SelectionPath::File(path) => {
                if let Some(data) = data {
                    self.data = Some(clean(data)?);
                }
                self.save_file(&path, force)
            }
        }
    }

    fn save_master(&self) -> Result<()> {
        let Some(data) = &self.data else {
            debug!("MASTER selection was never loaded; nothing to save.");
            return Ok(());
        };

        let list_path = self.project.dir().config_list();
        let content =
            std::fs::read_to_string(&list_path).map_err(|e| CasmError::io(&list_path, e))?;
        let mut list: Value =
            serde_json::from_str(&content).map_err(|e| CasmError::json(&list_path, e))?;

        let supercells = list
            .get_mut("supercells")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| {
                CasmError::InvalidData(format!("{:?} has no 'supercells' object", list_path))
            })?;

        for config in supercells
            .values_mut()
            .filter_map(Value::as_object_mut)
            .flat_map(|configs| configs.values_mut())
            .filter_map(Value::as_object_mut)
        {
            config.insert(SELECTED.to_string(), Value::Bool(false));
        }

        let names = data.confignames()?;
        let flags = data.selected_flags()?;
        for (configname, on) in names.into_iter().zip(flags) {
            let (scelname, configid) = configname
                .split_once('/')
                .ok_or_else(|| CasmError::InvalidConfigname(configname.to_string()))?;
            let entry = supercells
                .get_mut(scelname)
                .and_then(|configs| configs.get_mut(configid))
                .and_then(Value::as_object_mut)
                .ok_or_else(|| CasmError::UnknownConfiguration(configname.to_string()))?;
            entry.insert(SELECTED.to_string(), Value::Bool(on));
        }

        write_atomically(&list_path, |w| {
            serde_json::to_writer(w, &list).map_err(|e| CasmError::json(&list_path, e))
        })?;
        info!("Updated master configuration list {:?}", list_path);
        Ok(())
    }

    fn save_file(&mut self, path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(CasmError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }

        let is_json = self.path.is_json();
        let data = self.data()?;
        write_atomically(path, |w| {
            if is_json {
                RecordsFile::write_to(data, w).map_err(|e| CasmError::records(path, e))
            } else {
                DelimitedFile::write_to(data, w).map_err(|e| CasmError::delimited(path, e))
            }
        })?;
        info!("Saved selection to {:?}", path);
        Ok(())
    }

    /// Saves a copy of this selection's data at `path` and returns the copy.
    pub fn saveas(&mut self, path: &str, force: bool) -> Result<Selection<'p>> {
        let data = self.data()?.clone();
        let mut selection = self.clone();
        selection.path = SelectionPath::parse(path);
        selection.save(Some(data), force)?;
        Ok(selection)
    }

    /// `casm select --set-on <criteria>` on this selection.
    pub fn set_on(&mut self, criteria: &str, output: Option<&Path>, force: bool) -> Result<()> {
        self.select(SelectMode::SetOn, criteria, output, force)
    }

    /// `casm select --set-off <criteria>` on this selection.
    pub fn set_off(&mut self, criteria: &str, output: Option<&Path>, force: bool) -> Result<()> {
        self.select(SelectMode::SetOff, criteria, output, force)
    }

    /// `casm select --set <criteria>` on this selection.
    pub fn set(&mut self, criteria: &str, output: Option<&Path>, force: bool) -> Result<()> {
        self.select(SelectMode::Set, criteria, output, force)
    }

    fn select(
        &mut self,
        mode: SelectMode,
        criteria: &str,
        output: Option<&Path>,
        force: bool,
    ) -> Result<()> {
        let mut args = vec!["select".to_string(), mode.flag().to_string()];
        if !criteria.is_empty() {
            args.push(criteria.to_string());
        }
        args.push("-c".to_string());
        args.push(self.path.to_arg());
        if self.config_type != ConfigType::Config {
            args.push("-t".to_string());
            args.push(self.config_type.as_str().to_string());
        }
        if let Some(output) = output {
            let output = std::path::absolute(output).map_err(|e| CasmError::io(output, e))?;
            args.push("-o".to_string());
            args.push(output.display().to_string());
        }
        if force {
            args.push("-f".to_string());
        }

        self.project.command(&args)?;
        self.data = None;
        Ok(())
    }

    /// Queries `columns` from `casm` and stores them in the data.
    ///
    /// Columns that already exist are skipped unless `force` is true.
    pub fn query(&mut self, columns: &[&str], force: bool) -> Result<()> {
        let wanted: Vec<String> = {
            let data = self.data()?;
            columns
                .iter()
                .filter(|c| force || !data.has_column(c))
                .map(|c| c.to_string())
                .collect()
        };
        if wanted.is_empty() {
            debug!("All requested columns already present: {:?}", columns);
            return Ok(());
        }

        let result = query::query(
            self.project,
            &wanted,
            Some(&self.path),
            self.config_type,
        )?;
        let data = self.data()?;
        for name in &wanted {
            data.merge_column(name, &result)?;
        }
        Ok(())
    }

    /// Adds column `name`, from `values` if given and from `casm query` otherwise.
    ///
    /// An existing column is left alone unless `force` is true.
    pub fn add_data(&mut self, name: &str, values: Option<Vec<Value>>, force: bool) -> Result<()> {
        if self.data()?.has_column(name) && !force {
            return Ok(());
        }
        match values {
            None => self.query(&[name], force),
            Some(values) => self.data()?.set_column(name, values),
        }
    }
}

/// Normalizes loaded or given data: `selected` becomes boolean, and a table
/// without rows still carries the `configname` and `selected` columns.
fn clean(mut table: Table) -> Result<Table> {
    if table.is_empty() {
        for name in [CONFIGNAME, SELECTED] {
            if !table.has_column(name) {
                table.set_column(name, Vec::new())?;
            }
        }
    }
    table.coerce_bool_column(SELECTED)?;
    Ok(table)
}
