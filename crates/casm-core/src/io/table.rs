use crate::error::{CasmError, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;

pub const CONFIGNAME: &str = "configname";
pub const SELECTED: &str = "selected";

#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    values: Vec<Value>,
}

/// An ordered set of equally long, named columns of JSON values.
///
/// Selections keep their data in a `Table` with at least a [`CONFIGNAME`] and a
/// [`SELECTED`] column; any further columns come from `casm query` or from the
/// caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from record-oriented rows. Columns appear in first-seen key
    /// order and keys missing from a record become `null`.
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let mut names: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !names.iter().any(|n| n == key) {
                    names.push(key.clone());
                }
            }
        }

        let columns = names
            .into_iter()
            .map(|name| {
                let values = records
                    .iter()
                    .map(|r| r.get(&name).cloned().unwrap_or(Value::Null))
                    .collect();
                Column { name, values }
            })
            .collect();

        Self {
            columns,
            rows: records.len(),
        }
    }

    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<Value>)>) -> Result<Self> {
        let mut table = Self::new();
        for (name, values) in columns {
            table.set_column(&name.into(), values)?;
        }
        Ok(table)
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Assigns a whole column, replacing an existing one of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`CasmError::ColumnLength`] unless `values` has one entry per row.
    /// A table without columns takes its row count from the first column.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if self.columns.is_empty() {
            self.rows = values.len();
        } else if values.len() != self.rows {
            return Err(CasmError::ColumnLength {
                name: name.to_string(),
                expected: self.rows,
                actual: values.len(),
            });
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
        Ok(())
    }

    /// Copies column `name` from `other` into this table.
    ///
    /// Rows are matched by [`CONFIGNAME`] when both tables carry it and by
    /// position otherwise. Rows without a counterpart in `other` receive `null`,
    /// as do all rows when `other` has no rows at all.
    pub fn merge_column(&mut self, name: &str, other: &Table) -> Result<()> {
        let source = match other.column(name) {
            Some(source) => source,
            None if other.is_empty() => {
                return self.set_column(name, vec![Value::Null; self.rows]);
            }
            None => return Err(CasmError::MissingColumn(name.to_string())),
        };

        if self.columns.is_empty() {
            return self.set_column(name, source.to_vec());
        }

        let values = match (self.column(CONFIGNAME), other.column(CONFIGNAME)) {
            (Some(ours), Some(theirs)) => {
                let lookup: HashMap<&str, &Value> = theirs
                    .iter()
                    .zip(source)
                    .filter_map(|(key, value)| key.as_str().map(|k| (k, value)))
                    .collect();
                ours.iter()
                    .map(|key| {
                        key.as_str()
                            .and_then(|k| lookup.get(k))
                            .map(|v| (*v).clone())
                            .unwrap_or(Value::Null)
                    })
                    .collect()
            }
            _ => (0..self.rows)
                .map(|i| source.get(i).cloned().unwrap_or(Value::Null))
                .collect(),
        };
        self.set_column(name, values)
    }

    pub fn row(&self, index: usize) -> Option<Map<String, Value>> {
        if index >= self.rows {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| (c.name.clone(), c.values[index].clone()))
                .collect(),
        )
    }

    pub fn records(&self) -> Vec<Map<String, Value>> {
        (0..self.rows).filter_map(|i| self.row(i)).collect()
    }

    pub(crate) fn rows_as_values(&self) -> impl Iterator<Item = Vec<&Value>> {
        (0..self.rows).map(move |i| self.columns.iter().map(|c| &c.values[i]).collect())
    }

    /// Rewrites every value of column `name` as a JSON boolean.
    pub fn coerce_bool_column(&mut self, name: &str) -> Result<()> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| CasmError::MissingColumn(name.to_string()))?;
        for value in column.values.iter_mut() {
            *value = Value::Bool(coerce_bool(value));
        }
        Ok(())
    }

    pub fn confignames(&self) -> Result<Vec<&str>> {
        let column = self
            .column(CONFIGNAME)
            .ok_or_else(|| CasmError::MissingColumn(CONFIGNAME.to_string()))?;
        column
            .iter()
            .map(|v| {
                v.as_str().ok_or_else(|| {
                    CasmError::InvalidData(format!("configname must be a string, found {}", v))
                })
            })
            .collect()
    }

    pub fn selected_flags(&self) -> Result<Vec<bool>> {
        let column = self
            .column(SELECTED)
            .ok_or_else(|| CasmError::MissingColumn(SELECTED.to_string()))?;
        Ok(column.iter().map(coerce_bool).collect())
    }

    /// Confignames of the rows whose `selected` flag is true, in table order.
    pub fn selected_confignames(&self) -> Result<Vec<String>> {
        let names = self.confignames()?;
        let flags = self.selected_flags()?;
        Ok(names
            .into_iter()
            .zip(flags)
            .filter(|(_, on)| *on)
            .map(|(name, _)| name.to_string())
            .collect())
    }
}

/// Truthiness used for the `selected` column.
///
/// Numbers are true when non-zero; the strings `""`, `"0"`, `"false"` (any case)
/// and `"nan"` (any case) are false, other strings true; `null` is false.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => {
            let s = s.trim();
            !(s.is_empty()
                || s == "0"
                || s.eq_ignore_ascii_case("false")
                || s.eq_ignore_ascii_case("nan"))
        }
        Value::Null => false,
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
