use super::table::Table;
use super::traits::TableFile;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected an array of objects, found {0}")]
    NotRecords(&'static str),
}

/// Record-oriented JSON tables: `[{"configname": "...", "selected": true}, ...]`.
pub struct RecordsFile;

impl RecordsFile {
    /// Parses record-oriented JSON text, as printed by `casm query --json`.
    pub fn parse(text: &str) -> Result<Table, RecordsError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Table, RecordsError> {
        let Value::Array(items) = value else {
            return Err(RecordsError::NotRecords(kind(&value)));
        };
        let records = items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map),
                other => Err(RecordsError::NotRecords(kind(&other))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Table::from_records(records))
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl TableFile for RecordsFile {
    type Error = RecordsError;

    fn read_from(reader: &mut impl BufRead) -> Result<Table, Self::Error> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_value(value)
    }

    fn write_to(table: &Table, writer: &mut impl Write) -> Result<(), Self::Error> {
        let records: Vec<Value> = table.records().into_iter().map(Value::Object).collect();
        serde_json::to_writer(writer, &records)?;
        Ok(())
    }
}
