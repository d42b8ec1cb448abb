use super::table::{SELECTED, Table};
use super::traits::TableFile;
use serde_json::{Number, Value};
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Marker written in front of the header line; readers skip the first character.
const COMMENT_MARKER: &[u8] = b"#";
/// Spelling of missing values. Empty fields cannot survive whitespace splitting.
const MISSING: &str = "NaN";

#[derive(Debug, Error)]
pub enum DelimitedError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Malformed selection file: {0}")]
    Malformed(String),
}

/// Whitespace-delimited selection files as written by `casm select`:
///
/// ```text
/// #configname selected
/// SCEL1_1_1_1_0_0_0/0 1
/// SCEL2_1_2_1_0_0_0/0 0
/// ```
pub struct DelimitedFile;

impl TableFile for DelimitedFile {
    type Error = DelimitedError;

    fn read_from(reader: &mut impl BufRead) -> Result<Table, Self::Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        let mut chars = content.chars();
        chars.next();
        let normalized = chars
            .as_str()
            .lines()
            .map(collapse_separators)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(true)
            .from_reader(normalized.as_bytes());

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Err(DelimitedError::Malformed("missing header line".to_string()));
        }

        let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
        for record in rdr.records() {
            let record = record?;
            for (column, field) in columns.iter_mut().zip(record.iter()) {
                column.push(parse_cell(field));
            }
        }

        Table::from_columns(headers.into_iter().zip(columns).collect())
            .map_err(|e| DelimitedError::Malformed(e.to_string()))
    }

    fn write_to(table: &Table, writer: &mut impl Write) -> Result<(), Self::Error> {
        writer.write_all(COMMENT_MARKER)?;

        let names: Vec<&str> = table.column_names().collect();
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b' ')
            .from_writer(writer);
        wtr.write_record(&names)?;
        for row in table.rows_as_values() {
            wtr.write_record(
                names
                    .iter()
                    .zip(row)
                    .map(|(name, value)| format_cell(name, value)),
            )?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Reduces each run of whitespace outside double quotes to a single space and
/// drops leading and trailing whitespace. Quoted text is copied unchanged.
fn collapse_separators(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_quotes = false;
    let mut pending_space = false;
    for c in line.chars() {
        if !in_quotes && c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if c == '"' {
            in_quotes = !in_quotes;
        }
        out.push(c);
    }
    out
}

fn parse_cell(field: &str) -> Value {
    if let Ok(i) = field.parse::<i64>() {
        return Value::from(i);
    }
    if let Some(n) = field.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    match field {
        "True" | "true" => Value::Bool(true),
        "False" | "false" => Value::Bool(false),
        "NaN" | "nan" | "null" => Value::Null,
        _ => Value::String(field.to_string()),
    }
}

fn format_cell(column: &str, value: &Value) -> String {
    if column == SELECTED {
        return if super::table::coerce_bool(value) { "1" } else { "0" }.to_string();
    }
    match value {
        Value::String(s) if s.is_empty() => MISSING.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => MISSING.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::table::CONFIGNAME;
    use serde_json::json;
    use std::io::Cursor;

    fn read(text: &str) -> Result<Table, DelimitedError> {
        DelimitedFile::read_from(&mut Cursor::new(text.as_bytes()))
    }

    #[test]
    fn read_skips_marker_and_collapses_whitespace() {
        let table = read("#configname    selected\nSCEL1_1_1_1_0_0_0/0   1\n\n  SCEL2_1_2_1_0_0_0/0 0\n")
            .unwrap();

        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec![CONFIGNAME, SELECTED]
        );
        assert_eq!(
            table.column(CONFIGNAME).unwrap(),
            &[json!("SCEL1_1_1_1_0_0_0/0"), json!("SCEL2_1_2_1_0_0_0/0")]
        );
        assert_eq!(table.column(SELECTED).unwrap(), &[json!(1), json!(0)]);
    }

    #[test]
    fn read_infers_cell_types() {
        let table = read("#configname selected energy is_calculated comp\nA/0 1 -1.25 True NaN\n")
            .unwrap();
        assert_eq!(table.column("energy").unwrap(), &[json!(-1.25)]);
        assert_eq!(table.column("is_calculated").unwrap(), &[json!(true)]);
        assert_eq!(table.column("comp").unwrap(), &[Value::Null]);
    }

    #[test]
    fn read_rejects_ragged_rows() {
        let result = read("#configname selected\nA/0 1 extra\n");
        assert!(matches!(result, Err(DelimitedError::Csv(_))));
    }

    #[test]
    fn read_rejects_empty_file() {
        let result = read("#");
        assert!(matches!(result, Err(DelimitedError::Malformed(_))));
    }

    #[test]
    fn write_prefixes_header_and_encodes_selected_as_integers() {
        let table = Table::from_columns(vec![
            (CONFIGNAME, vec![json!("A/0"), json!("A/1")]),
            (SELECTED, vec![json!(true), json!(false)]),
            ("note", vec![json!("two words"), Value::Null]),
        ])
        .unwrap();

        let mut buffer = Vec::new();
        DelimitedFile::write_to(&table, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(
            text,
            "#configname selected note\nA/0 1 \"two words\"\nA/1 0 NaN\n"
        );
    }

    #[test]
    fn written_file_reads_back_with_quoted_fields() {
        let table = Table::from_columns(vec![
            (CONFIGNAME, vec![json!("A/0")]),
            (SELECTED, vec![json!(true)]),
            ("note", vec![json!("two words")]),
        ])
        .unwrap();

        let mut buffer = Vec::new();
        DelimitedFile::write_to(&table, &mut buffer).unwrap();
        let reread = read(std::str::from_utf8(&buffer).unwrap()).unwrap();

        assert_eq!(reread.column("note").unwrap(), &[json!("two words")]);
        assert_eq!(reread.column(SELECTED).unwrap(), &[json!(1)]);
    }

    #[test]
    fn quoted_fields_keep_inner_whitespace() {
        let table = Table::from_columns(vec![
            (CONFIGNAME, vec![json!("A/0")]),
            (SELECTED, vec![json!(true)]),
            ("note", vec![json!("a  b\tc")]),
        ])
        .unwrap();

        let mut buffer = Vec::new();
        DelimitedFile::write_to(&table, &mut buffer).unwrap();
        let reread = read(std::str::from_utf8(&buffer).unwrap()).unwrap();
        assert_eq!(reread.column("note").unwrap(), &[json!("a  b\tc")]);

        let padded = read("#configname   note\n  A/1    \"x   y\"   \n").unwrap();
        assert_eq!(padded.column("note").unwrap(), &[json!("x   y")]);
    }
}
