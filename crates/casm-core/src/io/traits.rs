use super::table::Table;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Defines the interface for reading and writing tabular selection files.
///
/// Implementors handle one on-disk encoding of a [`Table`]; the selection
/// picks the implementor from the file name.
pub trait TableFile {
    /// The error type for I/O and parse failures.
    type Error: Error + From<io::Error>;

    /// Reads a table from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is malformed or the read fails.
    fn read_from(reader: &mut impl BufRead) -> Result<Table, Self::Error>;

    /// Writes a table to a writer in this encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(table: &Table, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a table from a file path.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Table, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}
