use crate::io::delimited::DelimitedError;
use crate::io::records::RecordsError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CasmError>;

#[derive(Debug, Error)]
pub enum CasmError {
    #[error("Not a CASM project: no '.casm' directory found at or above '{path}'", path = path.display())]
    NotAProject { path: PathBuf },

    #[error("File I/O error for '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error for '{path}': {source}", path = path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read or write selection file '{path}': {source}", path = path.display())]
    Delimited {
        path: PathBuf,
        #[source]
        source: DelimitedError,
    },

    #[error("Failed to read or write JSON selection file '{path}': {source}", path = path.display())]
    Records {
        path: PathBuf,
        #[source]
        source: RecordsError,
    },

    #[error("Unexpected output from '{command}': {source}")]
    QueryOutput {
        command: String,
        #[source]
        source: RecordsError,
    },

    #[error("Cannot save the '{0}' Selection")]
    ReadOnlySelection(String),

    #[error("File: {path} already exists", path = path.display())]
    AlreadyExists { path: PathBuf },

    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Invalid configname '{0}': expected '<scelname>/<configid>'")]
    InvalidConfigname(String),

    #[error("Configuration '{0}' is not in the master configuration list")]
    UnknownConfiguration(String),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Column '{name}' has {actual} values but the table has {expected} rows")]
    ColumnLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("No completed calculation found at '{path}'", path = path.display())]
    NoFinalRun { path: PathBuf },

    #[error("Malformed data: {0}")]
    InvalidData(String),
}

impl CasmError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn delimited(path: impl Into<PathBuf>, source: DelimitedError) -> Self {
        Self::Delimited {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn records(path: impl Into<PathBuf>, source: RecordsError) -> Self {
        Self::Records {
            path: path.into(),
            source,
        }
    }
}
