use phf::{Map, phf_map};
use std::convert::Infallible;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Clone, Copy)]
enum Reserved {
    Master,
    All,
    Calculated,
}

static RESERVED_NAMES: Map<&'static str, Reserved> = phf_map! {
    "MASTER" => Reserved::Master,
    "ALL" => Reserved::All,
    "CALCULATED" => Reserved::Calculated,
};

/// Where a selection lives: one of the views maintained by `casm` itself, or a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectionPath {
    /// The `selected` flags stored in the project's master configuration list.
    Master,
    /// Every configuration of the project. Computed, never saved.
    All,
    /// Every configuration with calculated properties. Computed, never saved.
    Calculated,
    File(PathBuf),
}

impl SelectionPath {
    /// Maps `MASTER`, `ALL` and `CALCULATED` to the reserved views; anything else is
    /// a file path, made absolute against the current directory. `casm` runs from
    /// the project root, so a relative path would name a different file there.
    pub fn parse(value: &str) -> Self {
        if let Some(reserved) = RESERVED_NAMES.get(value) {
            return match reserved {
                Reserved::Master => Self::Master,
                Reserved::All => Self::All,
                Reserved::Calculated => Self::Calculated,
            };
        }

        let path = PathBuf::from(value);
        match std::path::absolute(&path) {
            Ok(absolute) => Self::File(absolute),
            Err(_) => Self::File(path),
        }
    }

    pub fn is_reserved(&self) -> bool {
        !matches!(self, Self::File(_))
    }

    /// `ALL` and `CALCULATED` are always recomputed by `casm` and cannot be saved.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::All | Self::Calculated)
    }

    pub fn is_json(&self) -> bool {
        match self {
            Self::File(path) => path
                .to_string_lossy()
                .to_ascii_lowercase()
                .ends_with(".json"),
            _ => false,
        }
    }

    pub fn as_file(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            _ => None,
        }
    }

    /// The form passed to `casm` after `-c`.
    pub fn to_arg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SelectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master => f.write_str("MASTER"),
            Self::All => f.write_str("ALL"),
            Self::Calculated => f.write_str("CALCULATED"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl FromStr for SelectionPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
