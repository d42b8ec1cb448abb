//! Tabular data and the file formats selections are stored in.
//!
//! [`table::Table`] is the in-memory form. [`delimited`] and [`records`] are the
//! two on-disk encodings behind the [`traits::TableFile`] interface, [`atomic`]
//! provides temp-file-then-rename writes, and [`pretty`] renders calculated
//! properties for humans.

pub mod atomic;
pub mod delimited;
pub mod pretty;
pub mod records;
pub mod table;
pub mod traits;
