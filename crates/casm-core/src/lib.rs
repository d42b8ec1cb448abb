//! # CASM Project Library
//!
//! Scripting support for CASM projects: selections of configurations, the
//! on-disk project layout, and drivers for external quantum-chemistry
//! calculators.
//!
//! ## Architectural Philosophy
//!
//! The library is layered so that each level only reaches downward.
//!
//! - **[`project`] and [`io`]: The Foundation.** The project root and its directory
//!   layout, the subprocess seam used to talk to the `casm` executable, and the
//!   tabular cache ([`io::table::Table`]) with its CSV and JSON codecs.
//!
//! - **[`selection`] and [`calc`]: The Logic Core.** [`selection::Selection`] is a
//!   lazily loaded, explicitly saved view of which configurations are selected.
//!   [`calc`] names the calculator packages and methods and defines the
//!   [`calc::Calculator`] seam through which wrapper programs are driven.
//!
//! - **[`workflows`]: The Public API.** Setup, submission, execution and property
//!   reporting over every selected configuration of a selection.

pub mod calc;
pub mod error;
pub mod io;
pub mod progress;
pub mod project;
pub mod selection;
pub mod workflows;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{CasmError, Result};
pub use project::Project;
pub use selection::{Selection, SelectionPath};
