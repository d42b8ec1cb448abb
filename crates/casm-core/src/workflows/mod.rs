//! # Workflows Module
//!
//! High-level entry points that walk over the selected configurations of a
//! [`Selection`](crate::selection::Selection) and drive a
//! [`Calculator`](crate::calc::Calculator) for each of them.
//!
//! - **Calculation Workflow** ([`calc`]) - setup, submission and execution of
//!   calculations, and collection of their properties into
//!   `properties.calc.json` files.

pub mod calc;
