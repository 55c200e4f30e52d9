//! # sym
//!
//! `sym` is the module to work with PCAN symbol (`.sym`) files.
//!
//! - [`parse`] / [`from_file`]: text or file into a [`DatabaseSym`] plus the
//!   list of [`Diagnostic`]s found on the way.
//! - [`to_string`] / [`save_to_file`]: the inverse direction.
//! - [`signal_line`]: a single `Var=` line.

pub(crate) mod core;
pub mod parse;
pub mod save;
pub mod types;

pub use parse::{from_file, parse};
pub use save::{save_to_file, signal_line, to_string};
pub use types::{
    database::{DatabaseSym, FrameKey, ValueTable},
    errors::{Diagnostic, SymParseError, SymSaveError},
};
