//! # types
//!
//! Public model of a parsed symbol file.

pub mod database;
pub mod errors;
pub mod frame;
pub mod literal;
pub mod signal;
