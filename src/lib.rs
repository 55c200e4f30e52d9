//! # can_sym
//!
//! Rust utilities for reading and writing **PCAN symbol files** (`.sym`), the
//! text format used to describe CAN frames, signals, multiplexed groups and
//! enumerations.
//!
//! ## Highlights
//! - **Tolerant parser**: [`sym::parse`] never aborts. It returns a best-effort
//!   [`DatabaseSym`] with an ordered list of [`Diagnostic`]s, each tagged with
//!   its 1-based source line.
//! - **Quote-aware**: labels and long names may contain `,`, `:`, `=` or `//`.
//! - **Multiplexing**: repeated `[Frame]` blocks are merged; colliding `Mux=`
//!   values are reported on the colliding line and the first claim wins.
//! - **Stable keys**: frames live in a SlotMap arena addressed by [`FrameKey`].
//! - **Exact numbers**: factors, offsets, limits and defaults keep the text they
//!   were written with, so writing the file back does not drift.
//!

#[cfg(feature = "sym")]
pub mod sym;

// Top-level re-exports (appear under Crate Items → Structs)
#[cfg(feature = "sym")]
#[doc(inline)]
pub use crate::sym::types::{
    database::{DatabaseSym, FrameKey, ValueTable},
    errors::{Diagnostic, SymParseError, SymSaveError},
    frame::{Direction, FrameSym, IdFormat, MuxGroup},
    literal::Literal,
    signal::{Endianness, MuxRole, SignalSym, ValueType},
};
