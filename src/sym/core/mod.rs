//! Line-level decoders used by [`crate::sym::parse`].

pub(crate) mod attributes;
pub(crate) mod builder;
pub(crate) mod enums;
pub(crate) mod frame;
pub(crate) mod mux;
pub(crate) mod section;
pub(crate) mod strings;
pub(crate) mod var;
