//! Shared scalar types, colors, and error taxonomy.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod math;
