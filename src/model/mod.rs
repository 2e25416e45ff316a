//! Input records and the fixed scene theme.

pub(crate) mod record;
pub(crate) mod theme;
