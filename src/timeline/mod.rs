//! Scene/frame scheduling and the top-level generation driver.

pub(crate) mod plan;
pub(crate) mod scheduler;
