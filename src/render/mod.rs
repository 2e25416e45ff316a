//! CPU raster stages: static layers, per-frame composition, and the bridge
//! into encoder-ready pixel buffers.

pub(crate) mod buffer;
pub(crate) mod compose;
pub(crate) mod frame;
pub(crate) mod static_layer;
pub(crate) mod surface;
pub(crate) mod text;
