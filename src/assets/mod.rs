//! Still-image decoding, icon rasterization, and record asset resolution.

pub(crate) mod decode;
pub(crate) mod resolve;
pub(crate) mod svg_raster;
