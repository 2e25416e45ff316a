/// A single rendered frame as tightly packed RGBA8 bytes.
///
/// Frames coming out of the compositor are premultiplied; the flag is
/// included to make this explicit at API boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// A fully opaque black frame of the given size.
    pub(crate) fn black(width: u32, height: u32) -> Self {
        let mut data = vec![0u8; (width as usize) * (height as usize) * 4];
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Self {
            width,
            height,
            data,
            premultiplied: true,
        }
    }
}
