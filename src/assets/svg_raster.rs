use crate::foundation::error::{GlowreelError, GlowreelResult};

/// Rasterize an SVG tree into premultiplied RGBA8 bytes at `width`x`height`.
///
/// The tree is scaled non-uniformly to fill the target exactly; icon glyphs
/// here are square so this keeps their aspect.
pub(crate) fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> GlowreelResult<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(GlowreelError::validation(
            "svg raster size must be non-zero",
        ));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| GlowreelError::buffer_alloc("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_has_expected_byte_len_and_some_coverage() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><rect x="4" y="4" width="16" height="16" fill="#ffffff"/></svg>"##;
        let tree = usvg::Tree::from_data(svg.as_bytes(), &usvg::Options::default()).unwrap();

        let bytes = rasterize_svg_to_premul_rgba8(&tree, 48, 48).unwrap();
        assert_eq!(bytes.len(), 48 * 48 * 4);
        assert!(bytes.chunks_exact(4).any(|px| px[3] > 0));
    }

    #[test]
    fn zero_size_is_rejected() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"></svg>"##;
        let tree = usvg::Tree::from_data(svg.as_bytes(), &usvg::Options::default()).unwrap();
        assert!(rasterize_svg_to_premul_rgba8(&tree, 0, 8).is_err());
    }
}
