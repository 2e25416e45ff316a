use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Shape as _;

use crate::foundation::core::{Affine, Point, Rgba8};
use crate::foundation::error::{GlowreelError, GlowreelResult};
use crate::foundation::math::{lerp_u8, mul_div255_u8};
use crate::model::theme::{GlowGradient, GradientStop};

/// Convert a straight-alpha color to the `vello_cpu` paint color type.
pub(crate) fn paint_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Flattened circle outline as a `vello_cpu` path.
pub(crate) fn circle_path(center: Point, radius: f64) -> vello_cpu::kurbo::BezPath {
    bezpath_to_cpu(&kurbo::Circle::new(center, radius).to_path(0.1))
}

pub(crate) fn clear_pixmap_to_transparent(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

/// Allocate a pixmap, failing instead of panicking when dimensions overflow.
pub(crate) fn new_pixmap(width: u32, height: u32) -> GlowreelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| GlowreelError::buffer_alloc(format!("pixmap width exceeds u16: {width}")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| GlowreelError::buffer_alloc(format!("pixmap height exceeds u16: {height}")))?;
    Ok(vello_cpu::Pixmap::new(w, h))
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> GlowreelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| GlowreelError::buffer_alloc("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| GlowreelError::buffer_alloc("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(GlowreelError::validation("pixmap byte len mismatch"));
    }

    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

/// Wrap premultiplied RGBA8 bytes as an image paint.
pub(crate) fn image_from_premul_bytes(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> GlowreelResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn sample_stops(stops: &[GradientStop], t: f32) -> Rgba8 {
    let t = t.clamp(0.0, 1.0);
    let mut prev = stops[0];
    for stop in &stops[1..] {
        if t <= stop.offset {
            let span = (stop.offset - prev.offset).max(f32::EPSILON);
            let local = (t - prev.offset) / span;
            return Rgba8::new(
                lerp_u8(prev.color.r, stop.color.r, local),
                lerp_u8(prev.color.g, stop.color.g, local),
                lerp_u8(prev.color.b, stop.color.b, local),
                lerp_u8(prev.color.a, stop.color.a, local),
            );
        }
        prev = *stop;
    }
    prev.color
}

fn premul_px(c: Rgba8, coverage: f32) -> [u8; 4] {
    let a = (f32::from(c.a) * coverage.clamp(0.0, 1.0)).round() as u16;
    [
        mul_div255_u8(u16::from(c.r), a),
        mul_div255_u8(u16::from(c.g), a),
        mul_div255_u8(u16::from(c.b), a),
        a as u8,
    ]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum RasterKey {
    /// Circular disc with a center-to-edge two-color radial ramp.
    Disc {
        size: u32,
        inner: [u8; 4],
        outer: [u8; 4],
    },
    /// Ring of `width` pixels with a diagonal linear three-stop ramp.
    RingLinear {
        size: u32,
        width_q8: u32,
        stops: [(u32, [u8; 4]); 3],
    },
    /// Ring of `width` pixels with a solid color.
    RingSolid {
        size: u32,
        width_q8: u32,
        color: [u8; 4],
    },
    /// Axis-aligned ellipse with a center-to-edge two-color radial ramp.
    EllipseRadial {
        w: u32,
        h: u32,
        inner: [u8; 4],
        outer: [u8; 4],
    },
    /// Background glow disc sampled from a [`GlowGradient`].
    Glow { diameter: u32 },
    /// Opaque rect with a top-left to bottom-right two-color ramp.
    Diagonal {
        w: u32,
        h: u32,
        start: [u8; 4],
        end: [u8; 4],
    },
}

fn key_color(c: Rgba8) -> [u8; 4] {
    [c.r, c.g, c.b, c.a]
}

fn key_stop(s: &GradientStop) -> (u32, [u8; 4]) {
    ((s.offset * 256.0) as u32, key_color(s.color))
}

/// Cache of hand-rastered gradient images used by the static layer renderer
/// and the frame composer.
///
/// The decorative discs and rings are identical across records, so rastering
/// them once per run is the whole performance story here.
#[derive(Default)]
pub(crate) struct RasterCache {
    images: HashMap<RasterKey, vello_cpu::Image>,
}

impl RasterCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Disc of `size` pixels: radial ramp `inner` (center) to `outer` (edge),
    /// fully transparent outside the circle.
    pub(crate) fn radial_disc(
        &mut self,
        size: u32,
        inner: Rgba8,
        outer: Rgba8,
    ) -> GlowreelResult<vello_cpu::Image> {
        let key = RasterKey::Disc {
            size,
            inner: key_color(inner),
            outer: key_color(outer),
        };
        if let Some(img) = self.images.get(&key).cloned() {
            return Ok(img);
        }

        let r = (size as f32) / 2.0;
        let mut bytes = vec![0u8; (size as usize) * (size as usize) * 4];
        for y in 0..size {
            for x in 0..size {
                let dx = (x as f32) + 0.5 - r;
                let dy = (y as f32) + 0.5 - r;
                let d = (dx * dx + dy * dy).sqrt();
                let coverage = (r - d + 0.5).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let t = (d / r).min(1.0);
                let c = Rgba8::new(
                    lerp_u8(inner.r, outer.r, t),
                    lerp_u8(inner.g, outer.g, t),
                    lerp_u8(inner.b, outer.b, t),
                    lerp_u8(inner.a, outer.a, t),
                );
                let idx = ((y as usize) * (size as usize) + (x as usize)) * 4;
                bytes[idx..idx + 4].copy_from_slice(&premul_px(c, coverage));
            }
        }

        let img = image_from_premul_bytes(&bytes, size, size)?;
        self.images.insert(key, img.clone());
        Ok(img)
    }

    /// Ring along the circle inscribed in `size`, `width` pixels wide, filled
    /// with a top-left to bottom-right linear ramp over `stops`.
    pub(crate) fn ring_linear(
        &mut self,
        size: u32,
        width: f32,
        stops: &[GradientStop; 3],
    ) -> GlowreelResult<vello_cpu::Image> {
        let key = RasterKey::RingLinear {
            size,
            width_q8: (width * 256.0) as u32,
            stops: [key_stop(&stops[0]), key_stop(&stops[1]), key_stop(&stops[2])],
        };
        if let Some(img) = self.images.get(&key).cloned() {
            return Ok(img);
        }

        let bytes = self.ring_bytes(size, width, |x, y| {
            let t = ((x + y) as f32) / ((2 * size.saturating_sub(1)).max(1) as f32);
            sample_stops(stops.as_slice(), t)
        });
        let img = image_from_premul_bytes(&bytes, size, size)?;
        self.images.insert(key, img.clone());
        Ok(img)
    }

    /// Ring along the circle inscribed in `size`, `width` pixels wide, solid.
    pub(crate) fn ring_solid(
        &mut self,
        size: u32,
        width: f32,
        color: Rgba8,
    ) -> GlowreelResult<vello_cpu::Image> {
        let key = RasterKey::RingSolid {
            size,
            width_q8: (width * 256.0) as u32,
            color: key_color(color),
        };
        if let Some(img) = self.images.get(&key).cloned() {
            return Ok(img);
        }

        let bytes = self.ring_bytes(size, width, |_, _| color);
        let img = image_from_premul_bytes(&bytes, size, size)?;
        self.images.insert(key, img.clone());
        Ok(img)
    }

    fn ring_bytes(&self, size: u32, width: f32, color_at: impl Fn(u32, u32) -> Rgba8) -> Vec<u8> {
        let r_outer = (size as f32) / 2.0;
        let r_inner = (r_outer - width).max(0.0);
        let mut bytes = vec![0u8; (size as usize) * (size as usize) * 4];
        for y in 0..size {
            for x in 0..size {
                let dx = (x as f32) + 0.5 - r_outer;
                let dy = (y as f32) + 0.5 - r_outer;
                let d = (dx * dx + dy * dy).sqrt();
                let coverage = (r_outer - d + 0.5)
                    .min(d - r_inner + 0.5)
                    .clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let idx = ((y as usize) * (size as usize) + (x as usize)) * 4;
                bytes[idx..idx + 4].copy_from_slice(&premul_px(color_at(x, y), coverage));
            }
        }
        bytes
    }

    /// Axis-aligned ellipse raster with a radial ramp along normalized
    /// elliptical distance.
    pub(crate) fn ellipse_radial(
        &mut self,
        w: u32,
        h: u32,
        inner: Rgba8,
        outer: Rgba8,
    ) -> GlowreelResult<vello_cpu::Image> {
        let key = RasterKey::EllipseRadial {
            w,
            h,
            inner: key_color(inner),
            outer: key_color(outer),
        };
        if let Some(img) = self.images.get(&key).cloned() {
            return Ok(img);
        }

        let rx = (w as f32) / 2.0;
        let ry = (h as f32) / 2.0;
        let mut bytes = vec![0u8; (w as usize) * (h as usize) * 4];
        for y in 0..h {
            for x in 0..w {
                let nx = ((x as f32) + 0.5 - rx) / rx.max(f32::EPSILON);
                let ny = ((y as f32) + 0.5 - ry) / ry.max(f32::EPSILON);
                let e = (nx * nx + ny * ny).sqrt();
                if e > 1.0 {
                    continue;
                }
                let c = Rgba8::new(
                    lerp_u8(inner.r, outer.r, e),
                    lerp_u8(inner.g, outer.g, e),
                    lerp_u8(inner.b, outer.b, e),
                    lerp_u8(inner.a, outer.a, e),
                );
                let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
                bytes[idx..idx + 4].copy_from_slice(&premul_px(c, 1.0));
            }
        }

        let img = image_from_premul_bytes(&bytes, w, h)?;
        self.images.insert(key, img.clone());
        Ok(img)
    }

    /// Background glow disc of `diameter` pixels sampled from `gradient`.
    ///
    /// The ramp's final stop is transparent, so clamping past the disc edge
    /// matches draws-after-end gradient semantics.
    pub(crate) fn glow_disc(
        &mut self,
        diameter: u32,
        gradient: &GlowGradient,
    ) -> GlowreelResult<vello_cpu::Image> {
        let key = RasterKey::Glow { diameter };
        if let Some(img) = self.images.get(&key).cloned() {
            return Ok(img);
        }

        let r = (diameter as f32) / 2.0;
        let mut bytes = vec![0u8; (diameter as usize) * (diameter as usize) * 4];
        for y in 0..diameter {
            for x in 0..diameter {
                let dx = (x as f32) + 0.5 - r;
                let dy = (y as f32) + 0.5 - r;
                let t = (dx * dx + dy * dy).sqrt() / r;
                let c = gradient.sample(t);
                if c.a == 0 {
                    continue;
                }
                let idx = ((y as usize) * (diameter as usize) + (x as usize)) * 4;
                bytes[idx..idx + 4].copy_from_slice(&premul_px(c, 1.0));
            }
        }

        let img = image_from_premul_bytes(&bytes, diameter, diameter)?;
        self.images.insert(key, img.clone());
        Ok(img)
    }

    /// Full-rect linear ramp from `start` (top-left) to `end` (bottom-right).
    pub(crate) fn diagonal_gradient(
        &mut self,
        w: u32,
        h: u32,
        start: Rgba8,
        end: Rgba8,
    ) -> GlowreelResult<vello_cpu::Image> {
        let key = RasterKey::Diagonal {
            w,
            h,
            start: key_color(start),
            end: key_color(end),
        };
        if let Some(img) = self.images.get(&key).cloned() {
            return Ok(img);
        }

        let span = (w.saturating_sub(1) + h.saturating_sub(1)).max(1) as f32;
        let mut bytes = vec![0u8; (w as usize) * (h as usize) * 4];
        for y in 0..h {
            for x in 0..w {
                let t = ((x + y) as f32) / span;
                let c = Rgba8::new(
                    lerp_u8(start.r, end.r, t),
                    lerp_u8(start.g, end.g, t),
                    lerp_u8(start.b, end.b, t),
                    lerp_u8(start.a, end.a, t),
                );
                let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
                bytes[idx..idx + 4].copy_from_slice(&premul_px(c, 1.0));
            }
        }

        let img = image_from_premul_bytes(&bytes, w, h)?;
        self.images.insert(key, img.clone());
        Ok(img)
    }
}
