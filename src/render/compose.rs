use std::sync::Arc;

use crate::foundation::core::{Affine, Canvas, Point};
use crate::foundation::error::GlowreelResult;
use crate::model::theme::{GlowGradient, palette};
use crate::render::frame::FrameRGBA;
use crate::render::surface::{
    RasterCache, affine_to_cpu, clear_pixmap_to_transparent, new_pixmap, paint_color,
};
use crate::render::text::{FontBundle, TextLayoutEngine, draw_text};

const INTRO_TITLE: &str = "MY VICTORIES";
const INTRO_TITLE_SIZE: f32 = 100.0;
const INTRO_YEAR_SIZE: f32 = 60.0;

/// Per-frame motion applied to a scene's static layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTransform {
    /// Uniform scale about the (floated) canvas center.
    pub scale: f64,
    /// Vertical float offset in pixels.
    pub y_offset: f64,
}

/// A scene's static raster wrapped as a reusable image paint.
///
/// Built once per victory scene so the 90 composite draws share one pixmap.
pub struct RenderedStaticLayer {
    image: vello_cpu::Image,
    width: u32,
    height: u32,
}

impl RenderedStaticLayer {
    /// Wrap a rendered static layer pixmap.
    pub fn new(pixmap: vello_cpu::Pixmap) -> Self {
        let width = u32::from(pixmap.width());
        let height = u32::from(pixmap.height());
        Self {
            image: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            width,
            height,
        }
    }
}

/// Composites one output frame: black backdrop, floating glow, then the
/// scene's static layer under the frame's scale/float transform.
///
/// Scene-transition alpha is NOT applied here; the pixel buffer bridge blends
/// it in a single pass to avoid double alpha compositing.
pub struct FrameComposer {
    canvas: Canvas,
    gradient: GlowGradient,
    cache: RasterCache,
    fonts: Option<FontBundle>,
    text_engine: TextLayoutEngine,
    ctx: vello_cpu::RenderContext,
    scratch: vello_cpu::Pixmap,
    intro: Option<FrameRGBA>,
}

impl FrameComposer {
    /// Build a composer for a fixed canvas and glow ramp.
    pub fn new(
        canvas: Canvas,
        gradient: GlowGradient,
        fonts: Option<FontBundle>,
    ) -> GlowreelResult<Self> {
        let scratch = new_pixmap(canvas.width, canvas.height)?;
        let ctx = vello_cpu::RenderContext::new(scratch.width(), scratch.height());
        Ok(Self {
            canvas,
            gradient,
            cache: RasterCache::new(),
            fonts,
            text_engine: TextLayoutEngine::new(),
            ctx,
            scratch,
            intro: None,
        })
    }

    /// Compose one victory-scene frame.
    pub fn compose(
        &mut self,
        layer: &RenderedStaticLayer,
        transform: SceneTransform,
    ) -> GlowreelResult<FrameRGBA> {
        let w = f64::from(self.canvas.width);
        let h = f64::from(self.canvas.height);
        let cx = w / 2.0;
        let cy = h / 2.0;

        self.ctx.reset();
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        // Black backdrop keeps the output fully opaque.
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint_color(palette::BLACK));
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));

        // Glow raster centered at the floated center, radius 3/4 canvas width.
        // The ramp ends transparent, so past-the-edge pixels stay black.
        let glow_radius = w * 0.75;
        let glow_d = (glow_radius * 2.0).round() as u32;
        let glow = self.cache.glow_disc(glow_d, &self.gradient)?;
        let gx = cx - glow_radius;
        let gy = cy + transform.y_offset - glow_radius;
        self.ctx
            .set_transform(affine_to_cpu(Affine::translate((gx, gy))));
        self.ctx.set_paint(glow);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(glow_d),
            f64::from(glow_d),
        ));

        // Static layer scaled about the floated center.
        let tr = Affine::translate((cx, cy + transform.y_offset))
            * Affine::scale(transform.scale)
            * Affine::translate((-cx, -cy));
        self.ctx.set_transform(affine_to_cpu(tr));
        self.ctx.set_paint(layer.image.clone());
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(layer.width),
            f64::from(layer.height),
        ));

        self.finish_frame()
    }

    /// The intro title card: diagonal gold ramp with the title and year.
    ///
    /// Rendered once and cached; intro frames never animate.
    pub fn intro_frame(&mut self, year: i32) -> GlowreelResult<FrameRGBA> {
        if let Some(frame) = self.intro.clone() {
            return Ok(frame);
        }

        let w = f64::from(self.canvas.width);
        let h = f64::from(self.canvas.height);

        self.ctx.reset();
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let bg = self.cache.diagonal_gradient(
            self.canvas.width,
            self.canvas.height,
            palette::YELLOW,
            palette::ORANGE,
        )?;
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(bg);
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));

        if let Some(fonts) = self.fonts.clone() {
            let title = self.text_engine.layout_plain(
                INTRO_TITLE,
                &fonts.regular,
                INTRO_TITLE_SIZE,
                palette::WHITE,
                None,
            )?;
            let title_h = title.height();
            draw_text(
                &mut self.ctx,
                &title,
                Point::new(0.0, (h - title_h) / 2.0),
                None,
                Some(w),
            );

            let year_text = year.to_string();
            let year_laid = self.text_engine.layout_plain(
                &year_text,
                &fonts.regular,
                INTRO_YEAR_SIZE,
                palette::WHITE.with_opacity(0.8),
                None,
            )?;
            draw_text(
                &mut self.ctx,
                &year_laid,
                Point::new(0.0, (h + title_h) / 2.0 + 20.0),
                None,
                Some(w),
            );
        }

        let frame = self.finish_frame()?;
        self.intro = Some(frame.clone());
        Ok(frame)
    }

    fn finish_frame(&mut self) -> GlowreelResult<FrameRGBA> {
        clear_pixmap_to_transparent(&mut self.scratch);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.scratch);
        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.scratch.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Canvas {
        Canvas {
            width: 200,
            height: 200,
        }
    }

    fn composer() -> FrameComposer {
        FrameComposer::new(canvas(), GlowGradient::warm(), None).unwrap()
    }

    fn blank_layer() -> RenderedStaticLayer {
        RenderedStaticLayer::new(vello_cpu::Pixmap::new(200, 200))
    }

    #[test]
    fn composed_frame_is_opaque() {
        let mut c = composer();
        let f = c
            .compose(
                &blank_layer(),
                SceneTransform {
                    scale: 1.0,
                    y_offset: 0.0,
                },
            )
            .unwrap();
        assert_eq!(f.data.len(), 200 * 200 * 4);
        for px in f.data.chunks_exact(4) {
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn glow_brightens_center_over_black() {
        let mut c = composer();
        let f = c
            .compose(
                &blank_layer(),
                SceneTransform {
                    scale: 1.0,
                    y_offset: 0.0,
                },
            )
            .unwrap();
        let center = (100usize * 200 + 100) * 4;
        // Warm glow: red channel lit at center, falling off toward the corner.
        assert!(f.data[center] > 0);
        assert!(f.data[center] > f.data[0]);
    }

    #[test]
    fn intro_frame_is_cached_and_deterministic() {
        let mut c = composer();
        let a = c.intro_frame(2025).unwrap();
        let b = c.intro_frame(2025).unwrap();
        assert_eq!(a.data, b.data);
        assert!(a.data.chunks_exact(4).all(|px| px[3] == 255));
    }
}
