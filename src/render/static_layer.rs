use std::collections::HashMap;
use std::f64::consts::FRAC_PI_4;

use crate::assets::svg_raster::rasterize_svg_to_premul_rgba8;
use crate::foundation::core::{Affine, Canvas, Point, Vec2};
use crate::foundation::error::{GlowreelError, GlowreelResult};
use crate::model::record::VictoryRecord;
use crate::model::theme::{Category, GradientStop, Theme, palette};
use crate::render::surface::{
    RasterCache, affine_to_cpu, circle_path, image_from_premul_bytes, paint_color,
};
use crate::render::text::{FontBundle, TextLayoutEngine, draw_text_shadowed};

/// Disc diameter as a fraction of the canvas width.
const DISC_FRACTION: f64 = 0.49;
/// Outer halo diameter relative to the disc.
const GLOW_SCALE: f64 = 1.4;
/// Icon size relative to the disc.
const ICON_SCALE: f64 = 0.4;
/// Gap between the disc and the date label / caption stack.
const TEXT_GAP: f64 = 40.0;
/// Vertical spacing between caption blocks.
const CAPTION_SPACING: f64 = 16.0;

const DATE_SIZE: f32 = 47.0;
const CAPTION_SIZE: f32 = 42.0;
const STORY_SIZE: f32 = 36.0;

/// Renders the per-record raster that stays constant across a scene.
///
/// The output is drawn once per record and reused by all 90 frames of that
/// record's scene; only the composite step moves, scales and fades it.
pub struct StaticLayerRenderer {
    canvas: Canvas,
    theme: Theme,
    fonts: Option<FontBundle>,
    text_engine: TextLayoutEngine,
    cache: RasterCache,
    icon_cache: HashMap<Category, vello_cpu::Image>,
    ctx: vello_cpu::RenderContext,
}

impl StaticLayerRenderer {
    /// Build a renderer for a fixed canvas.
    ///
    /// Without `fonts` the date label and caption stack are skipped; everything
    /// else renders identically.
    pub fn new(canvas: Canvas, theme: Theme, fonts: Option<FontBundle>) -> GlowreelResult<Self> {
        let w: u16 = canvas.width.try_into().map_err(|_| {
            GlowreelError::validation(format!("canvas width exceeds u16: {}", canvas.width))
        })?;
        let h: u16 = canvas.height.try_into().map_err(|_| {
            GlowreelError::validation(format!("canvas height exceeds u16: {}", canvas.height))
        })?;
        Ok(Self {
            canvas,
            theme,
            fonts,
            text_engine: TextLayoutEngine::new(),
            cache: RasterCache::new(),
            icon_cache: HashMap::new(),
            ctx: vello_cpu::RenderContext::new(w, h),
        })
    }

    fn disc_diameter(&self) -> f64 {
        f64::from(self.canvas.width) * DISC_FRACTION
    }

    /// Render the full static layer for one record into a fresh pixmap.
    pub fn render(&mut self, record: &VictoryRecord) -> GlowreelResult<vello_cpu::Pixmap> {
        let cx = f64::from(self.canvas.width) / 2.0;
        let cy = f64::from(self.canvas.height) / 2.0;
        let center = Point::new(cx, cy);
        let disc = self.disc_diameter();
        let disc_top = cy - disc / 2.0;
        let disc_bottom = cy + disc / 2.0;

        self.ctx.reset();
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        // 1. Glow halo: stacked translucent circles standing in for a blur.
        for i in 0..5u32 {
            let spread = 4.0 * f64::from(i);
            let d = disc * GLOW_SCALE + 2.0 * spread;
            let alpha = 0.6 * (1.0 - 0.15 * f64::from(i));
            self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            self.ctx
                .set_paint(paint_color(palette::YELLOW.with_opacity(alpha)));
            self.ctx.fill_path(&circle_path(center, d / 2.0));
        }

        // 2. Drop shadow under the disc, nudged down 5 px.
        for i in 0..3u32 {
            let spread = 3.5 * f64::from(i);
            let d = disc + 2.0 * spread;
            let alpha = 0.2 * (1.0 - 0.25 * f64::from(i));
            self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            self.ctx
                .set_paint(paint_color(palette::YELLOW.with_opacity(alpha)));
            self.ctx
                .fill_path(&circle_path(Point::new(cx, cy + 5.0), d / 2.0));
        }

        // 3. Main disc: near-transparent center to translucent gold edge.
        let disc_px = disc.round() as u32;
        let main = self.cache.radial_disc(
            disc_px,
            palette::YELLOW.with_opacity(0.0125),
            palette::YELLOW.with_opacity(0.1375),
        )?;
        self.draw_image_at(main, cx - disc / 2.0, disc_top, disc, disc);

        // 4. Inner disc adds luminance variation.
        let inner_d = disc * 0.75;
        let inner_px = inner_d.round() as u32;
        let inner = self.cache.radial_disc(
            inner_px,
            palette::YELLOW.with_opacity(0.0),
            palette::YELLOW.with_opacity(0.1),
        )?;
        self.draw_image_at(inner, cx - inner_d / 2.0, cy - inner_d / 2.0, inner_d, inner_d);

        // 5. 1 px border with a bright-to-dim diagonal ramp.
        let border_stops = [
            GradientStop {
                offset: 0.0,
                color: palette::WHITE.with_opacity(0.6),
            },
            GradientStop {
                offset: 0.5,
                color: palette::WHITE.with_opacity(0.1),
            },
            GradientStop {
                offset: 1.0,
                color: palette::WHITE.with_opacity(0.3),
            },
        ];
        let border = self.cache.ring_linear(disc_px, 1.0, &border_stops)?;
        self.draw_image_at(border, cx - disc / 2.0, disc_top, disc, disc);

        // 6. Inner shadow: concentric strokes of shrinking width and alpha,
        // centered on the disc outline.
        for (i, width) in [4.0f64, 3.0, 2.0].into_iter().enumerate() {
            let alpha = 0.3 * (1.0 - 0.2 * i as f64);
            let size = disc + width;
            let ring = self.cache.ring_solid(
                size.round() as u32,
                width as f32,
                palette::YELLOW.with_opacity(alpha),
            )?;
            self.draw_image_at(ring, cx - size / 2.0, cy - size / 2.0, size, size);
        }

        // 7. Specular highlight: small ellipse near the top-left, rotated -45
        // degrees about the canvas center.
        let hl_w = disc * 0.35;
        let hl_h = disc * 0.20;
        let hl_x = cx - disc / 2.0 + disc * 0.15;
        let hl_y = disc_top + disc * 0.15;
        let highlight = self.cache.ellipse_radial(
            hl_w.round() as u32,
            hl_h.round() as u32,
            palette::WHITE.with_opacity(0.35),
            palette::WHITE.with_opacity(0.0),
        )?;
        let tr = Affine::rotate_about(-FRAC_PI_4, center) * Affine::translate((hl_x, hl_y));
        self.ctx.set_transform(affine_to_cpu(tr));
        self.ctx.set_paint(highlight);
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, hl_w, hl_h));

        // 8. Date label above the disc.
        if let Some(fonts) = self.fonts.clone() {
            let label = record.date_label();
            let laid = self.text_engine.layout_plain(
                &label,
                &fonts.regular,
                DATE_SIZE,
                palette::WHITE,
                None,
            )?;
            let y = disc_top - laid.height() - TEXT_GAP;
            draw_text_shadowed(
                &mut self.ctx,
                &laid,
                Point::new(0.0, y),
                palette::BLACK.with_opacity(0.5),
                Vec2::new(0.0, 2.0),
                Some(f64::from(self.canvas.width)),
            );
        }

        // 9. Category icon over a soft orange glow.
        let icon_d = disc * ICON_SCALE;
        let icon_px = icon_d.round() as u32;
        let glow = self.cache.radial_disc(
            icon_px + 16,
            palette::ORANGE.with_opacity(0.8),
            palette::ORANGE.with_opacity(0.0),
        )?;
        let glow_d = f64::from(icon_px + 16);
        self.draw_image_at(glow, cx - glow_d / 2.0, cy - glow_d / 2.0, glow_d, glow_d);
        let icon = self.icon_image(record.category, icon_px)?;
        self.draw_image_at(icon, cx - icon_d / 2.0, cy - icon_d / 2.0, icon_d, icon_d);

        // 10. Caption stack below the disc.
        if let Some(fonts) = self.fonts.clone() {
            let column = f64::from(self.canvas.width) - 100.0;
            let mut y = disc_bottom + TEXT_GAP;

            if let Some(obstacle) = record.obstacle.as_deref() {
                let laid = self.text_engine.layout_plain(
                    &format!("Overcame: {obstacle}"),
                    &fonts.regular,
                    CAPTION_SIZE,
                    palette::WHITE,
                    Some(column as f32),
                )?;
                draw_text_shadowed(
                    &mut self.ctx,
                    &laid,
                    Point::new(50.0, y),
                    palette::BLACK.with_opacity(0.8),
                    Vec2::new(0.0, 2.0),
                    Some(column),
                );
                y += laid.height() + CAPTION_SPACING;
            }

            if let Some(feeling) = record.feeling.as_deref().filter(|f| !f.is_empty()) {
                let laid = self.text_engine.layout_plain(
                    &format!("Feeling: {feeling}"),
                    &fonts.regular,
                    CAPTION_SIZE,
                    palette::YELLOW,
                    Some(column as f32),
                )?;
                draw_text_shadowed(
                    &mut self.ctx,
                    &laid,
                    Point::new(50.0, y),
                    palette::BLACK.with_opacity(0.8),
                    Vec2::new(0.0, 2.0),
                    Some(column),
                );
                y += laid.height() + CAPTION_SPACING;
            }

            if let Some(story) = record.text.as_deref().filter(|t| !t.is_empty()) {
                let laid = self.text_engine.layout_plain(
                    story,
                    fonts.story_font(),
                    STORY_SIZE,
                    palette::WHITE.with_opacity(0.9),
                    Some(column as f32),
                )?;
                draw_text_shadowed(
                    &mut self.ctx,
                    &laid,
                    Point::new(50.0, y + 10.0),
                    palette::BLACK.with_opacity(0.8),
                    Vec2::new(0.0, 1.0),
                    Some(column),
                );
            }
        }

        let mut pixmap = crate::render::surface::new_pixmap(self.canvas.width, self.canvas.height)?;
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        Ok(pixmap)
    }

    fn draw_image_at(&mut self, img: vello_cpu::Image, x: f64, y: f64, w: f64, h: f64) {
        self.ctx
            .set_transform(affine_to_cpu(Affine::translate((x, y))));
        self.ctx.set_paint(img);
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
    }

    fn icon_image(
        &mut self,
        category: Category,
        size_px: u32,
    ) -> GlowreelResult<vello_cpu::Image> {
        if let Some(img) = self.icon_cache.get(&category).cloned() {
            return Ok(img);
        }
        let style = self.theme.style_for(category)?;
        let bytes = rasterize_svg_to_premul_rgba8(&style.icon, size_px, size_px)?;
        let img = image_from_premul_bytes(&bytes, size_px, size_px)?;
        self.icon_cache.insert(category, img.clone());
        Ok(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::VictoryRecord;
    use chrono::{TimeZone, Utc};

    fn canvas() -> Canvas {
        Canvas {
            width: 1000,
            height: 1000,
        }
    }

    fn record() -> VictoryRecord {
        VictoryRecord::bare(
            "r1",
            Category::Sport,
            Utc.with_ymd_and_hms(2025, 12, 31, 12, 0, 0).unwrap(),
        )
    }

    fn renderer() -> StaticLayerRenderer {
        StaticLayerRenderer::new(canvas(), Theme::builtin().unwrap(), None).unwrap()
    }

    #[test]
    fn render_is_canvas_sized_and_nonempty() {
        let mut r = renderer();
        let pm = r.render(&record()).unwrap();
        let bytes = pm.data_as_u8_slice();
        assert_eq!(bytes.len(), 1000 * 1000 * 4);
        assert!(bytes.iter().any(|&b| b != 0));
    }

    #[test]
    fn render_is_deterministic() {
        let mut r = renderer();
        let a = r.render(&record()).unwrap();
        let b = r.render(&record()).unwrap();
        assert_eq!(a.data_as_u8_slice(), b.data_as_u8_slice());
    }

    #[test]
    fn corners_stay_transparent() {
        // The halo at 1.4x the disc never reaches the canvas corners.
        let mut r = renderer();
        let pm = r.render(&record()).unwrap();
        let bytes = pm.data_as_u8_slice();
        assert_eq!(bytes[3], 0);
        let last = bytes.len() - 1;
        assert_eq!(bytes[last], 0);
    }

    #[test]
    fn disc_center_has_icon_coverage() {
        let mut r = renderer();
        let pm = r.render(&record()).unwrap();
        let bytes = pm.data_as_u8_slice();
        let idx = (500usize * 1000 + 500) * 4;
        assert!(bytes[idx + 3] > 0);
    }
}
