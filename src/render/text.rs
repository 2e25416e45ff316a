use crate::foundation::core::{Affine, Point, Rgba8, Vec2};
use crate::foundation::error::{GlowreelError, GlowreelResult};
use crate::render::surface::affine_to_cpu;

/// RGBA8 brush color carried through Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// One loaded font: raw bytes for shaping plus the glyph-drawing handle.
#[derive(Clone)]
pub struct FontAsset {
    bytes: Vec<u8>,
    data: vello_cpu::peniko::FontData,
}

impl FontAsset {
    /// Wrap raw font-file bytes (TTF/OTF).
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.clone()),
            0,
        );
        Self { bytes, data }
    }
}

/// Fonts used by the fixed template.
///
/// Text weight hierarchy comes from sizes, so a single regular face covers the
/// date and caption labels; the story text prefers `italic` when present.
#[derive(Clone)]
pub struct FontBundle {
    /// Face used for the date label and caption lines.
    pub regular: FontAsset,
    /// Optional italic face for the story text.
    pub italic: Option<FontAsset>,
}

impl FontBundle {
    pub(crate) fn story_font(&self) -> &FontAsset {
        self.italic.as_ref().unwrap_or(&self.regular)
    }
}

/// A shaped block of text ready for drawing and measuring.
pub(crate) struct LaidOutText {
    layout: parley::Layout<TextBrushRgba8>,
    font: vello_cpu::peniko::FontData,
}

impl LaidOutText {
    /// Total height of all lines, in pixels.
    pub(crate) fn height(&self) -> f64 {
        let mut h = 0.0f64;
        for line in self.layout.lines() {
            let m = line.metrics();
            h += f64::from(m.ascent + m.descent + m.leading);
        }
        h
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape and lay out plain text using the provided font, with `color`
    /// carried as the brush for every glyph run.
    ///
    /// With `max_width_px` set, lines break at that width; otherwise the text
    /// stays on one line. Horizontal placement is handled at draw time.
    pub(crate) fn layout_plain(
        &mut self,
        text: &str,
        font: &FontAsset,
        size_px: f32,
        color: Rgba8,
        max_width_px: Option<f32>,
    ) -> GlowreelResult<LaidOutText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(GlowreelError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            GlowreelError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| GlowreelError::validation("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8 {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        }));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(max_width_px);

        Ok(LaidOutText {
            layout,
            font: font.data.clone(),
        })
    }
}

/// Draw a laid-out block at `origin` (top-left of the layout box).
///
/// Glyph color comes from the brush baked in at layout time unless
/// `color_override` is given. When `center_column` is set, each line is
/// shifted so its advance width is centered inside a column of that width
/// starting at `origin.x`.
pub(crate) fn draw_text(
    ctx: &mut vello_cpu::RenderContext,
    text: &LaidOutText,
    origin: Point,
    color_override: Option<Rgba8>,
    center_column: Option<f64>,
) {
    for line in text.layout.lines() {
        let dx = match center_column {
            Some(col) => (col - f64::from(line.metrics().advance)) / 2.0,
            None => 0.0,
        };
        ctx.set_transform(affine_to_cpu(Affine::translate((
            origin.x + dx,
            origin.y,
        ))));
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let c = match color_override {
                Some(c) => c,
                None => {
                    let b = run.style().brush;
                    Rgba8::new(b.r, b.g, b.b, b.a)
                }
            };
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&text.font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

/// Draw a block with a soft drop shadow underneath for legibility.
///
/// The shadow is the same glyphs offset and layered twice at decreasing
/// alpha, approximating a small blur.
pub(crate) fn draw_text_shadowed(
    ctx: &mut vello_cpu::RenderContext,
    text: &LaidOutText,
    origin: Point,
    shadow: Rgba8,
    shadow_offset: Vec2,
    center_column: Option<f64>,
) {
    for (spread, fade) in [(2.0, 0.5), (1.0, 1.0)] {
        let off = Point::new(
            origin.x + shadow_offset.x * spread,
            origin.y + shadow_offset.y * spread,
        );
        draw_text(ctx, text, off, Some(shadow.with_opacity(fade)), center_column);
    }
    draw_text(ctx, text, origin, None, center_column);
}
