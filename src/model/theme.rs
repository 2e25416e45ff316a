use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{GlowreelError, GlowreelResult};

/// Closed category tag carried by each record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// Love and relationships.
    Love,
    /// Career and work.
    Career,
    /// Sport and fitness.
    Sport,
    /// Travel.
    Travel,
    /// Creative work.
    Creativity,
    /// Extreme activities.
    Extreme,
    /// Health.
    Health,
    /// Anything else.
    Other,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Category; 8] = [
        Category::Love,
        Category::Career,
        Category::Sport,
        Category::Travel,
        Category::Creativity,
        Category::Extreme,
        Category::Health,
        Category::Other,
    ];
}

/// Palette used by the fixed scene template. Values are the iOS system
/// colors the template look was tuned against.
pub mod palette {
    use crate::foundation::core::Rgba8;

    /// System yellow.
    pub const YELLOW: Rgba8 = Rgba8::new(255, 204, 0, 255);
    /// System orange.
    pub const ORANGE: Rgba8 = Rgba8::new(255, 149, 0, 255);
    /// System blue.
    pub const BLUE: Rgba8 = Rgba8::new(0, 122, 255, 255);
    /// System purple.
    pub const PURPLE: Rgba8 = Rgba8::new(175, 82, 222, 255);
    /// Opaque white.
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
}

/// One stop of a radial gradient ramp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Normalized offset in `[0, 1]`.
    pub offset: f32,
    /// Straight-alpha color at this offset.
    pub color: Rgba8,
}

/// Immutable three-stop ramp for the background glow.
///
/// Constructed once per run and passed into the frame composer explicitly;
/// there is no hidden process-wide cache. Beyond the last stop the ramp
/// continues with the last stop's color, which is fully transparent here, so
/// the glow fades out cleanly at its edge.
#[derive(Clone, Debug, PartialEq)]
pub struct GlowGradient {
    /// Ordered stops with non-decreasing offsets.
    pub stops: [GradientStop; 3],
}

impl GlowGradient {
    /// The warm yellow/orange glow used behind every victory disc.
    pub fn warm() -> Self {
        Self {
            stops: [
                GradientStop {
                    offset: 0.0,
                    color: palette::YELLOW.with_opacity(0.6),
                },
                GradientStop {
                    offset: 0.5,
                    color: palette::ORANGE.with_opacity(0.35),
                },
                GradientStop {
                    offset: 1.0,
                    color: palette::BLACK.with_opacity(0.0),
                },
            ],
        }
    }

    /// Color of the ramp at normalized distance `t`, clamped at both ends.
    pub fn sample(&self, t: f32) -> Rgba8 {
        use crate::foundation::math::lerp_u8;

        let t = t.clamp(0.0, 1.0);
        let mut prev = self.stops[0];
        for stop in &self.stops[1..] {
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
}

/// Per-category icon and accent color, with the icon pre-parsed.
#[derive(Clone)]
pub struct CategoryStyle {
    /// Parsed icon glyph, rasterized on demand by the static layer renderer.
    pub icon: Arc<usvg::Tree>,
    /// Accent color associated with the category.
    pub accent: Rgba8,
}

/// Validated lookup table from category to icon and color.
///
/// Every icon is parsed at construction, so a broken entry fails the whole
/// theme load instead of silently defaulting at render time.
#[derive(Clone)]
pub struct Theme {
    styles: HashMap<Category, CategoryStyle>,
}

impl Theme {
    /// Build the built-in theme covering all categories.
    pub fn builtin() -> GlowreelResult<Self> {
        let entries: [(Category, &str, Rgba8); 8] = [
            (Category::Love, icons::HEART, Rgba8::new(255, 45, 85, 255)),
            (Category::Career, icons::BRIEFCASE, palette::BLUE),
            (Category::Sport, icons::RUNNER, Rgba8::new(52, 199, 89, 255)),
            (Category::Travel, icons::AIRPLANE, Rgba8::new(50, 173, 230, 255)),
            (Category::Creativity, icons::PAINTBRUSH, palette::PURPLE),
            (Category::Extreme, icons::FLAME, Rgba8::new(255, 59, 48, 255)),
            (Category::Health, icons::CROSS, Rgba8::new(0, 199, 190, 255)),
            (Category::Other, icons::STAR, Rgba8::new(142, 142, 147, 255)),
        ];

        let opts = usvg::Options::default();
        let mut styles = HashMap::with_capacity(entries.len());
        for (category, svg, accent) in entries {
            let tree = usvg::Tree::from_data(svg.as_bytes(), &opts)
                .with_context(|| format!("parse icon for category {category:?}"))?;
            styles.insert(
                category,
                CategoryStyle {
                    icon: Arc::new(tree),
                    accent,
                },
            );
        }
        Ok(Self { styles })
    }

    /// Look up the style for `category`, failing fast on a missing entry.
    pub fn style_for(&self, category: Category) -> GlowreelResult<&CategoryStyle> {
        self.styles.get(&category).ok_or_else(|| {
            GlowreelError::validation(format!("theme has no entry for category {category:?}"))
        })
    }
}

/// Inline white icon glyphs, one per category, all on a 24x24 grid.
mod icons {
    pub(super) const HEART: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path fill="#ffffff" d="M12 21C5.4 14.9 2 11.2 2 7.6 2 5 4.1 3 6.6 3 8.5 3 10.3 4 12 6 13.7 4 15.5 3 17.4 3 19.9 3 22 5 22 7.6 22 11.2 18.6 14.9 12 21Z"/></svg>"##;

    pub(super) const BRIEFCASE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path fill="#ffffff" d="M9 4h6a1 1 0 0 1 1 1v1h4a1 1 0 0 1 1 1v12a1 1 0 0 1-1 1H4a1 1 0 0 1-1-1V7a1 1 0 0 1 1-1h4V5a1 1 0 0 1 1-1Zm1 2h4V5.5h-4V6Zm-7 5h18v2H3v-2Z"/></svg>"##;

    pub(super) const RUNNER: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path fill="#ffffff" d="M14 3a2 2 0 1 1 0 4 2 2 0 0 1 0-4ZM9.5 8.5 13 7l3 3 4 1-.5 2-4.5-1-1.5-1.5-2 4 3 2.5V22h-2v-4l-3-2.5L7 20l-1.7-1L9 13l1.5-3-2.5 1L6 13.5 4.3 12.5 7 9.5l2.5-1Z"/></svg>"##;

    pub(super) const AIRPLANE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path fill="#ffffff" d="M21 12 13.5 10 11 3H9l1.5 7L5 8.7 3.8 6.5H2.3L3 10l-.7 3.5h1.5L5 11.3 10.5 10 9 17h2l2.5-7L21 8v4Z"/></svg>"##;

    pub(super) const PAINTBRUSH: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path fill="#ffffff" d="M20 2c1.1 1.1 1.1 2.9 0 4l-8 8-4-4 8-8c1.1-1.1 2.9-1.1 4 0ZM7 11l4 4-1.5 1.5c-1 1-2.5 1.2-3.7.6L3 19.5 2 18.5l2.4-2.8c-.6-1.2-.4-2.7.6-3.7L7 11Z"/></svg>"##;

    pub(super) const FLAME: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path fill="#ffffff" d="M12 2c1 3 3 4.5 4.5 6.5C18 10.5 19 12.5 19 15a7 7 0 0 1-14 0c0-2 .8-3.8 2-5 .4 1.2 1 2 2 2.5C8.5 9 9.5 5 12 2Zm0 10c-1.7 1.3-2.5 2.6-2.5 4a2.5 2.5 0 0 0 5 0c0-1.4-.8-2.7-2.5-4Z"/></svg>"##;

    pub(super) const CROSS: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path fill="#ffffff" d="M9 3h6v6h6v6h-6v6H9v-6H3V9h6V3Z"/></svg>"##;

    pub(super) const STAR: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path fill="#ffffff" d="m12 2 2.9 6.3 6.9.8-5.1 4.7 1.4 6.8L12 17.2l-6.1 3.4 1.4-6.8L2.2 9.1l6.9-.8L12 2Z"/></svg>"##;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_theme_covers_every_category() {
        let theme = Theme::builtin().unwrap();
        for c in Category::ALL {
            let style = theme.style_for(c).unwrap();
            assert_eq!(style.accent.a, 255, "{c:?} accent must be opaque");
        }
    }

    #[test]
    fn accents_are_distinct_per_category() {
        let theme = Theme::builtin().unwrap();
        let mut seen = std::collections::HashSet::new();
        for c in Category::ALL {
            let accent = theme.style_for(c).unwrap().accent;
            assert!(
                seen.insert((accent.r, accent.g, accent.b)),
                "{c:?} reuses another category's accent"
            );
        }
        assert_eq!(theme.style_for(Category::Career).unwrap().accent, palette::BLUE);
    }

    #[test]
    fn glow_sample_hits_stop_colors() {
        let g = GlowGradient::warm();
        assert_eq!(g.sample(0.0), palette::YELLOW.with_opacity(0.6));
        assert_eq!(g.sample(0.5), palette::ORANGE.with_opacity(0.35));
        assert_eq!(g.sample(1.0).a, 0);
        // Clamped beyond the last stop: stays transparent.
        assert_eq!(g.sample(2.0).a, 0);
    }

    #[test]
    fn glow_sample_is_monotone_in_alpha_past_midpoint() {
        let g = GlowGradient::warm();
        let a = g.sample(0.6).a;
        let b = g.sample(0.9).a;
        assert!(a > b);
    }

    #[test]
    fn category_serde_uses_camel_case_tags() {
        let json = serde_json::to_string(&Category::Creativity).unwrap();
        assert_eq!(json, "\"creativity\"");
        let back: Category = serde_json::from_str("\"love\"").unwrap();
        assert_eq!(back, Category::Love);
    }
}
