//! Text layers rendered with a real font: the date label, the caption stack,
//! and the intro title card.

use chrono::TimeZone;

use glowreel::{
    CANVAS, Category, FontAsset, FontBundle, FrameComposer, GlowGradient, StaticLayerRenderer,
    Theme, VictoryRecord,
};

fn fonts() -> FontBundle {
    FontBundle {
        regular: FontAsset::from_bytes(include_bytes!("fonts/DejaVuSans.ttf").to_vec()),
        italic: None,
    }
}

fn storied_record() -> VictoryRecord {
    let ts = chrono::Utc.with_ymd_and_hms(2025, 11, 19, 12, 0, 0).unwrap();
    let mut r = VictoryRecord::bare("storied", Category::Sport, ts);
    r.obstacle = Some("fear of heights".to_string());
    r.feeling = Some("unstoppable".to_string());
    r.text = Some("Climbed the north face after two seasons of training.".to_string());
    r
}

#[test]
fn date_label_and_captions_are_drawn_when_fonts_are_supplied() {
    let theme = Theme::builtin().unwrap();
    let mut with_fonts = StaticLayerRenderer::new(CANVAS, theme.clone(), Some(fonts())).unwrap();
    let mut without_fonts = StaticLayerRenderer::new(CANVAS, theme, None).unwrap();

    let record = storied_record();
    let a = with_fonts.render(&record).unwrap();
    let b = without_fonts.render(&record).unwrap();

    let a_bytes = a.data_as_u8_slice();
    let b_bytes = b.data_as_u8_slice();
    assert_ne!(a_bytes, b_bytes);

    // The date label sits in the band above the disc (disc top is at y=255;
    // the 47 px label plus its 40 px gap land around rows 150..230).
    let row = 1000 * 4;
    let band = 150 * row..230 * row;
    assert_ne!(&a_bytes[band.clone()], &b_bytes[band]);

    // The caption stack starts 40 px below the disc (disc bottom is y=745).
    let band = 790 * row..960 * row;
    assert_ne!(&a_bytes[band.clone()], &b_bytes[band]);
}

#[test]
fn caption_text_content_changes_the_raster() {
    let mut renderer =
        StaticLayerRenderer::new(CANVAS, Theme::builtin().unwrap(), Some(fonts())).unwrap();

    let storied = storied_record();
    let mut other = storied.clone();
    other.obstacle = Some("a very different obstacle".to_string());

    let a = renderer.render(&storied).unwrap();
    let b = renderer.render(&other).unwrap();
    assert_ne!(a.data_as_u8_slice(), b.data_as_u8_slice());
}

#[test]
fn intro_card_draws_title_and_year() {
    let mut with_fonts = FrameComposer::new(CANVAS, GlowGradient::warm(), Some(fonts())).unwrap();
    let mut without_fonts = FrameComposer::new(CANVAS, GlowGradient::warm(), None).unwrap();

    let titled = with_fonts.intro_frame(2025).unwrap();
    let bare = without_fonts.intro_frame(2025).unwrap();
    assert_ne!(titled.data, bare.data);

    // The year is part of the card, so a different year renders differently.
    let mut other_year = FrameComposer::new(CANVAS, GlowGradient::warm(), Some(fonts())).unwrap();
    let next = other_year.intro_frame(2026).unwrap();
    assert_ne!(titled.data, next.data);
}
