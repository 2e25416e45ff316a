use std::sync::Arc;

use crate::assets::decode::{PreparedImage, decode_image};
use crate::foundation::core::Canvas;
use crate::foundation::math::lerp_u8;
use crate::model::record::VictoryRecord;
use crate::model::theme::palette;

/// Produces the backing still image for a record.
///
/// Resolution never fails terminally: any missing or undecodable media falls
/// back to [`placeholder_image`]. Injected into the scheduler so tests can
/// substitute fakes.
pub trait AssetResolver: Send {
    /// Return the still image backing `record`.
    fn resolve(&self, record: &VictoryRecord) -> PreparedImage;
}

/// Resolver that reads stills from the local filesystem.
#[derive(Clone, Debug)]
pub struct FileAssetResolver {
    canvas: Canvas,
}

impl FileAssetResolver {
    /// Create a resolver whose placeholders match `canvas`.
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas }
    }
}

impl AssetResolver for FileAssetResolver {
    fn resolve(&self, record: &VictoryRecord) -> PreparedImage {
        if let Some(path) = record.media_path.as_deref() {
            match std::fs::read(path).map_err(anyhow::Error::from).and_then(
                |bytes| decode_image(&bytes).map_err(anyhow::Error::from),
            ) {
                Ok(img) => return img,
                Err(e) => {
                    tracing::warn!(
                        record = %record.id.0,
                        path = %path.display(),
                        error = %e,
                        "media unreadable, substituting placeholder"
                    );
                }
            }
        }
        placeholder_image(self.canvas)
    }
}

/// Synthesize the fallback still: a diagonal blue-to-purple gradient at
/// canvas size. No text; captions are layered later by the static renderer.
pub fn placeholder_image(canvas: Canvas) -> PreparedImage {
    let w = canvas.width.max(1);
    let h = canvas.height.max(1);
    let mut bytes = vec![0u8; (w as usize) * (h as usize) * 4];

    let span = (w + h - 2).max(1) as f32;
    let (start, end) = (palette::BLUE, palette::PURPLE);
    for y in 0..h {
        for x in 0..w {
            let t = ((x + y) as f32) / span;
            let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
            bytes[idx] = lerp_u8(start.r, end.r, t);
            bytes[idx + 1] = lerp_u8(start.g, end.g, t);
            bytes[idx + 2] = lerp_u8(start.b, end.b, t);
            bytes[idx + 3] = 255;
        }
    }

    PreparedImage {
        width: w,
        height: h,
        rgba8_premul: Arc::new(bytes),
    }
}
