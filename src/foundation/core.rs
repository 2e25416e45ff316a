use crate::foundation::error::{GlowreelError, GlowreelResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Absolute 0-based frame index in output-timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> GlowreelResult<Self> {
        if den == 0 {
            return Err(GlowreelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(GlowreelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Presentation timestamp of frame `idx` in seconds.
    pub fn pts_secs(self, idx: FrameIndex) -> f64 {
        (idx.0 as f64) * self.frame_duration_secs()
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Construct from channel values.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Return the same color with alpha scaled by `opacity` in `[0, 1]`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (f64::from(self.a) * opacity.clamp(0.0, 1.0)).round().clamp(0.0, 255.0) as u8;
        Self { a, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_rejects_zero_parts() {
        assert!(Fps::new(30, 0).is_err());
        assert!(Fps::new(0, 1).is_err());
        assert!(Fps::new(30, 1).is_ok());
    }

    #[test]
    fn pts_spacing_is_one_thirtieth() {
        let fps = Fps::new(30, 1).unwrap();
        let a = fps.pts_secs(FrameIndex(10));
        let b = fps.pts_secs(FrameIndex(11));
        assert!((b - a - 1.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn with_opacity_scales_alpha_only() {
        let c = Rgba8::new(255, 204, 0, 255).with_opacity(0.5);
        assert_eq!((c.r, c.g, c.b), (255, 204, 0));
        assert_eq!(c.a, 128);
    }

}
