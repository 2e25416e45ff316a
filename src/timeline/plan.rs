use std::f64::consts::PI;

use crate::foundation::core::{Fps, FrameIndex};
use crate::render::compose::SceneTransform;

/// Frames per scene (intro and each victory): 3 seconds at 30 fps.
pub const FRAMES_PER_SCENE: u32 = 90;
/// Frames in a fade-in or fade-out window: 0.5 seconds.
pub const FADE_FRAMES: u32 = 15;

/// Which segment of the output a frame belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scene {
    /// The fixed title card at the start.
    Intro,
    /// The scene for the record at `index` in the input order.
    Victory {
        /// Zero-based record index.
        index: usize,
    },
}

/// Everything needed to compose and append one frame.
///
/// Purely a function of the timeline position; no rendering state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameDescriptor {
    /// The scene this frame belongs to.
    pub scene: Scene,
    /// Frame position within its scene, `0..FRAMES_PER_SCENE`.
    pub frame_in_scene: u32,
    /// Global frame position from the start of the video.
    pub frame_index: FrameIndex,
    /// Presentation timestamp in seconds.
    pub pts_secs: f64,
    /// Pulse scale for this frame.
    pub scale: f64,
    /// Vertical float offset for this frame.
    pub y_offset: f64,
    /// Scene-transition alpha applied by the pixel buffer bridge.
    pub alpha: f64,
}

impl FrameDescriptor {
    /// Descriptor for an intro frame. The intro never animates or fades.
    pub fn intro(frame_in_scene: u32, frame_index: FrameIndex, fps: Fps) -> Self {
        Self {
            scene: Scene::Intro,
            frame_in_scene,
            frame_index,
            pts_secs: fps.pts_secs(frame_index),
            scale: 1.0,
            y_offset: 0.0,
            alpha: 1.0,
        }
    }

    /// Descriptor for a victory-scene frame.
    ///
    /// Every victory scene fades in from black; all but the last fade out, so
    /// the video ends on a fully visible frame.
    pub fn victory(
        index: usize,
        is_last: bool,
        frame_in_scene: u32,
        frame_index: FrameIndex,
        fps: Fps,
    ) -> Self {
        let progress = f64::from(frame_in_scene) / f64::from(FRAMES_PER_SCENE);
        let scale = 1.0 + 0.05 * (progress * PI).sin();
        let y_offset = 10.0 * (progress * 2.0 * PI).sin();

        let mut alpha = 1.0;
        if frame_in_scene < FADE_FRAMES {
            alpha = f64::from(frame_in_scene) / f64::from(FADE_FRAMES);
        } else if frame_in_scene >= FRAMES_PER_SCENE - FADE_FRAMES && !is_last {
            let out = f64::from(frame_in_scene - (FRAMES_PER_SCENE - FADE_FRAMES))
                / f64::from(FADE_FRAMES);
            alpha = 1.0 - out;
        }

        Self {
            scene: Scene::Victory { index },
            frame_in_scene,
            frame_index,
            pts_secs: fps.pts_secs(frame_index),
            scale,
            y_offset,
            alpha,
        }
    }

    /// The motion handed to the frame composer.
    pub fn transform(&self) -> SceneTransform {
        SceneTransform {
            scale: self.scale,
            y_offset: self.y_offset,
        }
    }
}

/// Total frame count for `record_count` records: one intro scene plus one
/// scene per record.
pub fn total_frames(record_count: usize) -> u64 {
    (record_count as u64 + 1) * u64::from(FRAMES_PER_SCENE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fps() -> Fps {
        Fps::new(30, 1).unwrap()
    }

    #[test]
    fn totals_include_the_intro() {
        assert_eq!(total_frames(0), 90);
        assert_eq!(total_frames(2), 270);
    }

    #[test]
    fn intro_is_static_and_opaque() {
        let d = FrameDescriptor::intro(0, FrameIndex(0), fps());
        assert_eq!(d.alpha, 1.0);
        assert_eq!(d.scale, 1.0);
        assert_eq!(d.y_offset, 0.0);
        assert_eq!(d.pts_secs, 0.0);
    }

    #[test]
    fn victory_fades_in_from_black() {
        let d = FrameDescriptor::victory(0, false, 0, FrameIndex(90), fps());
        assert_eq!(d.alpha, 0.0);
        let mid = FrameDescriptor::victory(0, false, 7, FrameIndex(97), fps());
        assert!((mid.alpha - 7.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn body_frames_hold_full_opacity() {
        for i in FADE_FRAMES..(FRAMES_PER_SCENE - FADE_FRAMES) {
            let d = FrameDescriptor::victory(0, false, i, FrameIndex(u64::from(90 + i)), fps());
            assert_eq!(d.alpha, 1.0, "frame {i}");
        }
    }

    #[test]
    fn non_final_scene_fades_out_but_final_does_not() {
        let fading = FrameDescriptor::victory(0, false, 89, FrameIndex(179), fps());
        assert!(fading.alpha < 1.0);
        let last = FrameDescriptor::victory(1, true, 89, FrameIndex(269), fps());
        assert_eq!(last.alpha, 1.0);
    }

    #[test]
    fn pulse_and_float_return_to_rest() {
        let start = FrameDescriptor::victory(0, false, 0, FrameIndex(90), fps());
        assert_eq!(start.scale, 1.0);
        assert_eq!(start.y_offset, 0.0);

        let mid = FrameDescriptor::victory(0, false, 45, FrameIndex(135), fps());
        assert!((mid.scale - 1.05).abs() < 1e-9);
        assert!(mid.y_offset.abs() < 1e-9);

        let quarter = FrameDescriptor::victory(0, false, 22, FrameIndex(112), fps());
        assert!(quarter.y_offset > 9.0);
    }

    #[test]
    fn pts_steps_by_one_thirtieth() {
        let a = FrameDescriptor::victory(0, false, 3, FrameIndex(93), fps());
        let b = FrameDescriptor::victory(0, false, 4, FrameIndex(94), fps());
        assert!((b.pts_secs - a.pts_secs - 1.0 / 30.0).abs() < 1e-12);
    }
}
