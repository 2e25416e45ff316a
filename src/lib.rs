//! Glowreel renders a fixed-template recap video from an ordered list of
//! victory records: a title card, then one animated scene per record, encoded
//! into an MP4 at 1000x1000 and 30 fps.
//!
//! The pipeline is assembled from explicitly constructed stages:
//!
//! - [`FileAssetResolver`] loads a record's still image (or synthesizes a
//!   placeholder)
//! - [`StaticLayerRenderer`] draws the per-record raster once per scene
//! - [`FrameComposer`] composites each frame's glow, float and pulse
//! - [`PixelBufferBridge`] flattens frames into encoder-ready buffers
//! - [`VideoGenerator`] schedules scenes and streams frames into a
//!   [`FrameSink`] such as [`FfmpegSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;
mod model;
mod render;

/// Encoding sinks.
pub mod encode;
/// Scheduling and the generation driver.
pub mod timeline;

pub use crate::foundation::core::{Affine, Canvas, Fps, FrameIndex, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{GlowreelError, GlowreelResult};

pub use crate::assets::decode::PreparedImage;
pub use crate::assets::resolve::{AssetResolver, FileAssetResolver, placeholder_image};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::model::record::{RecordId, VictoryRecord};
pub use crate::model::theme::{Category, CategoryStyle, GlowGradient, GradientStop, Theme};
pub use crate::render::buffer::{BufferPoolOpts, BufferPoolStats, PixelBuffer, PixelBufferBridge};
pub use crate::render::compose::{FrameComposer, RenderedStaticLayer, SceneTransform};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::static_layer::StaticLayerRenderer;
pub use crate::render::text::{FontAsset, FontBundle};
pub use crate::timeline::plan::{
    FADE_FRAMES, FRAMES_PER_SCENE, FrameDescriptor, Scene, total_frames,
};
pub use crate::timeline::scheduler::{
    CANVAS, CancelToken, GenerateOpts, ProgressSink, VideoGenerator, suggested_output_path,
};
