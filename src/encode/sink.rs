use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::GlowreelResult;

/// Configuration provided to a [`FrameSink`] at the start of a run.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

/// Sink contract for consuming finished frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing
/// `FrameIndex` order. The scheduler polls `is_ready` before every push and
/// never pushes while the sink reports not-ready.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> GlowreelResult<()>;

    /// Whether the sink can accept another frame right now.
    fn is_ready(&self) -> bool {
        true
    }

    /// Push one opaque RGBA8 frame in strictly increasing timeline order.
    ///
    /// The sink consumes the bytes during the call; the caller may reuse the
    /// buffer afterwards.
    fn push_frame(&mut self, idx: FrameIndex, data: &[u8]) -> GlowreelResult<()>;

    /// Called once after the last frame; confirms a finished output.
    fn end(&mut self) -> GlowreelResult<()>;

    /// Discard the partial output. Must be safe to call at any point after
    /// `begin`, including after an `end` failure, and more than once.
    fn abort(&mut self);
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    /// Frames in timeline order.
    pub(crate) frames: Vec<(FrameIndex, Vec<u8>)>,
    aborted: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, Vec<u8>)] {
        &self.frames
    }

    /// Whether the run was aborted.
    pub fn aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> GlowreelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, data: &[u8]) -> GlowreelResult<()> {
        self.frames.push((idx, data.to_vec()));
        Ok(())
    }

    fn end(&mut self) -> GlowreelResult<()> {
        Ok(())
    }

    fn abort(&mut self) {
        self.frames.clear();
        self.aborted = true;
    }
}
